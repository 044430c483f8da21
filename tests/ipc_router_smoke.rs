use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_resultsd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn resultsd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("resultsd-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let csv_out = workspace.join("smoke-export.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health.get("ok").and_then(|v| v.as_bool()), Some(true));

    // Workspace-bound methods refuse before a workspace is selected.
    let early = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.add",
        json!({ "studentId": 1, "name": "Too Early", "allowEmptyMarks": true }),
    );
    assert_eq!(error_code(&early), "no_workspace");
    let early_save = request(&mut stdin, &mut reader, "3", "data.save", json!({}));
    assert_eq!(error_code(&early_save), "no_workspace");

    let selected = request(
        &mut stdin,
        &mut reader,
        "4",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected.get("ok").and_then(|v| v.as_bool()), Some(true));
    let subjects = selected
        .get("result")
        .and_then(|r| r.get("subjects"))
        .and_then(|v| v.as_array())
        .expect("subjects in select result");
    assert_eq!(subjects.len(), 5);

    let _ = request(&mut stdin, &mut reader, "5", "subjects.list", json!({}));

    let added = request(
        &mut stdin,
        &mut reader,
        "6",
        "students.add",
        json!({
            "studentId": 7,
            "name": "Alice",
            "marks": { "Mathematics": 90, "Science": 85 }
        }),
    );
    assert_eq!(added.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        added
            .get("result")
            .and_then(|r| r.get("grade"))
            .and_then(|v| v.as_str()),
        Some("B")
    );

    let got = request(
        &mut stdin,
        &mut reader,
        "7",
        "students.get",
        json!({ "studentId": 7 }),
    );
    assert_eq!(got.get("ok").and_then(|v| v.as_bool()), Some(true));

    let recomputed = request(
        &mut stdin,
        &mut reader,
        "8",
        "students.recompute",
        json!({ "studentId": "7" }),
    );
    assert_eq!(recomputed.get("ok").and_then(|v| v.as_bool()), Some(true));

    let listed = request(&mut stdin, &mut reader, "9", "students.list", json!({}));
    assert_eq!(
        listed
            .get("result")
            .and_then(|r| r.get("studentCount"))
            .and_then(|v| v.as_u64()),
        Some(1)
    );

    let model = request(
        &mut stdin,
        &mut reader,
        "10",
        "reports.resultsModel",
        json!({}),
    );
    assert_eq!(model.get("ok").and_then(|v| v.as_bool()), Some(true));
    let text = request(
        &mut stdin,
        &mut reader,
        "11",
        "reports.resultsText",
        json!({}),
    );
    assert_eq!(text.get("ok").and_then(|v| v.as_bool()), Some(true));

    let saved = request(&mut stdin, &mut reader, "12", "data.save", json!({}));
    assert_eq!(saved.get("ok").and_then(|v| v.as_bool()), Some(true));
    let loaded = request(&mut stdin, &mut reader, "13", "data.load", json!({}));
    assert_eq!(loaded.get("ok").and_then(|v| v.as_bool()), Some(true));

    let exported = request(
        &mut stdin,
        &mut reader,
        "14",
        "backup.exportDataBundle",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(exported.get("ok").and_then(|v| v.as_bool()), Some(true));
    let imported = request(
        &mut stdin,
        &mut reader,
        "15",
        "backup.importDataBundle",
        json!({ "inPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(imported.get("ok").and_then(|v| v.as_bool()), Some(true));

    let csv = request(
        &mut stdin,
        &mut reader,
        "16",
        "exchange.exportResultsCsv",
        json!({ "outPath": csv_out.to_string_lossy() }),
    );
    assert_eq!(csv.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert!(csv_out.is_file());

    let unknown = request(&mut stdin, &mut reader, "17", "nope.nothing", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
