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
fn bundle_export_import_restores_the_data_file() {
    let workspace = temp_dir("resultsd-bundle-roundtrip");
    let bundle_out = workspace.join("results-backup.zip");
    let data_path = workspace.join("student_data.json");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Exporting before any save has produced a data file is refused.
    let premature = request(
        &mut stdin,
        &mut reader,
        "2",
        "backup.exportDataBundle",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(error_code(&premature), "export_failed");

    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.add",
        json!({ "studentId": 5, "name": "Alice", "marks": { "English": 72.5 } }),
    );
    let _ = request(&mut stdin, &mut reader, "4", "data.save", json!({}));
    let original = std::fs::read(&data_path).expect("saved data file");

    let exported = request(
        &mut stdin,
        &mut reader,
        "5",
        "backup.exportDataBundle",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(exported.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        exported
            .get("result")
            .and_then(|r| r.get("entryCount"))
            .and_then(|v| v.as_u64()),
        Some(3)
    );

    // Lose the data file, restore it from the bundle, reload.
    std::fs::remove_file(&data_path).expect("remove data file");
    let imported = request(
        &mut stdin,
        &mut reader,
        "6",
        "backup.importDataBundle",
        json!({ "inPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(imported.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        imported
            .get("result")
            .and_then(|r| r.get("bundleFormatDetected"))
            .and_then(|v| v.as_str()),
        Some("student-results-data-v1")
    );

    let restored = std::fs::read(&data_path).expect("restored data file");
    assert_eq!(restored, original);

    let loaded = request(&mut stdin, &mut reader, "7", "data.load", json!({}));
    assert_eq!(
        loaded
            .get("result")
            .and_then(|r| r.get("studentCount"))
            .and_then(|v| v.as_u64()),
        Some(1)
    );

    // Garbage input never lands over the workspace data.
    let garbage = workspace.join("garbage.bin");
    std::fs::write(&garbage, b"not a bundle").expect("write garbage");
    let refused = request(
        &mut stdin,
        &mut reader,
        "8",
        "backup.importDataBundle",
        json!({ "inPath": garbage.to_string_lossy() }),
    );
    assert_eq!(error_code(&refused), "import_failed");
    assert_eq!(std::fs::read(&data_path).expect("data intact"), original);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
