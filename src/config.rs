use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::path::Path;

pub const SUBJECTS_FILE_NAME: &str = "subjects.json";

const DEFAULT_SUBJECTS: [&str; 5] = [
    "Mathematics",
    "Science",
    "English",
    "History",
    "Computer Science",
];

#[derive(Debug, Deserialize)]
struct SubjectsFile {
    subjects: Vec<String>,
}

/// The configured subject list for a workspace. Marks entered on the form
/// must name one of these; the roster also drives the CSV export columns.
#[derive(Debug, Clone)]
pub struct SubjectRoster {
    subjects: Vec<String>,
}

impl Default for SubjectRoster {
    fn default() -> Self {
        Self {
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SubjectRoster {
    /// Read the roster for a workspace. A missing `subjects.json` means the
    /// built-in defaults; a present but invalid one is an error so a typo'd
    /// config never silently falls back.
    pub fn load(workspace: &Path) -> anyhow::Result<Self> {
        let path = workspace.join(SUBJECTS_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        let parsed: SubjectsFile = serde_json::from_str(&text)
            .with_context(|| format!("{} is invalid JSON", path.to_string_lossy()))?;

        Self::from_names(parsed.subjects)
            .with_context(|| format!("{} is invalid", path.to_string_lossy()))
    }

    pub fn from_names(names: Vec<String>) -> anyhow::Result<Self> {
        if names.is_empty() {
            return Err(anyhow!("subject list must not be empty"));
        }
        let mut cleaned: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(anyhow!("subject names must not be blank"));
            }
            if cleaned.iter().any(|c| c == trimmed) {
                return Err(anyhow!("duplicate subject name: {}", trimmed));
            }
            cleaned.push(trimmed.to_string());
        }
        Ok(Self { subjects: cleaned })
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    pub fn names(&self) -> &[String] {
        &self.subjects
    }
}
