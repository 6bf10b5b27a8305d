use std::{env, path::PathBuf};

const DOCUMENTS_DIR_VAR: &str = "DEPT_TIMETABLE_DOCUMENTS_DIR";
const PDF_CMD_VAR: &str = "DEPT_TIMETABLE_PDF_CMD";
const DEFAULT_PDF_CMD: &str = "wkhtmltopdf";

/// Settings read from the environment, overridable by command line flags
#[derive(Debug, Clone)]
pub struct Settings {
    pub documents_dir: PathBuf,
    pub pdf_command: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let documents_dir = env::var_os(DOCUMENTS_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_documents_dir);
        let pdf_command = env::var(PDF_CMD_VAR).unwrap_or_else(|_| DEFAULT_PDF_CMD.to_string());

        Self {
            documents_dir,
            pdf_command,
        }
    }

    pub fn with_documents_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.documents_dir = dir;
        }
        self
    }
}

fn default_documents_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(profile) = env::var_os("USERPROFILE") {
            return PathBuf::from(profile)
                .join("Documents")
                .join("dept-timetable");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join("Documents").join("dept-timetable");
        }
    }

    env::temp_dir().join("dept-timetable")
}
