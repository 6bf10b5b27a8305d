use std::path::PathBuf;

use thiserror::Error;

use crate::{Capability, ExportRequest};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Capability not available: {0}")]
    CapabilityAbsent(Capability),

    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("Sharing {request} timetable failed: {message}")]
    Share {
        request: ExportRequest,
        message: String,
    },

    #[error("Storage permission denied")]
    PermissionDenied,

    #[error("Timetable not found: {0}")]
    TimetableNotFound(String),

    #[error("Another export is already running")]
    ExportInProgress,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn share(request: ExportRequest, message: impl ToString) -> Self {
        Self::Share {
            request,
            message: message.to_string(),
        }
    }

    /// Text for the alert shown when an export fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::Share {
                request: ExportRequest::All,
                ..
            } => "Could not share the timetable in all formats. Try again.".to_string(),
            Self::Share {
                request: ExportRequest::Single(format),
                ..
            } => format!("Could not share {format} timetable. Try again."),
            Self::PermissionDenied => {
                "Storage permission is required to save timetable files. \
                 The timetable can still be shared as text."
                    .to_string()
            }
            Self::ExportInProgress => {
                "An export is already in progress. Please wait for it to finish.".to_string()
            }
            Self::TimetableNotFound(_) => "Timetable not found.".to_string(),
            _ => "Could not export timetable. Try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
