use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Teaching day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    /// Rendering order used by every export format
    pub const ALL: [WeekDay; 5] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semester (trimester) of the academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
    First,
    Second,
    Third,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Semester::First => "First",
            Semester::Second => "Second",
            Semester::Third => "Third",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(Semester::First),
            "second" | "2" => Ok(Semester::Second),
            "third" | "3" => Ok(Semester::Third),
            other => Err(Error::Config(format!(
                "Invalid semester '{}', expected First, Second or Third",
                other
            ))),
        }
    }
}

/// One scheduled class occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub day: WeekDay,
    /// Zero-padded `HH:MM`
    pub start_time: String,
    /// Zero-padded `HH:MM`
    pub end_time: String,
    pub course_code: String,
    pub course_title: String,
    pub room: String,
    pub lecturer: String,
}

/// Timetable of one academic level for one semester
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub id: String,
    pub name: String,
    /// e.g. "Level 100"
    pub level: String,
    /// e.g. "2024/2025"
    pub academic_year: String,
    pub semester: Semester,
    pub slots: Vec<TimeSlot>,
}

impl Timetable {
    /// Slots of one day sorted by start time.
    pub fn slots_on(&self, day: WeekDay) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self.slots.iter().filter(|s| s.day == day).collect();
        slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        slots
    }

    /// Days that have at least one slot, Monday first, with their sorted slots.
    pub fn days(&self) -> Vec<(WeekDay, Vec<&TimeSlot>)> {
        WeekDay::ALL
            .iter()
            .map(|&day| (day, self.slots_on(day)))
            .filter(|(_, slots)| !slots.is_empty())
            .collect()
    }
}

/// Export format offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Csv,
    Html,
    Pdf,
}

impl ExportFormat {
    /// Order used when every format is exported
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Text,
        ExportFormat::Csv,
        ExportFormat::Html,
        ExportFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Html => "text/html",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Format whose text content is shared when a file of this MIME type
    /// could not be shared natively.
    pub fn fallback_for_mime(mime_type: &str) -> ExportFormat {
        match mime_type {
            "text/plain" => ExportFormat::Text,
            "text/csv" => ExportFormat::Csv,
            _ => ExportFormat::Html,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Text => "Text",
            ExportFormat::Csv => "CSV",
            ExportFormat::Html => "HTML",
            ExportFormat::Pdf => "PDF",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::Config(format!("Unknown export format '{}'", other))),
        }
    }
}

/// What the user picked from the export menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportRequest {
    Single(ExportFormat),
    All,
}

impl fmt::Display for ExportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportRequest::Single(format) => format.fmt(f),
            ExportRequest::All => f.write_str("All formats"),
        }
    }
}

impl FromStr for ExportRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ExportRequest::All)
        } else {
            s.parse().map(ExportRequest::Single)
        }
    }
}

/// Generated content ready to be written or shared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub content: String,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// A file written to the documents directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

/// Result of materializing one format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    File(FileDescriptor),
    /// Content already went out through the share sheet; no file exists
    SharedDirectly,
}

/// Answer of a share dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShareOutcome {
    Shared,
    /// Dismissed by the user; not an error
    Cancelled,
}

/// Export engine options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Course labels longer than this are cut and suffixed with `...`
    pub course_label_width: usize,
    /// Keep exporting the remaining formats of an "all formats" request
    /// after one of them fails. Off by default: the first failure aborts.
    pub continue_all_on_error: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            course_label_width: 20,
            continue_all_on_error: false,
        }
    }
}
