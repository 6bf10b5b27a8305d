use std::sync::LazyLock;

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;

use crate::{ExportArtifact, ExportFormat, Timetable, TimeSlot};

#[cfg(test)]
mod tests;

const CSV_HEADER: &str = "Day,Start Time,End Time,Course Code,Course Title,Room,Lecturer";
const TIME_WIDTH: usize = 13;
const ROOM_WIDTH: usize = 10;
const LECTURER_WIDTH: usize = 20;

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\s/\\:*?"<>|]+"#).expect("valid file name pattern"));

/// Timetable renderer for every export format
#[derive(Debug, Clone)]
pub struct Renderer {
    course_label_width: usize,
}

impl Renderer {
    pub fn new(course_label_width: usize) -> Self {
        Self { course_label_width }
    }

    /// Text content of a format. PDF yields the HTML it is converted from.
    pub fn render(&self, timetable: &Timetable, format: ExportFormat) -> String {
        match format {
            ExportFormat::Text => self.text_table(timetable),
            ExportFormat::Csv => self.csv(timetable),
            ExportFormat::Html | ExportFormat::Pdf => self.html(timetable),
        }
    }

    pub fn artifact(&self, timetable: &Timetable, format: ExportFormat) -> ExportArtifact {
        ExportArtifact {
            content: self.render(timetable, format),
            file_name: file_name(timetable, format),
            mime_type: format.mime_type(),
        }
    }

    /// Fixed-width plain text table, one section per day with classes.
    pub fn text_table(&self, timetable: &Timetable) -> String {
        let course_width = self.course_label_width + 3;
        let rule = "-".repeat(TIME_WIDTH + course_width + ROOM_WIDTH + LECTURER_WIDTH + 3);

        let mut out = format!(
            "{} - {} {} Semester\n\n",
            timetable.name, timetable.academic_year, timetable.semester
        );

        for (day, slots) in timetable.days() {
            out.push_str(&format!("{}\n{}\n", day, rule));
            for slot in slots {
                out.push_str(&format!(
                    "{:<tw$} {:<cw$} {:<rw$} {}\n",
                    format!("{}-{}", slot.start_time, slot.end_time),
                    self.course_label(slot),
                    slot.room,
                    slot.lecturer,
                    tw = TIME_WIDTH,
                    cw = course_width,
                    rw = ROOM_WIDTH,
                ));
            }
            out.push('\n');
        }

        out
    }

    /// CSV with a header row. Fields containing commas are quoted; embedded
    /// quotes are left as they are.
    pub fn csv(&self, timetable: &Timetable) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');

        for (day, slots) in timetable.days() {
            for slot in slots {
                let row = [
                    day.as_str(),
                    slot.start_time.as_str(),
                    slot.end_time.as_str(),
                    slot.course_code.as_str(),
                    slot.course_title.as_str(),
                    slot.room.as_str(),
                    slot.lecturer.as_str(),
                ]
                .map(csv_field)
                .join(",");
                out.push_str(&row);
                out.push('\n');
            }
        }

        out
    }

    /// Standalone HTML document stamped with the current local time.
    pub fn html(&self, timetable: &Timetable) -> String {
        self.html_at(timetable, Local::now())
    }

    pub fn html_at<Tz>(&self, timetable: &Timetable, generated_at: DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!(
            "<title>{} Timetable</title>\n",
            escape_html(&timetable.name)
        ));
        out.push_str("</head>\n");
        out.push_str(
            "<body style=\"font-family: Arial, sans-serif; margin: 24px; color: #1f2937;\">\n",
        );
        out.push_str(&format!(
            "<h1 style=\"color: #1e3a8a; margin-bottom: 4px;\">{}</h1>\n",
            escape_html(&timetable.name)
        ));
        out.push_str(&format!(
            "<p style=\"color: #4b5563; margin-top: 0;\">{} &bull; {} Semester</p>\n",
            escape_html(&timetable.academic_year),
            timetable.semester
        ));

        for (day, slots) in timetable.days() {
            out.push_str(&format!(
                "<h2 style=\"color: #1e3a8a; border-bottom: 2px solid #1e3a8a;\">{}</h2>\n",
                day
            ));
            out.push_str(
                "<table style=\"width: 100%; border-collapse: collapse; margin-bottom: 16px;\">\n",
            );
            out.push_str("<tr style=\"background: #1e3a8a; color: #ffffff;\">");
            for heading in ["Time", "Course", "Room", "Lecturer"] {
                out.push_str(&format!(
                    "<th style=\"padding: 8px; text-align: left;\">{}</th>",
                    heading
                ));
            }
            out.push_str("</tr>\n");

            for slot in slots {
                out.push_str("<tr style=\"border-bottom: 1px solid #e5e7eb;\">");
                for cell in [
                    format!("{} - {}", slot.start_time, slot.end_time),
                    format!("{} - {}", slot.course_code, slot.course_title),
                    slot.room.clone(),
                    slot.lecturer.clone(),
                ] {
                    out.push_str(&format!(
                        "<td style=\"padding: 8px;\">{}</td>",
                        escape_html(&cell)
                    ));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }

        out.push_str(&format!(
            "<p style=\"font-size: 12px; color: #6b7280;\">Generated on {}</p>\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("</body>\n</html>\n");
        out
    }

    /// Every format back to back, for sharing all of them in one message.
    pub fn composite(&self, timetable: &Timetable) -> String {
        let html = self.html(timetable);
        let sections = [
            ("TEXT".to_string(), self.text_table(timetable)),
            ("CSV".to_string(), self.csv(timetable)),
            ("HTML".to_string(), html.clone()),
            ("PDF (generated from HTML)".to_string(), html),
        ];

        sections
            .iter()
            .map(|(title, body)| format!("=== {} ===\n{}", title, body))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn course_label(&self, slot: &TimeSlot) -> String {
        let label = format!("{} - {}", slot.course_code, slot.course_title);
        if label.chars().count() > self.course_label_width {
            let cut: String = label.chars().take(self.course_label_width).collect();
            format!("{}...", cut)
        } else {
            label
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(20)
    }
}

/// `{level}_{semester}_Trimester_Timetable.{ext}`, stable per timetable and
/// format so a repeated export overwrites the previous file.
pub fn file_name(timetable: &Timetable, format: ExportFormat) -> String {
    let level = UNSAFE_PATH_CHARS.replace_all(timetable.level.trim(), "_");
    format!(
        "{}_{}_Trimester_Timetable.{}",
        level,
        timetable.semester,
        format.extension()
    )
}

/// Title shown on the share sheet.
pub fn share_title(timetable: &Timetable, label: &str) -> String {
    format!("{} Timetable ({})", timetable.name, label)
}

fn csv_field(field: &str) -> String {
    if field.contains(',') {
        format!("\"{}\"", field)
    } else {
        field.to_string()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
