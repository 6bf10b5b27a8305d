use super::*;
use crate::{Semester, TimeSlot, Timetable, WeekDay};
use chrono::{TimeZone, Utc};

fn slot(day: WeekDay, start: &str, end: &str, code: &str, title: &str, room: &str, lecturer: &str) -> TimeSlot {
    TimeSlot {
        day,
        start_time: start.to_string(),
        end_time: end.to_string(),
        course_code: code.to_string(),
        course_title: title.to_string(),
        room: room.to_string(),
        lecturer: lecturer.to_string(),
    }
}

fn timetable(slots: Vec<TimeSlot>) -> Timetable {
    Timetable {
        id: "tt-100-first".to_string(),
        name: "Level 100 Timetable".to_string(),
        level: "Level 100".to_string(),
        academic_year: "2024/2025".to_string(),
        semester: Semester::First,
        slots,
    }
}

fn single_slot() -> Timetable {
    timetable(vec![slot(
        WeekDay::Monday,
        "09:00",
        "11:00",
        "CS 101",
        "Intro to CS",
        "LT1",
        "Dr. X",
    )])
}

fn week() -> Timetable {
    timetable(vec![
        slot(WeekDay::Wednesday, "14:00", "16:00", "CS 105", "Programming", "Lab 2", "Dr. Y"),
        slot(WeekDay::Monday, "13:00", "15:00", "MATH 121", "Algebra", "LT2", "Prof. Z"),
        slot(WeekDay::Monday, "08:00", "10:00", "CS 103", "Applications", "Lab 1", "Mr. W"),
        slot(WeekDay::Wednesday, "09:00", "11:00", "CS 101", "Intro to CS", "LT1", "Dr. X"),
        slot(WeekDay::Friday, "10:00", "11:00", "CS 107", "Ethics", "LT1", "Dr. V"),
    ])
}

#[test]
fn text_table_has_one_section_per_day_with_classes() {
    let text = Renderer::default().text_table(&week());

    for day in ["Monday", "Wednesday", "Friday"] {
        assert_eq!(text.lines().filter(|l| *l == day).count(), 1, "{day}");
    }
    for day in ["Tuesday", "Thursday"] {
        assert!(!text.contains(day), "{day} has no classes");
    }

    let monday = text.find("Monday").unwrap();
    let wednesday = text.find("Wednesday").unwrap();
    let friday = text.find("Friday").unwrap();
    assert!(monday < wednesday && wednesday < friday);
}

#[test]
fn text_table_sorts_each_day_by_start_time() {
    let text = Renderer::default().text_table(&week());
    let starts: Vec<&str> = text
        .lines()
        .filter(|l| l.len() > 5 && l.as_bytes()[2] == b':')
        .map(|l| &l[..5])
        .collect();

    assert_eq!(starts, ["08:00", "13:00", "09:00", "14:00", "10:00"]);
}

#[test]
fn text_table_single_slot_scenario() {
    let text = Renderer::default().text_table(&single_slot());

    assert!(text.starts_with("Level 100 Timetable - 2024/2025 First Semester\n\n"));
    assert!(text.contains("CS 101"));
    assert!(text.contains("Monday\n---"));
    assert!(text.contains("09:00-11:00"));
    assert!(text.contains("LT1"));
    assert!(text.lines().any(|l| l.ends_with("Dr. X")));
    assert!(!text.contains("Tuesday"));
}

#[test]
fn text_table_truncates_long_course_labels() {
    let tt = timetable(vec![slot(
        WeekDay::Tuesday,
        "10:00",
        "12:00",
        "CS 201",
        "Data Structures and Algorithms",
        "LT2",
        "Dr. Y",
    )]);
    let text = Renderer::default().text_table(&tt);

    assert!(text.contains("CS 201 - Data Struct..."));
    assert!(!text.contains("Algorithms"));
}

#[test]
fn csv_single_slot_scenario() {
    let csv = Renderer::default().csv(&single_slot());
    assert_eq!(
        csv,
        "Day,Start Time,End Time,Course Code,Course Title,Room,Lecturer\n\
         Monday,09:00,11:00,CS 101,Intro to CS,LT1,Dr. X\n"
    );
}

#[test]
fn csv_quotes_fields_with_commas_only() {
    let tt = timetable(vec![slot(
        WeekDay::Thursday,
        "08:00",
        "10:00",
        "ENG 101",
        "Reading, Writing",
        "LT3",
        "Mrs. \"E\" Asante",
    )]);
    let csv = Renderer::default().csv(&tt);

    assert!(csv.ends_with("Thursday,08:00,10:00,ENG 101,\"Reading, Writing\",LT3,Mrs. \"E\" Asante\n"));
}

#[test]
fn csv_parses_back_into_the_slots() {
    let tt = week();
    let csv = Renderer::default().csv(&tt);

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 7);

    let mut parsed: Vec<(String, String, String, String, String, String)> = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (
                r[0].to_string(),
                r[1].to_string(),
                r[2].to_string(),
                r[3].to_string(),
                r[5].to_string(),
                r[6].to_string(),
            )
        })
        .collect();
    let mut expected: Vec<_> = tt
        .slots
        .iter()
        .map(|s| {
            (
                s.day.to_string(),
                s.start_time.clone(),
                s.end_time.clone(),
                s.course_code.clone(),
                s.room.clone(),
                s.lecturer.clone(),
            )
        })
        .collect();

    parsed.sort();
    expected.sort();
    assert_eq!(parsed, expected);
}

#[test]
fn html_contains_one_table_per_day_and_footer() {
    let at = Utc.with_ymd_and_hms(2025, 1, 6, 8, 30, 0).unwrap();
    let html = Renderer::default().html_at(&week(), at);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<table").count(), 3);
    assert_eq!(html.matches("<th ").count(), 12);
    assert!(html.contains(">CS 101 - Intro to CS</td>"));
    assert!(html.contains("Generated on 2025-01-06 08:30:00"));
    assert!(!html.contains("Tuesday"));
}

#[test]
fn html_escapes_markup() {
    let tt = timetable(vec![slot(
        WeekDay::Monday,
        "09:00",
        "10:00",
        "CS 1<2>",
        "R&D",
        "LT1",
        "Dr. X",
    )]);
    let html = Renderer::default().html(&tt);
    assert!(html.contains("CS 1&lt;2&gt; - R&amp;D"));
}

#[test]
fn generators_are_stable() {
    let renderer = Renderer::default();
    let tt = week();
    let at = Utc.with_ymd_and_hms(2025, 1, 6, 8, 30, 0).unwrap();

    assert_eq!(renderer.text_table(&tt), renderer.text_table(&tt));
    assert_eq!(renderer.csv(&tt), renderer.csv(&tt));
    assert_eq!(renderer.html_at(&tt, at), renderer.html_at(&tt, at));
}

#[test]
fn empty_timetable_renders_headers_only() {
    let tt = timetable(Vec::new());
    let renderer = Renderer::default();

    assert_eq!(
        renderer.csv(&tt),
        "Day,Start Time,End Time,Course Code,Course Title,Room,Lecturer\n"
    );
    assert_eq!(
        renderer.text_table(&tt),
        "Level 100 Timetable - 2024/2025 First Semester\n\n"
    );
    assert!(!renderer.html(&tt).contains("<table"));
}

#[test]
fn composite_has_all_sections_in_order() {
    let composite = Renderer::default().composite(&single_slot());

    let positions: Vec<usize> = ["=== TEXT ===", "=== CSV ===", "=== HTML ===", "=== PDF"]
        .iter()
        .map(|h| composite.find(h).expect(h))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(composite.contains("Monday,09:00,11:00,CS 101,Intro to CS,LT1,Dr. X"));
}

#[test]
fn file_names_are_deterministic() {
    let tt = single_slot();
    assert_eq!(
        file_name(&tt, ExportFormat::Csv),
        "Level_100_First_Trimester_Timetable.csv"
    );
    assert_eq!(file_name(&tt, ExportFormat::Pdf), file_name(&tt, ExportFormat::Pdf));

    let mut odd = single_slot();
    odd.level = "Level 100/Top Up".to_string();
    odd.semester = Semester::Third;
    assert_eq!(
        file_name(&odd, ExportFormat::Text),
        "Level_100_Top_Up_Third_Trimester_Timetable.txt"
    );
}
