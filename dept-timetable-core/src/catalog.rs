use crate::{Error, Result, Semester, Timetable};

const SAMPLE_DATA: &str = include_str!("../data/timetables.json");

/// Timetable picked for a (level, semester) filter
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub timetable: &'a Timetable,
    /// `false` when nothing matched and the default timetable was returned
    pub matched: bool,
}

/// Read-only collection of timetables
#[derive(Debug, Clone)]
pub struct TimetableCatalog {
    timetables: Vec<Timetable>,
}

impl TimetableCatalog {
    /// The first timetable acts as the default selection.
    pub fn new(timetables: Vec<Timetable>) -> Result<Self> {
        if timetables.is_empty() {
            return Err(Error::Config("Timetable catalog is empty".to_string()));
        }
        Ok(Self { timetables })
    }

    pub fn from_json(json_data: &str) -> Result<Self> {
        let timetables: Vec<Timetable> = serde_json::from_str(json_data)?;
        Self::new(timetables)
    }

    /// Bundled department timetables
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_DATA)
    }

    pub fn all(&self) -> &[Timetable] {
        &self.timetables
    }

    pub fn default_timetable(&self) -> &Timetable {
        &self.timetables[0]
    }

    pub fn get(&self, id: &str) -> Result<&Timetable> {
        self.timetables
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TimetableNotFound(id.to_string()))
    }

    /// Match by level (case-insensitive) and semester, falling back to the
    /// default timetable.
    pub fn select(&self, level: &str, semester: Semester) -> Selection<'_> {
        let level = level.trim();
        match self
            .timetables
            .iter()
            .find(|t| t.semester == semester && t.level.eq_ignore_ascii_case(level))
        {
            Some(timetable) => Selection {
                timetable,
                matched: true,
            },
            None => {
                tracing::debug!(
                    "No timetable for {} {} semester, using default",
                    level,
                    semester
                );
                Selection {
                    timetable: self.default_timetable(),
                    matched: false,
                }
            }
        }
    }
}
