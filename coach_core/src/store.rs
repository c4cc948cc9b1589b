//! Workout store for generated programs.
//!
//! Programs are appended to a JSONL (JSON Lines) file with file locking.
//! Sections are written as structured JSON when the store accepts it, and as
//! a serialized JSON string otherwise.

use crate::{
    Error, GeneratedProgram, ProgramSummary, ProgramType, ResolvedSection, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stored form of a program's sections
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SectionsPayload {
    Structured(Vec<ResolvedSection>),
    Serialized(String),
}

impl SectionsPayload {
    pub fn is_structured(&self) -> bool {
        matches!(self, SectionsPayload::Structured(_))
    }

    /// Sections regardless of stored form
    pub fn sections(&self) -> Result<Vec<ResolvedSection>> {
        match self {
            SectionsPayload::Structured(sections) => Ok(sections.clone()),
            SectionsPayload::Serialized(json) => Ok(serde_json::from_str(json)?),
        }
    }
}

/// A generated program as written to the workout store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub program: ProgramType,
    pub day: u8,
    pub sections: SectionsPayload,
    pub summary: ProgramSummary,
    pub saved_at: DateTime<Utc>,
}

impl ProgramRecord {
    fn with_sections(
        program: &GeneratedProgram,
        sections: SectionsPayload,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: program.id,
            user_id: program.user_id.clone(),
            title: program.title.clone(),
            description: program.description.clone(),
            date: program.date,
            duration_minutes: program.duration_minutes,
            program: program.program,
            day: program.day,
            sections,
            summary: program.summary.clone(),
            saved_at,
        }
    }

    /// Record with sections as structured JSON
    pub fn structured(program: &GeneratedProgram, saved_at: DateTime<Utc>) -> Self {
        Self::with_sections(
            program,
            SectionsPayload::Structured(program.sections.clone()),
            saved_at,
        )
    }

    /// Record with sections as a serialized JSON string
    pub fn serialized(program: &GeneratedProgram, saved_at: DateTime<Utc>) -> Result<Self> {
        let json = serde_json::to_string(&program.sections)?;
        Ok(Self::with_sections(
            program,
            SectionsPayload::Serialized(json),
            saved_at,
        ))
    }
}

/// Sink trait for persisting generated programs
pub trait WorkoutSink {
    /// Store a record. Returns [`Error::SinkRejected`] when the store refuses
    /// the record's form; other errors are failures.
    fn append(&mut self, record: &ProgramRecord) -> Result<()>;
}

/// JSONL-based workout sink with file locking
pub struct JsonlSink {
    path: PathBuf,
    structured_sections: bool,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            structured_sections: true,
        }
    }

    /// Whether structured sections are accepted (legacy stores take strings only)
    pub fn with_structured_sections(mut self, accept: bool) -> Self {
        self.structured_sections = accept;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl WorkoutSink for JsonlSink {
    fn append(&mut self, record: &ProgramRecord) -> Result<()> {
        if record.sections.is_structured() && !self.structured_sections {
            return Err(Error::SinkRejected(
                "store only accepts serialized sections".into(),
            ));
        }

        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended program {} to {:?}", record.id, self.path);
        Ok(())
    }
}

/// Form the sections ended up stored in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoredAs {
    Structured,
    Serialized,
}

/// Persist a program, falling back to serialized sections if the sink
/// rejects the structured form.
pub fn save_program<S: WorkoutSink + ?Sized>(
    sink: &mut S,
    program: &GeneratedProgram,
    saved_at: DateTime<Utc>,
) -> Result<StoredAs> {
    match sink.append(&ProgramRecord::structured(program, saved_at)) {
        Ok(()) => Ok(StoredAs::Structured),
        Err(Error::SinkRejected(reason)) => {
            tracing::warn!(
                "Structured sections rejected ({}), retrying as serialized string",
                reason
            );
            sink.append(&ProgramRecord::serialized(program, saved_at)?)?;
            Ok(StoredAs::Serialized)
        }
        Err(e) => Err(e),
    }
}

/// Read all program records from a JSONL file
pub fn read_programs(path: &Path) -> Result<Vec<ProgramRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ProgramRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse program at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} programs from {:?}", records.len(), path);
    Ok(records)
}
