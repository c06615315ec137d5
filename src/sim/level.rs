//! Level data and note timelines
//!
//! Levels are JSON documents listing, per band member, the note records laid
//! out by the editor. Loading validates them and turns each lane into a sorted
//! `Timeline` drained by a forward-only cursor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::note::{Note, NoteKind};
use crate::consts::MAX_LANES;

/// Errors raised while loading a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level has no band members")]
    NoLanes,

    #[error("level has {count} band members, at most {} are supported", MAX_LANES)]
    TooManyLanes { count: usize },

    #[error("lane {lane} note {index}: hold has no release connection")]
    MissingRelease { lane: usize, index: usize },

    #[error("lane {lane} note {index}: hold must end after it starts ({start} -> {end})")]
    EmptyHold {
        lane: usize,
        index: usize,
        start: i64,
        end: i64,
    },

    #[error("lane {lane} note {index}: line {line} is outside 0..{lines}")]
    LineOutOfRange {
        lane: usize,
        index: usize,
        line: i64,
        lines: usize,
    },

    #[error("lane {lane} note {index}: negative sample {sample}")]
    NegativeSample { lane: usize, index: usize, sample: i64 },
}

/// Note type tag as written by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Single,
    Hold,
    Switch,
}

/// A follow-up point of a note (the release of a hold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub sample: i64,
}

/// One note as stored in a level file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Line within the lane (ignored for switch notes)
    pub lane: i64,
    pub sample: i64,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Raw level document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub name: String,
    /// Note records per band member
    pub lanes: Vec<Vec<NoteRecord>>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut data = Self::from_json(&text)?;
        if data.name.is_empty() {
            data.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(data)
    }

    /// Validate and convert into per-lane timelines
    pub fn build(&self, lines: usize, spawn_lead: i64) -> Result<Level, LevelError> {
        if self.lanes.is_empty() {
            return Err(LevelError::NoLanes);
        }
        if self.lanes.len() > MAX_LANES {
            return Err(LevelError::TooManyLanes {
                count: self.lanes.len(),
            });
        }

        let mut next_id = 1u32;
        let mut timelines = Vec::with_capacity(self.lanes.len());

        for (lane, records) in self.lanes.iter().enumerate() {
            let mut notes = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                notes.push(record_to_note(record, lane, index, lines, next_id)?);
                next_id += 1;
            }
            timelines.push(Timeline::new(notes, spawn_lead));
        }

        let level = Level {
            name: self.name.clone(),
            timelines,
        };
        log::info!(
            "Loaded level '{}': {} band members, {} notes",
            level.name,
            level.lane_count(),
            level.note_count()
        );
        Ok(level)
    }
}

fn record_to_note(
    record: &NoteRecord,
    lane: usize,
    index: usize,
    lines: usize,
    id: u32,
) -> Result<Note, LevelError> {
    if record.sample < 0 {
        return Err(LevelError::NegativeSample {
            lane,
            index,
            sample: record.sample,
        });
    }

    let line = || {
        usize::try_from(record.lane)
            .ok()
            .filter(|&l| l < lines)
            .ok_or(LevelError::LineOutOfRange {
                lane,
                index,
                line: record.lane,
                lines,
            })
    };

    let note = match record.kind {
        RecordKind::Single => Note::single(id, line()?, record.sample),
        RecordKind::Hold => {
            let end = record
                .connections
                .first()
                .ok_or(LevelError::MissingRelease { lane, index })?
                .sample;
            if end <= record.sample {
                return Err(LevelError::EmptyHold {
                    lane,
                    index,
                    start: record.sample,
                    end,
                });
            }
            Note::hold(id, line()?, record.sample, end - record.sample)
        }
        RecordKind::Switch => Note::switch(id, record.sample),
    };
    Ok(note)
}

/// A lane's notes in spawn order, drained by a cursor
#[derive(Debug, Clone)]
pub struct Timeline {
    notes: Vec<Note>,
    cursor: usize,
    spawn_lead: i64,
}

impl Timeline {
    /// Sort `notes` by target sample (stable) and park the cursor at the start
    pub fn new(mut notes: Vec<Note>, spawn_lead: i64) -> Self {
        notes.sort_by_key(|n| n.hit_sample);
        Self {
            notes,
            cursor: 0,
            spawn_lead,
        }
    }

    pub fn spawn_lead(&self) -> i64 {
        self.spawn_lead
    }

    /// Pop the head if its spawn threshold has been reached at `now`
    pub fn next_due(&mut self, now: i64) -> Option<Note> {
        let note = self.notes.get(self.cursor)?;
        if note.spawn_sample(self.spawn_lead) > now {
            return None;
        }
        self.cursor += 1;
        Some(note.clone())
    }

    /// Notes not yet spawned
    pub fn pending(&self) -> &[Note] {
        &self.notes[self.cursor..]
    }

    pub fn is_drained(&self) -> bool {
        self.cursor >= self.notes.len()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Last sample any note of this lane needs
    pub fn end_sample(&self) -> i64 {
        self.notes.iter().map(Note::tail_sample).max().unwrap_or(0)
    }

    /// Restart from the first note
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

/// A validated level
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub timelines: Vec<Timeline>,
}

impl Level {
    pub fn lane_count(&self) -> usize {
        self.timelines.len()
    }

    pub fn note_count(&self) -> usize {
        self.timelines.iter().map(Timeline::len).sum()
    }

    /// Count notes of each kind (single, hold, switch)
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for note in self.timelines.iter().flat_map(|t| t.notes.iter()) {
            match note.kind {
                NoteKind::Single => counts.0 += 1,
                NoteKind::Hold { .. } => counts.1 += 1,
                NoteKind::Switch => counts.2 += 1,
            }
        }
        counts
    }

    pub fn end_sample(&self) -> i64 {
        self.timelines.iter().map(Timeline::end_sample).max().unwrap_or(0)
    }
}
