// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use tracing::{debug, warn};

use crate::audio::{mix, pitch, MixPlan};
use crate::config::FrequencyTable;
use crate::pcm::PcmBuffer;
use crate::samples::{SampleId, SampleStore};

use super::{render_sequence, StepSequence, Track, TrackError};

/// A track with one step sequence per note. Every note is played from a
/// single base sample, pitch shifted to the note.
pub struct InstrumentTrack {
    name: String,
    base: String,
    notes: FrequencyTable,
    store: SampleStore,
    sequences: Vec<(String, StepSequence)>,
}

impl InstrumentTrack {
    /// Creates an instrument track backed by the sample `<name>/<base>.wav`.
    /// The base note must be in the frequency table.
    pub fn new(
        name: &str,
        base: &str,
        notes: &FrequencyTable,
        length: usize,
    ) -> Result<InstrumentTrack, TrackError> {
        if !notes.contains(base) {
            return Err(TrackError::UnknownNote {
                track: name.to_string(),
                note: base.to_string(),
            });
        }

        Ok(InstrumentTrack {
            name: name.to_string(),
            base: base.to_string(),
            notes: notes.clone(),
            store: SampleStore::new(SampleId::instrument(name, base)),
            sequences: notes
                .names()
                .map(|note| (note.to_string(), StepSequence::new(length)))
                .collect(),
        })
    }

    /// The note the sample was recorded at.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The sequence for a note.
    pub fn sequence(&self, note: &str) -> Option<&StepSequence> {
        self.sequences
            .iter()
            .find(|(name, _)| name == note)
            .map(|(_, sequence)| sequence)
    }

    fn sequence_for(&self, note: Option<&str>) -> Result<&StepSequence, TrackError> {
        let note = self.require_note(note)?;
        self.sequence(note).ok_or_else(|| self.unknown(note))
    }

    fn sequence_for_mut(&mut self, note: Option<&str>) -> Result<&mut StepSequence, TrackError> {
        let note = self.require_note(note)?;
        let unknown = self.unknown(note);
        self.sequences
            .iter_mut()
            .find(|(name, _)| name == note)
            .map(|(_, sequence)| sequence)
            .ok_or(unknown)
    }

    fn require_note<'a>(&self, note: Option<&'a str>) -> Result<&'a str, TrackError> {
        note.ok_or_else(|| TrackError::MissingNote {
            track: self.name.clone(),
        })
    }

    fn unknown(&self, note: &str) -> TrackError {
        TrackError::UnknownNote {
            track: self.name.clone(),
            note: note.to_string(),
        }
    }

    /// The sample for a note: the base sample itself, or a pitch shifted copy.
    fn note_buffer(&self, base: &PcmBuffer, note: &str) -> Result<PcmBuffer, TrackError> {
        if note == self.base {
            return Ok(base.clone());
        }

        let ratio = self
            .notes
            .ratio(&self.base, note)
            .ok_or_else(|| self.unknown(note))?;
        if ratio > 1.0 {
            debug!(
                track = self.name,
                note,
                ratio,
                "Notes below the base are played at the base pitch"
            );
        }
        Ok(pitch::shift(base, ratio))
    }
}

impl Track for InstrumentTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn store(&self) -> &SampleStore {
        &self.store
    }

    fn length(&self) -> usize {
        self.sequences
            .first()
            .map(|(_, sequence)| sequence.len())
            .unwrap_or(0)
    }

    fn toggle(&mut self, note: Option<&str>, index: usize) -> Result<bool, TrackError> {
        self.sequence_for_mut(note)?.toggle(index)
    }

    fn is_on(&self, note: Option<&str>, index: usize) -> Result<bool, TrackError> {
        self.sequence_for(note)?.is_on(index)
    }

    fn preview(&self, note: Option<&str>) -> Result<PcmBuffer, TrackError> {
        let note = self.require_note(note)?;
        if !self.notes.contains(note) {
            return Err(self.unknown(note));
        }
        self.note_buffer(&self.store.buffer(), note)
    }

    fn render(&self, step_len: usize) -> Option<PcmBuffer> {
        let base = self.store.buffer();
        let mut rendered = Vec::new();

        for (note, sequence) in &self.sequences {
            if !sequence.any() {
                continue;
            }
            let buffer = match self.note_buffer(&base, note) {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!(track = self.name, note, err = %e, "Skipping note");
                    continue;
                }
            };
            if let Some(output) = render_sequence(&buffer, sequence, step_len) {
                rendered.push(output);
            }
        }

        if rendered.is_empty() {
            return None;
        }

        debug!(
            track = self.name,
            notes = rendered.len(),
            "Rendered instrument track"
        );
        let plan: MixPlan = rendered.iter().collect();
        Some(mix(&plan))
    }
}
