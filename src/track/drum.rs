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
use tracing::debug;

use crate::pcm::PcmBuffer;
use crate::samples::{SampleId, SampleStore};

use super::{render_sequence, StepSequence, Track, TrackError};

/// A track that plays one sample on every active step.
pub struct DrumTrack {
    name: String,
    store: SampleStore,
    sequence: StepSequence,
}

impl DrumTrack {
    /// Creates a drum track backed by the sample `<name>/01.wav`.
    pub fn new(name: &str, length: usize) -> DrumTrack {
        DrumTrack {
            name: name.to_string(),
            store: SampleStore::new(SampleId::drum(name)),
            sequence: StepSequence::new(length),
        }
    }

    /// The track's step sequence.
    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }
}

impl Track for DrumTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn store(&self) -> &SampleStore {
        &self.store
    }

    fn length(&self) -> usize {
        self.sequence.len()
    }

    fn toggle(&mut self, _note: Option<&str>, index: usize) -> Result<bool, TrackError> {
        self.sequence.toggle(index)
    }

    fn is_on(&self, _note: Option<&str>, index: usize) -> Result<bool, TrackError> {
        self.sequence.is_on(index)
    }

    fn preview(&self, _note: Option<&str>) -> Result<PcmBuffer, TrackError> {
        Ok(self.store.buffer())
    }

    fn render(&self, step_len: usize) -> Option<PcmBuffer> {
        let rendered = render_sequence(&self.store.buffer(), &self.sequence, step_len);
        debug!(
            track = self.name,
            steps = self.sequence.active().count(),
            bytes = rendered.as_ref().map(PcmBuffer::len),
            "Rendered drum track"
        );
        rendered
    }
}
