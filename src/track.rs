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
use crate::audio::{mix, MixPlan};
use crate::pcm::PcmBuffer;
use crate::samples::SampleStore;

mod drum;
mod instrument;
mod steps;

pub use drum::DrumTrack;
pub use instrument::InstrumentTrack;
pub use steps::{StepSequence, DEFAULT_LENGTH};

/// Errors raised when editing a track.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    #[error("Step {index} is out of range for a sequence of {length} steps")]
    StepOutOfRange { index: usize, length: usize },

    #[error("Note {note} is not known to track {track}")]
    UnknownNote { track: String, note: String },

    #[error("Track {track} needs a note")]
    MissingNote { track: String },
}

/// A single sequenced track.
pub trait Track: Send {
    /// The track name.
    fn name(&self) -> &str;

    /// The store holding the track's sample.
    fn store(&self) -> &SampleStore;

    /// The number of steps in each of the track's sequences.
    fn length(&self) -> usize;

    /// Flips a step and returns its new value. Instrument tracks need a note,
    /// drum tracks ignore it.
    fn toggle(&mut self, note: Option<&str>, index: usize) -> Result<bool, TrackError>;

    /// Returns whether a step is on.
    fn is_on(&self, note: Option<&str>, index: usize) -> Result<bool, TrackError>;

    /// The sound of a single step.
    fn preview(&self, note: Option<&str>) -> Result<PcmBuffer, TrackError>;

    /// Renders one loop of the track. Returns None if no step is on.
    fn render(&self, step_len: usize) -> Option<PcmBuffer>;
}

/// Places the sample at every active step of the sequence.
pub fn plan<'a>(sample: &'a PcmBuffer, sequence: &StepSequence, step_len: usize) -> MixPlan<'a> {
    let mut plan = MixPlan::new();
    for index in sequence.active() {
        plan.push(sample, index * step_len);
    }
    plan
}

/// Renders a single sequence, or None if none of its steps are on.
pub(crate) fn render_sequence(
    sample: &PcmBuffer,
    sequence: &StepSequence,
    step_len: usize,
) -> Option<PcmBuffer> {
    let plan = plan(sample, sequence, step_len);
    if plan.is_empty() {
        return None;
    }
    Some(mix(&plan))
}
