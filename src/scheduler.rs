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
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::audio::{mix, wav, MixPlan, Sink};
use crate::config::Settings;
use crate::pcm::PcmBuffer;
use crate::track::Track;

/// Tempo-derived timing of a loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    step_len: usize,
    step_duration: Duration,
    steps: usize,
}

impl Timing {
    pub fn new(tempo: u32, steps_per_beat: u32, steps: usize) -> Timing {
        let bytes_per_beat = u64::from(wav::SAMPLE_RATE) * 60 / u64::from(tempo.max(1));
        let step_len = (bytes_per_beat - bytes_per_beat % u64::from(wav::BLOCK_ALIGN))
            .max(u64::from(wav::BLOCK_ALIGN));
        let step_duration = Duration::from_secs(60) / tempo.max(1) / steps_per_beat.max(1);

        Timing {
            step_len: step_len as usize,
            step_duration,
            steps,
        }
    }

    pub fn from_settings(settings: &Settings) -> Timing {
        Timing::new(
            settings.tempo(),
            settings.steps_per_beat(),
            settings.steps(),
        )
    }

    /// Byte offset between two consecutive steps in a rendered loop.
    pub fn step_len(&self) -> usize {
        self.step_len
    }

    /// Time between two consecutive steps.
    pub fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// Time between two repeats of the loop.
    pub fn loop_duration(&self) -> Duration {
        self.step_duration
            .saturating_mul(u32::try_from(self.steps).unwrap_or(u32::MAX))
    }
}

/// The state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Looping,
}

/// Renders the tracks and mixes them together. Silent tracks are skipped.
pub fn mix_tracks(tracks: &[Box<dyn Track>], step_len: usize) -> PcmBuffer {
    let rendered: Vec<PcmBuffer> = tracks
        .iter()
        .filter_map(|track| track.render(step_len))
        .collect();
    let plan: MixPlan = rendered.iter().collect();
    mix(&plan)
}

/// Plays the mixed tracks and repeats the mix every loop.
///
/// The scheduler doesn't own a timer. It exposes the deadline of the next
/// repeat and whoever drives it calls [Scheduler::repeat] once the deadline
/// passes.
#[derive(Debug)]
pub struct Scheduler {
    timing: Timing,
    state: PlaybackState,
    retained: Option<PcmBuffer>,
    deadline: Option<Instant>,
    interrupted: bool,
}

impl Scheduler {
    pub fn new(timing: Timing) -> Scheduler {
        Scheduler {
            timing,
            state: PlaybackState::Stopped,
            retained: None,
            deadline: None,
            interrupted: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// When the loop should next repeat, if playing.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The last mix handed to the sink.
    pub fn retained(&self) -> Option<&PcmBuffer> {
        self.retained.as_ref()
    }

    /// Renders every track, plays the mix and arms the loop deadline. Starting
    /// while already playing renders again from scratch.
    pub fn start(&mut self, tracks: &[Box<dyn Track>], sink: &dyn Sink) {
        let mixed = mix_tracks(tracks, self.timing.step_len());
        info!(
            tracks = tracks.len(),
            bytes = mixed.len(),
            loop_duration = ?self.timing.loop_duration(),
            "Starting playback."
        );

        if let Err(e) = sink.play(&wav::wrap(&mixed)) {
            error!(err = e.as_ref(), sink = %sink, "Error playing mix");
        }
        self.retained = Some(mixed);
        self.interrupted = false;
        self.state = PlaybackState::Playing;
        self.arm();
    }

    /// Plays the retained mix again and re-arms the deadline. If nothing has
    /// been played yet this starts playback instead.
    pub fn repeat(&mut self, tracks: &[Box<dyn Track>], sink: &dyn Sink) {
        let Some(retained) = &self.retained else {
            self.start(tracks, sink);
            return;
        };

        debug!(interrupted = self.interrupted, "Repeating loop.");
        let result = if self.interrupted {
            sink.play(&wav::wrap(retained))
        } else {
            sink.replay()
        };
        if let Err(e) = result {
            error!(err = e.as_ref(), sink = %sink, "Error repeating mix");
        }
        self.interrupted = false;
        self.state = PlaybackState::Looping;
        self.arm();
    }

    /// Stops playback. Cancels the pending deadline so nothing repeats. The
    /// retained mix is kept, and a later repeat sends it again in full.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Stopped {
            info!("Stopping playback.");
        }
        self.deadline = None;
        self.interrupted = true;
        self.state = PlaybackState::Stopped;
    }

    /// Records that something else was sent to the sink, so the next repeat
    /// has to send the retained mix again instead of replaying the last one.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.timing.loop_duration());
    }
}
