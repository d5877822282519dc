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
use std::{error::Error, fmt, path::PathBuf, sync::Arc};

pub mod file;
pub mod mixer;
pub mod mock;
pub mod pitch;
pub mod wav;

pub use mixer::{mix, MixPlan};

/// Receives WAV containers for playback.
pub trait Sink: fmt::Display + Send + Sync {
    /// Starts playing the given WAV container immediately, replacing anything
    /// that is currently playing.
    fn play(&self, container: &[u8]) -> Result<(), Box<dyn Error>>;

    /// Plays the last container again from the start.
    fn replay(&self) -> Result<(), Box<dyn Error>>;
}

/// Gets a sink. Without an output path a mock sink is used, which only keeps
/// track of what it was asked to play.
pub fn get_sink(output: Option<PathBuf>) -> Arc<dyn Sink> {
    match output {
        Some(path) => Arc::new(file::Sink::new(path)),
        None => Arc::new(mock::Sink::get("mock")),
    }
}
