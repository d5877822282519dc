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
use std::{error::Error, fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, info};

/// A call made to the mock sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// A container was played.
    Play(Vec<u8>),
    /// The last container was replayed.
    Replay,
}

/// A mock sink. Doesn't actually play anything, but records every call.
#[derive(Clone)]
pub struct Sink {
    name: String,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Sink {
    /// Gets the given mock sink.
    pub fn get(name: &str) -> Sink {
        Sink {
            name: name.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a copy of every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns the number of replay calls received so far.
    pub fn replays(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| **call == Call::Replay)
            .count()
    }

    /// Returns the containers played so far, in order.
    pub fn played(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Play(container) => Some(container.clone()),
                Call::Replay => None,
            })
            .collect()
    }
}

impl crate::audio::Sink for Sink {
    fn play(&self, container: &[u8]) -> Result<(), Box<dyn Error>> {
        info!(sink = self.name, bytes = container.len(), "Playing container.");
        self.calls.lock().push(Call::Play(container.to_vec()));
        Ok(())
    }

    fn replay(&self) -> Result<(), Box<dyn Error>> {
        debug!(sink = self.name, "Replaying last container.");
        self.calls.lock().push(Call::Replay);
        Ok(())
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
