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
use std::{error::Error, fmt, fs, path::PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

/// A sink that writes each played container to a file, replacing the previous
/// one. Stands in for an audio device when running headless.
pub struct Sink {
    path: PathBuf,
    /// Number of times the current container has been played.
    plays: Mutex<u64>,
}

impl Sink {
    /// Creates a new file sink writing to the given path.
    pub fn new(path: PathBuf) -> Sink {
        Sink {
            path,
            plays: Mutex::new(0),
        }
    }
}

impl crate::audio::Sink for Sink {
    fn play(&self, container: &[u8]) -> Result<(), Box<dyn Error>> {
        fs::write(&self.path, container)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))?;
        *self.plays.lock() = 1;
        info!(
            path = ?self.path,
            bytes = container.len(),
            "Wrote container."
        );
        Ok(())
    }

    fn replay(&self) -> Result<(), Box<dyn Error>> {
        let mut plays = self.plays.lock();
        if *plays == 0 {
            return Err("nothing has been played yet".into());
        }
        *plays += 1;
        debug!(path = ?self.path, plays = *plays, "Replaying container.");
        Ok(())
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (File)", self.path.display())
    }
}
