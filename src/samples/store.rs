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

//! Sample loading for tracks.
//!
//! Each track owns one store. The store is filled once, asynchronously, and
//! reads as empty until then.

use std::sync::{Arc, OnceLock};

use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::source::{ByteSource, SampleId};
use crate::audio::wav::HEADER_LEN;
use crate::pcm::PcmBuffer;

/// Size of each read from a byte stream.
const CHUNK_SIZE: usize = 16 * 1024;

/// Errors raised while reading a sample.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Failed to read sample {id}: {source}")]
    Io {
        id: SampleId,
        #[source]
        source: std::io::Error,
    },
}

/// Holds the raw PCM payload of one sample.
/// Clones share the same underlying cell, so a clone can be moved into a
/// loading task while the owner keeps rendering.
#[derive(Clone, Debug)]
pub struct SampleStore {
    id: SampleId,
    buffer: Arc<OnceLock<PcmBuffer>>,
}

impl SampleStore {
    /// Creates an unloaded store for the given sample.
    pub fn new(id: SampleId) -> SampleStore {
        SampleStore {
            id,
            buffer: Arc::new(OnceLock::new()),
        }
    }

    /// The sample this store holds.
    pub fn id(&self) -> &SampleId {
        &self.id
    }

    /// Returns true once a load has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.buffer.get().is_some()
    }

    /// Returns the loaded payload, or an empty buffer if nothing is loaded yet.
    pub fn buffer(&self) -> PcmBuffer {
        self.buffer.get().cloned().unwrap_or_default()
    }

    /// Loads the sample from the byte source and strips the WAV header.
    ///
    /// The payload is stored on the first successful load and kept from then
    /// on. Failures are logged and leave the store empty; nothing is retried.
    pub async fn load(&self, source: &dyn ByteSource) -> PcmBuffer {
        if let Some(buffer) = self.buffer.get() {
            debug!(sample = %self.id, "Using loaded sample");
            return buffer.clone();
        }

        match read_payload(&self.id, source).await {
            Ok(payload) => {
                info!(
                    sample = %self.id,
                    bytes = payload.len(),
                    "Sample loaded"
                );
                self.buffer.get_or_init(|| payload).clone()
            }
            Err(e) => {
                warn!(sample = %self.id, error = %e, "Failed to load sample");
                self.buffer()
            }
        }
    }
}

/// Reads the whole resource in chunks and drops the fixed-size header.
async fn read_payload(id: &SampleId, source: &dyn ByteSource) -> Result<PcmBuffer, SampleError> {
    let io_error = |e| SampleError::Io {
        id: id.clone(),
        source: e,
    };

    let mut stream = source.open(id).await.map_err(io_error)?;
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = stream.read(&mut chunk).await.map_err(io_error)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
    }

    if bytes.len() < HEADER_LEN {
        warn!(sample = %id, bytes = bytes.len(), "Sample is shorter than its header");
        return Ok(PcmBuffer::empty());
    }
    Ok(PcmBuffer::from_bytes(bytes.split_off(HEADER_LEN)))
}
