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

//! Raw 16-bit little-endian PCM buffers.

use std::fmt;
use std::sync::Arc;

/// Number of bytes in one PCM sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// An immutable buffer of raw PCM bytes. Pairs of bytes form signed 16-bit
/// little-endian samples, so the length is always even.
/// The data is stored in an Arc so that tracks, plans and the scheduler can
/// share it without copying.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    data: Arc<[u8]>,
}

impl PcmBuffer {
    /// Creates an empty buffer.
    pub fn empty() -> PcmBuffer {
        PcmBuffer::default()
    }

    /// Creates a buffer from raw bytes. A trailing odd byte can't form a sample
    /// and is dropped.
    pub fn from_bytes(mut bytes: Vec<u8>) -> PcmBuffer {
        if bytes.len() % BYTES_PER_SAMPLE != 0 {
            bytes.pop();
        }
        PcmBuffer { data: bytes.into() }
    }

    /// Creates a buffer from signed samples.
    pub fn from_samples(samples: &[i16]) -> PcmBuffer {
        let mut bytes = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        PcmBuffer { data: bytes.into() }
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over the decoded signed samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }
}

impl fmt::Debug for PcmBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcmBuffer")
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let buffer = PcmBuffer::from_bytes(vec![1, 2, 3]);
        assert_eq!(buffer.as_bytes(), &[1, 2]);
    }

    #[test]
    fn samples_are_little_endian_signed() {
        let buffer = PcmBuffer::from_bytes(vec![0x01, 0x00, 0xff, 0xff, 0x00, 0x80]);
        let samples: Vec<i16> = buffer.samples().collect();
        assert_eq!(samples, vec![1, -1, i16::MIN]);
        assert_eq!(PcmBuffer::from_samples(&samples), buffer);
    }

    #[test]
    fn clones_share_data() {
        let buffer = PcmBuffer::from_samples(&[1, 2, 3]);
        let clone = buffer.clone();
        assert!(Arc::ptr_eq(&buffer.data, &clone.data));
    }
}
