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

//! WAV container encoding for raw PCM payloads.

use crate::pcm::PcmBuffer;

/// Length of the fixed WAV header.
pub const HEADER_LEN: usize = 44;
/// Sample rate declared in the header.
pub const SAMPLE_RATE: u32 = 44100;
/// Channel count declared in the header.
pub const CHANNELS: u16 = 2;
/// Bit depth declared in the header.
pub const BITS_PER_SAMPLE: u16 = 16;
/// Bytes per frame across all channels.
pub const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);
/// Bytes per second of audio.
pub const BYTE_RATE: u32 = SAMPLE_RATE * BLOCK_ALIGN as u32;

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Wraps a PCM payload in a 44-byte RIFF/WAVE header.
pub fn wrap(payload: &PcmBuffer) -> Vec<u8> {
    let data_size = payload.len() as u32;
    let riff_size = data_size + (HEADER_LEN as u32 - 8);

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&riff_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    buf.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&BYTE_RATE.to_le_bytes());
    buf.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    buf.extend_from_slice(payload.as_bytes());

    buf
}
