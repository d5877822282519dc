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

//! Pitch shifting by sample decimation.

use crate::pcm::{PcmBuffer, BYTES_PER_SAMPLE};

/// Shifts the pitch of a buffer by dropping samples.
///
/// `ratio` is the base frequency divided by the target frequency. Each 2-byte
/// unit at unit index `k` computes `n = trunc(k * (1 - ratio))`; whenever `n`
/// passes the last drop point the unit is dropped, otherwise it is copied.
/// Ratios below 1 shorten the buffer and raise the pitch. A ratio of 1 or more
/// never drops anything, so notes below the base come back unchanged.
pub fn shift(buffer: &PcmBuffer, ratio: f64) -> PcmBuffer {
    let bytes = buffer.as_bytes();
    let step = 1.0 - ratio;
    let mut out = Vec::with_capacity(bytes.len());
    let mut dropped_at: i64 = 0;

    for (unit, pair) in bytes.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
        let n = (unit as f64 * step).trunc() as i64;
        if n > dropped_at {
            dropped_at = n;
        } else {
            out.extend_from_slice(pair);
        }
    }

    PcmBuffer::from_bytes(out)
}
