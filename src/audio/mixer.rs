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
// Core mixing logic shared by track rendering and the scheduler
use crate::pcm::{PcmBuffer, BYTES_PER_SAMPLE};

/// A single mix plan entry: a borrowed buffer placed at a byte offset.
#[derive(Clone, Copy, Debug)]
pub struct MixEntry<'a> {
    pub buffer: &'a PcmBuffer,
    pub offset: usize,
}

/// An ordered list of buffers and the byte offsets they start at. Plans borrow
/// their buffers, so they can't outlive the render that built them.
#[derive(Debug, Default)]
pub struct MixPlan<'a> {
    entries: Vec<MixEntry<'a>>,
}

impl<'a> MixPlan<'a> {
    /// Creates an empty plan.
    pub fn new() -> MixPlan<'a> {
        MixPlan {
            entries: Vec::new(),
        }
    }

    /// Adds a buffer at the given byte offset. Odd offsets are aligned down to
    /// a whole sample.
    pub fn push(&mut self, buffer: &'a PcmBuffer, offset: usize) {
        self.entries.push(MixEntry {
            buffer,
            offset: offset - offset % BYTES_PER_SAMPLE,
        });
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &[MixEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a PcmBuffer> for MixPlan<'a> {
    /// Collects buffers that all start at offset zero.
    fn from_iter<I: IntoIterator<Item = &'a PcmBuffer>>(iter: I) -> Self {
        let mut plan = MixPlan::new();
        for buffer in iter {
            plan.push(buffer, 0);
        }
        plan
    }
}

/// Mixes every entry of the plan into a single buffer.
///
/// Empty buffers are ignored. The output is as long as the furthest reaching
/// entry. Samples are summed as signed 16-bit values and the sum is clamped
/// once, so the order of entries only matters where the mix saturates.
/// Positions not covered by an entry contribute silence.
pub fn mix(plan: &MixPlan<'_>) -> PcmBuffer {
    let entries: Vec<&MixEntry<'_>> = plan
        .entries
        .iter()
        .filter(|entry| !entry.buffer.is_empty())
        .collect();

    let length = entries
        .iter()
        .map(|entry| entry.buffer.len() + entry.offset)
        .max()
        .unwrap_or(0);
    let length = length - length % BYTES_PER_SAMPLE;
    if length == 0 {
        return PcmBuffer::empty();
    }

    let mut sums = vec![0i32; length / BYTES_PER_SAMPLE];
    for entry in entries {
        let start = entry.offset / BYTES_PER_SAMPLE;
        for (slot, sample) in sums[start..].iter_mut().zip(entry.buffer.samples()) {
            *slot += i32::from(sample);
        }
    }

    let mut out = Vec::with_capacity(length);
    for sum in sums {
        out.extend_from_slice(&normalize(sum).to_le_bytes());
    }
    PcmBuffer::from_bytes(out)
}

/// Clamps a summed value into the signed 16-bit range.
#[inline]
fn normalize(sum: i32) -> i16 {
    sum.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
