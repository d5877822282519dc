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
use crate::track::TrackError;

/// Default number of steps in a sequence.
pub const DEFAULT_LENGTH: usize = 16;

/// A fixed-length row of on/off steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSequence {
    steps: Vec<bool>,
}

impl StepSequence {
    /// Creates a sequence with every step off.
    pub fn new(length: usize) -> StepSequence {
        StepSequence {
            steps: vec![false; length],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Flips a step and returns its new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, TrackError> {
        let length = self.steps.len();
        let step = self
            .steps
            .get_mut(index)
            .ok_or(TrackError::StepOutOfRange { index, length })?;
        *step = !*step;
        Ok(*step)
    }

    pub fn is_on(&self, index: usize) -> Result<bool, TrackError> {
        self.steps
            .get(index)
            .copied()
            .ok_or(TrackError::StepOutOfRange {
                index,
                length: self.steps.len(),
            })
    }

    /// Indices of the steps that are on, in order.
    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
    }

    /// Returns true if any step is on.
    pub fn any(&self) -> bool {
        self.steps.iter().any(|on| *on)
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        StepSequence::new(DEFAULT_LENGTH)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn toggle() {
        let mut sequence = StepSequence::default();
        assert_eq!(sequence.len(), 16);
        assert!(!sequence.any());

        assert_eq!(sequence.toggle(3), Ok(true));
        assert_eq!(sequence.is_on(3), Ok(true));
        assert_eq!(sequence.toggle(15), Ok(true));
        assert_eq!(sequence.active().collect::<Vec<_>>(), vec![3, 15]);

        assert_eq!(sequence.toggle(3), Ok(false));
        assert_eq!(sequence.is_on(3), Ok(false));
        assert_eq!(sequence.active().collect::<Vec<_>>(), vec![15]);
        assert_eq!(sequence.len(), 16);
    }

    #[test]
    fn out_of_range() {
        let mut sequence = StepSequence::new(4);
        assert_eq!(
            sequence.toggle(4),
            Err(TrackError::StepOutOfRange {
                index: 4,
                length: 4
            })
        );
        assert!(sequence.is_on(100).is_err());
        assert!(!sequence.any());
    }
}
