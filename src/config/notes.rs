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
use serde::Deserialize;

/// Relative note frequencies for one octave starting at C4, in hundredths of a Hz.
const DEFAULT_NOTES: [(&str, u32); 12] = [
    ("c4", 26163),
    ("c_4", 27718),
    ("d4", 29366),
    ("d_4", 31113),
    ("e4", 32963),
    ("f4", 34923),
    ("f_4", 36999),
    ("g4", 39200),
    ("g_4", 41530),
    ("a4", 44000),
    ("a_4", 46616),
    ("b4", 49388),
];

/// A YAML representation of a single note in the frequency table.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Note {
    /// The note identifier, e.g. c_4 for C sharp.
    note: String,

    /// A value proportional to the note's frequency.
    frequency: u32,
}

impl Note {
    pub fn new(note: &str, frequency: u32) -> Note {
        Note {
            note: note.to_string(),
            frequency,
        }
    }

    pub fn name(&self) -> &str {
        &self.note
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }
}

/// An ordered mapping from note identifier to relative frequency.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct FrequencyTable {
    notes: Vec<Note>,
}

impl FrequencyTable {
    pub fn new(notes: Vec<Note>) -> FrequencyTable {
        FrequencyTable { notes }
    }

    /// Gets the frequency value of a note.
    pub fn get(&self, note: &str) -> Option<u32> {
        self.notes
            .iter()
            .find(|n| n.note == note)
            .map(|n| n.frequency)
    }

    pub fn contains(&self, note: &str) -> bool {
        self.get(note).is_some()
    }

    /// Returns `base / target`, the ratio used to shift a base sample to the
    /// target note.
    pub fn ratio(&self, base: &str, target: &str) -> Option<f64> {
        let base = self.get(base)?;
        let target = self.get(target)?;
        if target == 0 {
            return None;
        }
        Some(f64::from(base) / f64::from(target))
    }

    /// Note identifiers in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(|n| n.note.as_str())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        FrequencyTable::new(
            DEFAULT_NOTES
                .iter()
                .map(|(note, frequency)| Note::new(note, *frequency))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_table_order() {
        let table = FrequencyTable::default();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names.first(), Some(&"c4"));
        assert_eq!(names.last(), Some(&"b4"));
        assert_eq!(table.get("a4"), Some(44000));
        assert_eq!(table.get("h4"), None);
    }

    #[test]
    fn ratios() {
        let table = FrequencyTable::default();
        assert_eq!(table.ratio("c4", "c4"), Some(1.0));
        assert_eq!(table.ratio("c4", "a4"), Some(26163.0 / 44000.0));
        assert!(table.ratio("a4", "c4").is_some_and(|r| r > 1.0));
        assert_eq!(table.ratio("c4", "x"), None);

        let zero = FrequencyTable::new(vec![Note::new("c4", 100), Note::new("z", 0)]);
        assert_eq!(zero.ratio("c4", "z"), None);
    }
}
