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
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use super::error::ConfigError;
use super::notes::FrequencyTable;

const DEFAULT_TEMPO: u32 = 100;
const DEFAULT_STEPS: usize = 16;
const DEFAULT_STEPS_PER_BEAT: u32 = 4;
const DEFAULT_SAMPLES_PATH: &str = "./audio";
const DEFAULT_BASE_NOTE: &str = "c4";
const DEFAULT_DRUMS: [&str; 7] = [
    "kick",
    "hihat",
    "snare",
    "low_tom",
    "medium_tom",
    "high_tom",
    "crash",
];
const DEFAULT_INSTRUMENT: &str = "rocky_guitar";
const MAX_TEMPO: u32 = 1000;
const MAX_STEPS: usize = 1024;
const MAX_STEPS_PER_BEAT: u32 = 64;

/// A YAML representation of an instrument track.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Instrument {
    /// The instrument name, which is also its sample directory.
    name: String,

    /// The note the instrument's sample was recorded at.
    #[serde(default = "default_base_note")]
    base: String,
}

fn default_base_note() -> String {
    DEFAULT_BASE_NOTE.to_string()
}

impl Instrument {
    pub fn new(name: &str, base: &str) -> Instrument {
        Instrument {
            name: name.to_string(),
            base: base.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Steps to switch on when a track is created.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct PatternEntry {
    /// The track to switch steps on for.
    track: String,

    /// The note row, for instrument tracks.
    note: Option<String>,

    /// The step indices to switch on.
    steps: Vec<usize>,
}

impl PatternEntry {
    pub fn new(track: &str, note: Option<&str>, steps: &[usize]) -> PatternEntry {
        PatternEntry {
            track: track.to_string(),
            note: note.map(str::to_string),
            steps: steps.to_vec(),
        }
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }
}

/// The sequencer settings. Loaded once and passed to everything that needs it.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Beats per minute.
    #[serde(default = "default_tempo")]
    tempo: u32,

    /// Number of steps in every grid.
    #[serde(default = "default_steps")]
    steps: usize,

    /// Steps per beat, used to time the loop.
    #[serde(default = "default_steps_per_beat")]
    steps_per_beat: u32,

    /// Directory holding the sample files.
    #[serde(default = "default_samples_path")]
    samples: PathBuf,

    /// Drum track names.
    #[serde(default = "default_drums")]
    drums: Vec<String>,

    /// Instrument tracks.
    #[serde(default = "default_instruments")]
    instruments: Vec<Instrument>,

    /// The frequency table used to pitch instrument notes.
    #[serde(default)]
    notes: FrequencyTable,

    /// The initial pattern.
    #[serde(default)]
    pattern: Vec<PatternEntry>,
}

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}

fn default_steps() -> usize {
    DEFAULT_STEPS
}

fn default_steps_per_beat() -> u32 {
    DEFAULT_STEPS_PER_BEAT
}

fn default_samples_path() -> PathBuf {
    PathBuf::from(DEFAULT_SAMPLES_PATH)
}

fn default_drums() -> Vec<String> {
    DEFAULT_DRUMS.iter().map(|d| d.to_string()).collect()
}

fn default_instruments() -> Vec<Instrument> {
    vec![Instrument::new(DEFAULT_INSTRUMENT, DEFAULT_BASE_NOTE)]
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tempo: default_tempo(),
            steps: default_steps(),
            steps_per_beat: default_steps_per_beat(),
            samples: default_samples_path(),
            drums: default_drums(),
            instruments: default_instruments(),
            notes: FrequencyTable::default(),
            pattern: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML file.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that the types alone can't rule out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TEMPO).contains(&self.tempo) {
            return Err(ConfigError::Invalid(format!(
                "tempo must be between 1 and {MAX_TEMPO}"
            )));
        }
        if !(1..=MAX_STEPS).contains(&self.steps) {
            return Err(ConfigError::Invalid(format!(
                "steps must be between 1 and {MAX_STEPS}"
            )));
        }
        if !(1..=MAX_STEPS_PER_BEAT).contains(&self.steps_per_beat) {
            return Err(ConfigError::Invalid(format!(
                "steps_per_beat must be between 1 and {MAX_STEPS_PER_BEAT}"
            )));
        }
        if let Some(note) = self.notes.notes().iter().find(|n| n.frequency() == 0) {
            return Err(ConfigError::Invalid(format!(
                "note {} has no frequency",
                note.name()
            )));
        }
        for instrument in &self.instruments {
            if !self.notes.contains(instrument.base()) {
                return Err(ConfigError::Invalid(format!(
                    "instrument {} has base note {} which is not in the note table",
                    instrument.name(),
                    instrument.base()
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy with a different tempo.
    pub fn with_tempo(mut self, tempo: u32) -> Settings {
        self.tempo = tempo;
        self
    }

    /// Returns a copy with different tracks.
    pub fn with_tracks(mut self, drums: &[&str], instruments: Vec<Instrument>) -> Settings {
        self.drums = drums.iter().map(|d| d.to_string()).collect();
        self.instruments = instruments;
        self
    }

    /// Returns a copy with a different initial pattern.
    pub fn with_pattern(mut self, pattern: Vec<PatternEntry>) -> Settings {
        self.pattern = pattern;
        self
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn steps_per_beat(&self) -> u32 {
        self.steps_per_beat
    }

    /// The sample directory. Relative paths are resolved against `base` if
    /// given, which is usually the directory of the settings file.
    pub fn samples_path(&self, base: Option<&Path>) -> PathBuf {
        match base {
            Some(base) if self.samples.is_relative() => base.join(&self.samples),
            _ => self.samples.clone(),
        }
    }

    pub fn drums(&self) -> &[String] {
        &self.drums
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn notes(&self) -> &FrequencyTable {
        &self.notes
    }

    pub fn pattern(&self) -> &[PatternEntry] {
        &self.pattern
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs};

    use super::*;
    use crate::config::Note;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tempo(), 100);
        assert_eq!(settings.steps(), 16);
        assert_eq!(settings.steps_per_beat(), 4);
        assert_eq!(settings.drums().len(), 7);
        assert_eq!(settings.drums()[0], "kick");
        assert_eq!(
            settings.instruments(),
            &[Instrument::new("rocky_guitar", "c4")]
        );
        assert_eq!(settings.notes(), &FrequencyTable::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn parse_yaml() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sunrise.yaml");
        fs::write(
            &path,
            r#"
tempo: 120
steps: 8
samples: sounds
drums:
  - kick
  - snare
instruments:
  - name: bass
    base: a4
notes:
  - note: c4
    frequency: 26163
  - note: a4
    frequency: 44000
pattern:
  - track: kick
    steps: [0, 4]
  - track: bass
    note: c4
    steps: [2]
"#,
        )?;

        let settings = Settings::load(&path)?;
        assert_eq!(settings.tempo(), 120);
        assert_eq!(settings.steps(), 8);
        assert_eq!(settings.steps_per_beat(), 4);
        assert_eq!(settings.drums(), &["kick".to_string(), "snare".to_string()]);
        assert_eq!(settings.instruments(), &[Instrument::new("bass", "a4")]);
        assert_eq!(
            settings.notes(),
            &FrequencyTable::new(vec![Note::new("c4", 26163), Note::new("a4", 44000)])
        );
        assert_eq!(
            settings.pattern(),
            &[
                PatternEntry::new("kick", None, &[0, 4]),
                PatternEntry::new("bass", Some("c4"), &[2]),
            ]
        );
        assert_eq!(
            settings.samples_path(Some(dir.path())),
            dir.path().join("sounds")
        );
        Ok(())
    }

    #[test]
    fn missing_fields_use_defaults() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sunrise.yaml");
        fs::write(&path, "tempo: 90\n")?;

        let settings = Settings::load(&path)?;
        assert_eq!(settings, Settings::default().with_tempo(90));
        Ok(())
    }

    #[test]
    fn invalid_values() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sunrise.yaml");

        fs::write(&path, "tempo: 0\n")?;
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        for bad in [
            "tempo: 2646001\n",
            "steps: 5000000000\n",
            "steps_per_beat: 0\n",
            "steps_per_beat: 1000\n",
        ] {
            fs::write(&path, bad)?;
            assert!(
                matches!(Settings::load(&path), Err(ConfigError::Invalid(_))),
                "{bad} should be rejected"
            );
        }

        fs::write(&path, "instruments:\n  - name: organ\n    base: h9\n")?;
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            Settings::load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
        Ok(())
    }

    #[test]
    fn bundled_config_parses() -> Result<(), Box<dyn Error>> {
        let settings = Settings::load(Path::new("assets/sunrise.yaml"))?;
        assert_eq!(settings.tempo(), 100);
        assert!(!settings.pattern().is_empty());
        Ok(())
    }
}
