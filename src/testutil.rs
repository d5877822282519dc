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

use std::{error::Error, fs::File, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::wav;
use crate::pcm::PcmBuffer;
use crate::samples::{MemoryByteSource, SampleStore};

/// Writes interleaved stereo 16-bit samples to a wav file.
pub fn write_wav(path: PathBuf, samples: &[i16]) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels: wav::CHANNELS,
            sample_rate: wav::SAMPLE_RATE,
            bits_per_sample: wav::BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        },
    )?;

    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Returns the bytes of a wav resource holding the given payload.
pub fn wav_bytes(payload: &PcmBuffer) -> Vec<u8> {
    wav::wrap(payload)
}

/// A sample of the given length in bytes, filled with a recognisable ramp.
pub fn ramp_sample(bytes: usize) -> PcmBuffer {
    let samples: Vec<i16> = (0..bytes / 2).map(|i| (i % 2000) as i16 - 1000).collect();
    PcmBuffer::from_samples(&samples)
}

/// Loads a store with the given payload through an in-memory byte source.
pub async fn load_store(store: &SampleStore, payload: &PcmBuffer) -> PcmBuffer {
    let mut source = MemoryByteSource::new();
    source.insert(store.id().clone(), wav_bytes(payload));
    store.load(&source).await
}
