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

//! Byte sources that resolve sample identifiers to readable streams.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::AsyncRead;

/// File stem used for drum samples.
const DRUM_FILE: &str = "01";

/// A readable stream of sample bytes.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Resolves to an opened byte stream.
pub type OpenFuture<'a> = Pin<Box<dyn Future<Output = io::Result<ByteStream>> + Send + 'a>>;

/// Identifies a sample resource by track name and file stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SampleId {
    name: String,
    file: String,
}

impl SampleId {
    /// The sample for a drum track.
    pub fn drum(name: &str) -> SampleId {
        SampleId {
            name: name.to_string(),
            file: DRUM_FILE.to_string(),
        }
    }

    /// The base note sample for an instrument track.
    pub fn instrument(name: &str, base: &str) -> SampleId {
        SampleId {
            name: name.to_string(),
            file: base.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The conventional path of the resource, relative to a sample root.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.name).join(format!("{}.wav", self.file))
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.wav", self.name, self.file)
    }
}

/// Resolves a sample identifier to a byte stream. The transport is up to the
/// implementation.
pub trait ByteSource: Send + Sync {
    fn open<'a>(&'a self, id: &'a SampleId) -> OpenFuture<'a>;
}

/// Reads samples from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsByteSource {
    root: PathBuf,
}

impl FsByteSource {
    pub fn new(root: &Path) -> FsByteSource {
        FsByteSource {
            root: root.to_path_buf(),
        }
    }
}

impl ByteSource for FsByteSource {
    fn open<'a>(&'a self, id: &'a SampleId) -> OpenFuture<'a> {
        Box::pin(async move {
            let file = tokio::fs::File::open(self.root.join(id.relative_path())).await?;
            Ok(Box::new(file) as ByteStream)
        })
    }
}

/// Serves samples from memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryByteSource {
    resources: HashMap<SampleId, Vec<u8>>,
}

impl MemoryByteSource {
    pub fn new() -> MemoryByteSource {
        MemoryByteSource::default()
    }

    /// Adds or replaces a resource.
    pub fn insert(&mut self, id: SampleId, bytes: Vec<u8>) {
        self.resources.insert(id, bytes);
    }
}

impl ByteSource for MemoryByteSource {
    fn open<'a>(&'a self, id: &'a SampleId) -> OpenFuture<'a> {
        Box::pin(async move {
            match self.resources.get(id) {
                Some(bytes) => Ok(Box::new(io::Cursor::new(bytes.clone())) as ByteStream),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no resource for {}", id),
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[test]
    fn conventional_paths() {
        assert_eq!(
            SampleId::drum("kick").relative_path(),
            Path::new("kick").join("01.wav")
        );
        assert_eq!(
            SampleId::instrument("rocky_guitar", "c4").relative_path(),
            Path::new("rocky_guitar").join("c4.wav")
        );
        assert_eq!(SampleId::drum("snare").to_string(), "snare/01.wav");
    }

    #[tokio::test]
    async fn fs_source_reads_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("kick"))?;
        std::fs::write(dir.path().join("kick").join("01.wav"), [1u8, 2, 3])?;

        let source = FsByteSource::new(dir.path());
        let mut stream = source.open(&SampleId::drum("kick")).await?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).await?;
        assert_eq!(bytes, vec![1, 2, 3]);

        let missing = source.open(&SampleId::drum("hihat")).await;
        assert_eq!(
            missing.err().map(|e| e.kind()),
            Some(io::ErrorKind::NotFound)
        );
        Ok(())
    }

    #[tokio::test]
    async fn memory_source_serves_copies() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = MemoryByteSource::new();
        source.insert(SampleId::drum("kick"), vec![9, 8]);

        let mut bytes = Vec::new();
        source
            .open(&SampleId::drum("kick"))
            .await?
            .read_to_end(&mut bytes)
            .await?;
        assert_eq!(bytes, vec![9, 8]);
        assert!(source.open(&SampleId::drum("crash")).await.is_err());
        Ok(())
    }
}
