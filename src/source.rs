// Input sources: anything that can lend the parser a contiguous byte slice

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

/// A contiguous, read-only byte source that outlives every view the parser
/// hands out.
pub trait Source {
    fn as_bytes(&self) -> &[u8];
}

impl Source for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl Source for Box<[u8]> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl Source for String {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

impl Source for &[u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl Source for &str {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

impl Source for Cow<'_, [u8]> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

/// Read-only memory map of a file.
///
/// Zero-length files are not mapped and read as an empty slice.
#[derive(Debug)]
pub struct MmapSource {
    path: PathBuf,
    map: Option<Mmap>,
}

impl MmapSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source| Error::SourceOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_error)?;
        let len = file.metadata().map_err(open_error)?.len();

        let map = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only. Concurrent truncation of the file
            // by another process is outside what this type can guard against.
            let map = unsafe { Mmap::map(&file) }.map_err(|source| Error::Mapping {
                path: path.to_path_buf(),
                source,
            })?;
            Some(map)
        };

        debug!(path = %path.display(), len, "opened mapped source");
        Ok(MmapSource {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Source for MmapSource {
    fn as_bytes(&self) -> &[u8] {
        match &self.map {
            Some(map) => map,
            None => &[],
        }
    }
}
