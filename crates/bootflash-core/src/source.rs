//! Firmware byte sources
//!
//! Raw firmware bytes arrive from outside the engine - removable media, or a
//! staging area in memory. The [`ByteSource`] trait is the seam: a source
//! either delivers exactly the bytes it reports, or fails. Loaded buffers
//! are then fed to package validation and image validation.

use alloc::vec::Vec;

use crate::error::Result;

/// A producer of firmware bytes.
///
/// Implementations must return exactly as many bytes as the underlying
/// source reports, or fail with [`Error::Aborted`](crate::Error::Aborted) -
/// a short read must never surface as a truncated buffer.
pub trait ByteSource {
    /// Load the complete contents of the source
    fn load(&mut self) -> Result<Vec<u8>>;
}

/// Byte source backed by a memory range.
///
/// Used when the firmware bytes are already staged in memory; `load` hands
/// out an owned copy so the caller can outlive the staging area.
#[derive(Debug, Clone)]
pub struct MemorySource<'a> {
    data: &'a [u8],
}

impl<'a> MemorySource<'a> {
    /// Create a source over a staged byte range
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Size of the staged range in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the staged range is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ByteSource for MemorySource<'_> {
    fn load(&mut self) -> Result<Vec<u8>> {
        log::debug!("loaded {} bytes from memory", self.data.len());
        Ok(self.data.to_vec())
    }
}

#[cfg(feature = "std")]
mod file {
    use super::ByteSource;
    use crate::error::{Error, Result};
    use alloc::vec::Vec;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Byte source backed by a file on removable media
    #[derive(Debug, Clone)]
    pub struct FileSource {
        path: PathBuf,
    }

    impl FileSource {
        /// Create a source for the given path
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// The path this source reads from
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ByteSource for FileSource {
        fn load(&mut self) -> Result<Vec<u8>> {
            let expected = fs::metadata(&self.path).map_err(map_io_error)?.len();
            let data = fs::read(&self.path).map_err(map_io_error)?;

            if data.len() as u64 != expected {
                log::error!(
                    "partial read of {}: expected {} bytes, got {}",
                    self.path.display(),
                    expected,
                    data.len()
                );
                return Err(Error::Aborted);
            }

            log::info!(
                "loaded firmware file {} ({} bytes)",
                self.path.display(),
                data.len()
            );
            Ok(data)
        }
    }

    fn map_io_error(e: io::Error) -> Error {
        match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound,
            io::ErrorKind::OutOfMemory => Error::OutOfResources,
            _ => Error::DeviceError,
        }
    }
}

#[cfg(feature = "std")]
pub use file::FileSource;
