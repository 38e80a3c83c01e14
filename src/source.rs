//! Shared, immutable byte storage behind [`crate::Token`].

use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::Result;

/// Bytes a token reads from: either an owned buffer or a memory-mapped file.
///
/// Cloning is cheap; every clone shares the same storage.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Heap bytes.
    Memory(Arc<[u8]>),
    /// A read-only mapping of a whole file.
    Mapped(Arc<Mmap>),
}

impl ByteSource {
    /// Maps the file at `path` read-only.
    pub fn map<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the mapping is read-only. Mutation of the file by another process
        // while it is mapped is outside what this crate can guard against.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        tracing::trace!(len = mmap.len(), "mapped token source");
        Ok(Self::Mapped(Arc::new(mmap)))
    }
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Memory(bytes) => &bytes[..],
            Self::Mapped(mmap) => &mmap[..],
        }
    }
}

impl From<Arc<[u8]>> for ByteSource {
    fn from(bytes: Arc<[u8]>) -> Self {
        Self::Memory(bytes)
    }
}
