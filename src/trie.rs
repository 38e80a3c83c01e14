//! Immutable byte-key lookup used by named-object decoding.
//!
//! A [`KeyTrie`] maps the raw UTF-8 bytes of member keys to member indices, so a key
//! read from the wire can be matched without first materializing a `String`.
//!
//! Small key sets (the common case for structs) are spread over a fixed table of
//! buckets selected by a cheap hash of the key length and its first and last bytes;
//! a lookup touches one bucket and allocates nothing. Larger key sets switch to an
//! exact hash map keyed by the key bytes.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use twox_hash::XxHash64;

use crate::constants::KEY_TRIE_BUCKET_LIMIT;
use crate::error::{Result, TagwireError};

const BUCKET_COUNT: usize = 16;

#[derive(Debug)]
enum Layout {
    Buckets(Box<[Vec<(Box<[u8]>, usize)>]>),
    Map(HashMap<Box<[u8]>, usize, BuildHasherDefault<XxHash64>>),
}

/// Build-once map from key bytes to an index.
#[derive(Debug)]
pub struct KeyTrie {
    layout: Layout,
    len: usize,
}

#[inline]
fn bucket_of(key: &[u8]) -> usize {
    let first = key.first().copied().unwrap_or(0) as usize;
    let last = key.last().copied().unwrap_or(0) as usize;
    (key.len() ^ (first << 2) ^ (last << 1)) % BUCKET_COUNT
}

impl KeyTrie {
    /// Builds a trie where `keys[i]` maps to `i`.
    ///
    /// `type_name` is only used to label errors.
    ///
    /// # Errors
    /// [`TagwireError::DuplicateKey`] if a key appears twice.
    pub fn build<K: AsRef<[u8]>>(type_name: &'static str, keys: &[K]) -> Result<Self> {
        let duplicate = |key: &[u8]| TagwireError::DuplicateKey {
            type_name,
            key: String::from_utf8_lossy(key).into_owned(),
        };

        let layout = if keys.len() <= KEY_TRIE_BUCKET_LIMIT {
            let mut buckets: Vec<Vec<(Box<[u8]>, usize)>> = vec![Vec::new(); BUCKET_COUNT];
            for (index, key) in keys.iter().enumerate() {
                let key = key.as_ref();
                let bucket = &mut buckets[bucket_of(key)];
                if bucket.iter().any(|(k, _)| k.as_ref() == key) {
                    return Err(duplicate(key));
                }
                bucket.push((key.into(), index));
            }
            Layout::Buckets(buckets.into_boxed_slice())
        } else {
            let mut map = HashMap::with_capacity_and_hasher(keys.len(), Default::default());
            for (index, key) in keys.iter().enumerate() {
                let key = key.as_ref();
                if map.insert(Box::<[u8]>::from(key), index).is_some() {
                    return Err(duplicate(key));
                }
            }
            Layout::Map(map)
        };

        Ok(Self {
            layout,
            len: keys.len(),
        })
    }

    /// Looks up `key`.
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        match &self.layout {
            Layout::Buckets(buckets) => buckets[bucket_of(key)]
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, index)| *index),
            Layout::Map(map) => map.get(key).copied(),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if lookups go through the exact hash map.
    pub fn is_hashed(&self) -> bool {
        matches!(self.layout, Layout::Map(_))
    }
}
