//! Tree engine
//!
//! BTreeMap-based buffer. One allocation per key and per value; good
//! worst-case latency when keys arrive in random order.

use std::collections::btree_map::Range;
use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::debug;

use crate::config::{check_size_limit, BufferConfig, EngineKind};
use crate::error::{BufferError, Result};
use crate::key;

use super::{BufferIterator, Cursor, MemBuffer};

/// Buffer backed by a balanced search tree
#[derive(Debug)]
pub struct TreeBuffer {
    map: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Sum of key and value lengths of live entries
    live_bytes: usize,

    size_limit: Option<usize>,
}

impl TreeBuffer {
    /// Create an empty tree buffer with no size limit
    pub fn new() -> Self {
        Self::with_config(&BufferConfig::default())
    }

    /// Create an empty tree buffer honoring the limits in `config`
    pub fn with_config(config: &BufferConfig) -> Self {
        debug!(size_limit = ?config.size_limit, "Creating tree buffer");
        Self {
            map: BTreeMap::new(),
            live_bytes: 0,
            size_limit: config.size_limit,
        }
    }
}

impl Default for TreeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemBuffer for TreeBuffer {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        // Overwrite in place so the key allocation is kept
        if let Some(existing) = self.map.get_mut(key) {
            let requested = self.live_bytes - existing.len() + value.len();
            check_size_limit(self.size_limit, requested)?;
            existing.clear();
            existing.extend_from_slice(value);
            self.live_bytes = requested;
            return Ok(());
        }

        let requested = self.live_bytes + key.len() + value.len();
        check_size_limit(self.size_limit, requested)?;
        self.map.insert(key.to_vec(), value.to_vec());
        self.live_bytes = requested;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<&[u8]> {
        self.map
            .get(key)
            .map(Vec::as_slice)
            .ok_or(BufferError::NotFound)
    }

    fn new_iterator<'a>(&'a self, seek: Option<&[u8]>) -> Box<dyn BufferIterator + 'a> {
        Box::new(TreeIterator::new(self, seek))
    }

    fn release(&mut self) {
        let map = std::mem::take(&mut self.map);
        debug!(
            entries = map.len(),
            bytes = self.live_bytes,
            "Releasing tree buffer"
        );
        self.live_bytes = 0;
        drop(map);
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn size(&self) -> usize {
        self.live_bytes
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Tree
    }
}

/// Cursor over a [`TreeBuffer`]
///
/// Wraps an in-order `BTreeMap` range that starts at the ceiling of the seek
/// key. Closing drops the range.
pub struct TreeIterator<'a> {
    range: Option<Range<'a, Vec<u8>, Vec<u8>>>,
    cursor: Cursor<(&'a [u8], &'a [u8])>,
}

impl<'a> TreeIterator<'a> {
    pub fn new(buffer: &'a TreeBuffer, seek: Option<&[u8]>) -> Self {
        let mut range = match key::normalize_seek(seek) {
            Some(seek) => buffer
                .map
                .range::<[u8], _>((Bound::Included(seek), Bound::Unbounded)),
            None => buffer.map.range::<[u8], _>(..),
        };
        let cursor = Self::step(&mut range);
        Self {
            range: Some(range),
            cursor,
        }
    }

    fn step(range: &mut Range<'a, Vec<u8>, Vec<u8>>) -> Cursor<(&'a [u8], &'a [u8])> {
        match range.next() {
            Some((k, v)) => Cursor::At((k.as_slice(), v.as_slice())),
            None => Cursor::Exhausted,
        }
    }
}

impl BufferIterator for TreeIterator<'_> {
    fn valid(&self) -> bool {
        self.cursor.is_positioned()
    }

    fn key(&self) -> Result<&[u8]> {
        self.cursor.position().map(|(k, _)| k)
    }

    fn value(&self) -> Result<&[u8]> {
        self.cursor.position().map(|(_, v)| v)
    }

    fn next(&mut self) -> Result<()> {
        self.cursor.position()?;
        self.cursor = match self.range.as_mut() {
            Some(range) => Self::step(range),
            None => Cursor::Closed,
        };
        Ok(())
    }

    fn close(&mut self) {
        self.range = None;
        self.cursor = Cursor::Closed;
    }
}
