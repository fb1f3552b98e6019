//! Arena engine
//!
//! Skip list whose nodes live in flat arenas instead of individual heap
//! allocations.
//!
//! ## Layout
//! ```text
//! data:  ┌─────┬───────┬─────┬───────┬─────┐
//!        │ key │ value │ key │ value │ ... │   append-only bytes
//!        └─────┴───────┴─────┴───────┴─────┘
//!
//! nodes: ┌────────────┬─────────┬──────────────┬───────────┬────────┬────────────────┐
//!        │ key_offset │ key_len │ value_offset │ value_len │ height │ next[0..height]│
//!        └────────────┴─────────┴──────────────┴───────────┴────────┴────────────────┘
//! ```
//! Every field is a `u32`. A node is identified by the index of its first
//! word in `nodes`. The head node sits at index 0 with a full tower, and since
//! nothing ever links back to the head, 0 also serves as the nil link.
//!
//! Release swaps both arenas for fresh ones, so all nodes are freed in one go.

use std::cmp::Ordering;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, trace, warn};

use crate::config::{check_size_limit, BufferConfig, EngineKind, MAX_ARENA_CAPACITY};
use crate::error::{BufferError, Result};
use crate::key;

use super::{BufferIterator, Cursor, MemBuffer};

/// Tallest tower a node can have
pub const MAX_HEIGHT: usize = 12;

/// One in `BRANCHING` nodes is promoted to the next level
const BRANCHING: u32 = 4;

const HEAD: u32 = 0;
const NIL: u32 = 0;

// Node record fields
const NODE_KEY_OFFSET: usize = 0;
const NODE_KEY_LEN: usize = 1;
const NODE_VALUE_OFFSET: usize = 2;
const NODE_VALUE_LEN: usize = 3;
const NODE_HEIGHT: usize = 4;
const NODE_NEXT: usize = 5;

/// Buffer backed by an arena-allocated skip list
pub struct ArenaBuffer {
    /// Key and value bytes
    data: Vec<u8>,

    /// Node records, see module docs
    nodes: Vec<u32>,

    /// Tallest tower currently in use (1..=MAX_HEIGHT)
    height: usize,

    entries: usize,

    /// Sum of key and value lengths of live entries
    live_bytes: usize,

    size_limit: Option<usize>,

    rng: SmallRng,
}

impl ArenaBuffer {
    /// Create an empty arena buffer with default settings
    pub fn new() -> Self {
        Self::with_config(&BufferConfig::default())
    }

    /// Create an empty arena buffer. `config.engine` is ignored.
    pub fn with_config(config: &BufferConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        debug!(
            arena_capacity = config.arena_capacity,
            size_limit = ?config.size_limit,
            "Creating arena buffer"
        );
        Self {
            data: Self::reserve_data(config.arena_capacity),
            nodes: Self::head_only(),
            height: 1,
            entries: 0,
            live_bytes: 0,
            size_limit: config.size_limit,
            rng,
        }
    }

    /// Bytes consumed in both arenas, including values shadowed by overwrites
    pub fn arena_bytes(&self) -> usize {
        self.data.len() + self.nodes.len() * std::mem::size_of::<u32>()
    }

    /// Tallest tower currently in use
    pub fn height(&self) -> usize {
        self.height
    }

    /// Initial data arena. A reservation that is too large or cannot be
    /// satisfied falls back to an empty arena that grows on demand.
    fn reserve_data(capacity: usize) -> Vec<u8> {
        let mut data = Vec::new();
        if capacity > MAX_ARENA_CAPACITY {
            warn!(
                capacity,
                max = MAX_ARENA_CAPACITY,
                "Arena capacity past offset range, starting empty"
            );
        } else if let Err(err) = data.try_reserve(capacity) {
            warn!(capacity, %err, "Arena reservation failed, starting empty");
        }
        data
    }

    fn head_only() -> Vec<u32> {
        let mut nodes = Vec::with_capacity(NODE_NEXT + MAX_HEIGHT);
        nodes.extend_from_slice(&[0, 0, 0, 0, MAX_HEIGHT as u32]);
        nodes.resize(NODE_NEXT + MAX_HEIGHT, NIL);
        nodes
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    #[inline]
    fn field(&self, node: u32, field: usize) -> usize {
        self.nodes[node as usize + field] as usize
    }

    #[inline]
    fn next_of(&self, node: u32, level: usize) -> u32 {
        self.nodes[node as usize + NODE_NEXT + level]
    }

    #[inline]
    fn set_next(&mut self, node: u32, level: usize, next: u32) {
        self.nodes[node as usize + NODE_NEXT + level] = next;
    }

    #[inline]
    fn key_of(&self, node: u32) -> &[u8] {
        let offset = self.field(node, NODE_KEY_OFFSET);
        &self.data[offset..offset + self.field(node, NODE_KEY_LEN)]
    }

    #[inline]
    fn value_of(&self, node: u32) -> &[u8] {
        let offset = self.field(node, NODE_VALUE_OFFSET);
        &self.data[offset..offset + self.field(node, NODE_VALUE_LEN)]
    }

    /// First node whose key is `>= key`, and whether it matches exactly.
    ///
    /// When `prev` is given it receives, per level below the current height,
    /// the last node whose key is `< key`. On an exact match the search stops
    /// early and `prev` is left partially filled.
    fn find_greater_or_equal(
        &self,
        key: &[u8],
        mut prev: Option<&mut [u32; MAX_HEIGHT]>,
    ) -> (u32, bool) {
        let mut node = HEAD;
        let mut level = self.height - 1;
        loop {
            let next = self.next_of(node, level);
            let order = if next == NIL {
                Ordering::Greater
            } else {
                key::compare(self.key_of(next), key)
            };

            if order == Ordering::Less {
                node = next;
                continue;
            }
            if let Some(prev) = prev.as_deref_mut() {
                prev[level] = node;
            }
            if order == Ordering::Equal {
                return (next, true);
            }
            if level == 0 {
                return (next, false);
            }
            level -= 1;
        }
    }

    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_HEIGHT && self.rng.random_ratio(1, BRANCHING) {
            height += 1;
        }
        height
    }

    // =========================================================================
    // Arena Allocation
    // =========================================================================

    fn append_data(&mut self, bytes: &[u8]) -> Result<u32> {
        let offset = to_offset(self.data.len())?;
        to_offset(self.data.len() + bytes.len())?;
        if self.data.len() + bytes.len() > self.data.capacity() {
            trace!(
                used = self.data.len(),
                capacity = self.data.capacity(),
                incoming = bytes.len(),
                "Growing data arena"
            );
        }
        self.data.extend_from_slice(bytes);
        Ok(offset)
    }

    fn append_node(&mut self, key: &[u8], value: &[u8], height: usize) -> Result<u32> {
        let node = to_offset(self.nodes.len())?;
        to_offset(self.nodes.len() + NODE_NEXT + height)?;

        let key_offset = self.append_data(key)?;
        let value_offset = self.append_data(value)?;
        let record = [
            key_offset,
            to_offset(key.len())?,
            value_offset,
            to_offset(value.len())?,
            to_offset(height)?,
        ];

        self.nodes.extend_from_slice(&record);
        self.nodes.resize(self.nodes.len() + height, NIL);
        debug_assert_eq!(self.field(node, NODE_HEIGHT), height);
        Ok(node)
    }

    /// Replace a node's value, reusing its slot when the new value fits.
    fn overwrite_value(&mut self, node: u32, value: &[u8]) -> Result<()> {
        let base = node as usize;
        let old_len = self.field(node, NODE_VALUE_LEN);
        if value.len() <= old_len {
            let offset = self.field(node, NODE_VALUE_OFFSET);
            self.data[offset..offset + value.len()].copy_from_slice(value);
        } else {
            self.nodes[base + NODE_VALUE_OFFSET] = self.append_data(value)?;
        }
        self.nodes[base + NODE_VALUE_LEN] = to_offset(value.len())?;
        Ok(())
    }
}

impl Default for ArenaBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArenaBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaBuffer")
            .field("entries", &self.entries)
            .field("live_bytes", &self.live_bytes)
            .field("arena_bytes", &self.arena_bytes())
            .field("height", &self.height)
            .finish()
    }
}

impl MemBuffer for ArenaBuffer {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut prev = [HEAD; MAX_HEIGHT];
        let (found, exact) = self.find_greater_or_equal(key, Some(&mut prev));

        if exact {
            let old_len = self.field(found, NODE_VALUE_LEN);
            let requested = self.live_bytes - old_len + value.len();
            check_size_limit(self.size_limit, requested)?;
            self.overwrite_value(found, value)?;
            self.live_bytes = requested;
            return Ok(());
        }

        let requested = self.live_bytes + key.len() + value.len();
        check_size_limit(self.size_limit, requested)?;

        // Levels above the current height keep HEAD as predecessor
        let height = self.random_height();
        let node = self.append_node(key, value, height)?;
        for (level, &before) in prev.iter().enumerate().take(height) {
            let after = self.next_of(before, level);
            self.set_next(node, level, after);
            self.set_next(before, level, node);
        }
        self.height = self.height.max(height);

        self.entries += 1;
        self.live_bytes = requested;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<&[u8]> {
        match self.find_greater_or_equal(key, None) {
            (node, true) => Ok(self.value_of(node)),
            _ => Err(BufferError::NotFound),
        }
    }

    fn new_iterator<'a>(&'a self, seek: Option<&[u8]>) -> Box<dyn BufferIterator + 'a> {
        Box::new(ArenaIterator::new(self, seek))
    }

    fn release(&mut self) {
        debug!(
            entries = self.entries,
            bytes = self.live_bytes,
            arena_bytes = self.arena_bytes(),
            "Releasing arena buffer"
        );
        self.data = Vec::new();
        self.nodes = Self::head_only();
        self.height = 1;
        self.entries = 0;
        self.live_bytes = 0;
    }

    fn len(&self) -> usize {
        self.entries
    }

    fn size(&self) -> usize {
        self.live_bytes
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Arena
    }
}

fn to_offset(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| {
        error!(offset = n, "Arena offset space exhausted");
        BufferError::EngineFailure(format!("arena offset {} exceeds u32 range", n))
    })
}

/// Cursor over an [`ArenaBuffer`]: a borrowed buffer plus a node index
pub struct ArenaIterator<'a> {
    buffer: &'a ArenaBuffer,
    cursor: Cursor<u32>,
}

impl<'a> ArenaIterator<'a> {
    pub fn new(buffer: &'a ArenaBuffer, seek: Option<&[u8]>) -> Self {
        let first = match key::normalize_seek(seek) {
            Some(seek) => buffer.find_greater_or_equal(seek, None).0,
            None => buffer.next_of(HEAD, 0),
        };
        Self {
            buffer,
            cursor: Self::at(first),
        }
    }

    #[inline]
    fn at(node: u32) -> Cursor<u32> {
        if node == NIL {
            Cursor::Exhausted
        } else {
            Cursor::At(node)
        }
    }
}

impl BufferIterator for ArenaIterator<'_> {
    fn valid(&self) -> bool {
        self.cursor.is_positioned()
    }

    fn key(&self) -> Result<&[u8]> {
        let buffer = self.buffer;
        self.cursor.position().map(|node| buffer.key_of(node))
    }

    fn value(&self) -> Result<&[u8]> {
        let buffer = self.buffer;
        self.cursor.position().map(|node| buffer.value_of(node))
    }

    fn next(&mut self) -> Result<()> {
        let node = self.cursor.position()?;
        self.cursor = Self::at(self.buffer.next_of(node, 0));
        Ok(())
    }

    fn close(&mut self) {
        self.cursor = Cursor::Closed;
    }
}
