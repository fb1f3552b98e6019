//! MemBuffer Module
//!
//! Ordered in-memory staging area for transactional writes.
//!
//! ## Responsibilities
//! - Insert-or-overwrite writes (`set`) and exact point reads (`get`)
//! - Forward cursors positioned by ceiling seek (`new_iterator`)
//! - Wholesale memory reclamation (`release`)
//!
//! ## Engines
//! Callers only see [`MemBuffer`] and [`BufferIterator`]. Two engines satisfy
//! the contract with identical observable behavior:
//! - [`TreeBuffer`]: `BTreeMap`, one heap allocation per entry
//! - [`ArenaBuffer`]: skip list laid out in flat arenas, bulk release
//!
//! ## Iterator Lifetime
//! An iterator borrows its buffer, so nothing can mutate or release the
//! buffer while a cursor is alive. Each cursor sees a frozen snapshot.
//!
//! ```compile_fail
//! use membuffer::new_tree_buffer;
//!
//! let mut buffer = new_tree_buffer();
//! buffer.set(b"a", b"1").unwrap();
//! let iter = buffer.new_iterator(None);
//! buffer.set(b"b", b"2").unwrap(); // cannot mutate while `iter` is alive
//! assert!(iter.valid());
//! ```
//!
//! ```compile_fail
//! use membuffer::new_arena_buffer;
//!
//! let mut buffer = new_arena_buffer();
//! buffer.set(b"a", b"1").unwrap();
//! let iter = buffer.new_iterator(None);
//! buffer.release(); // release invalidates every outstanding cursor
//! assert!(iter.valid());
//! ```

mod arena;
mod tree;

pub use arena::{ArenaBuffer, ArenaIterator};
pub use tree::{TreeBuffer, TreeIterator};

use crate::config::{BufferConfig, EngineKind};
use crate::error::{BufferError, Result};

/// Shared contract of every buffer engine
pub trait MemBuffer {
    /// Insert or overwrite `key -> value`.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Exact-match lookup. `BufferError::NotFound` when the key is absent.
    fn get(&self, key: &[u8]) -> Result<&[u8]>;

    /// Cursor at the smallest key `>= seek`.
    ///
    /// `None` or an empty seek key starts at the smallest key. The cursor is
    /// invalid when no such key exists.
    fn new_iterator<'a>(&'a self, seek: Option<&[u8]>) -> Box<dyn BufferIterator + 'a>;

    /// Drop every entry and free engine memory.
    ///
    /// The buffer is left empty and usable: later reads see nothing, later
    /// writes start from scratch.
    fn release(&mut self);

    /// Number of distinct keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live key + value bytes (overwritten values are not counted)
    fn size(&self) -> usize;

    /// Engine backing this buffer
    fn engine(&self) -> EngineKind;
}

/// Forward cursor over a buffer
///
/// ## States
/// - positioned: `valid()` is true, `key`/`value` return the entry
/// - exhausted: past the last key; accessors and `next` return
///   `BufferError::InvalidIterator` and the position does not change
/// - closed: after `close`; every access returns `BufferError::IteratorClosed`
pub trait BufferIterator {
    fn valid(&self) -> bool;

    fn key(&self) -> Result<&[u8]>;

    fn value(&self) -> Result<&[u8]>;

    /// Advance to the in-order successor.
    fn next(&mut self) -> Result<()>;

    /// Release the cursor. Idempotent.
    fn close(&mut self);
}

/// Cursor state shared by the engine iterators. `P` is the engine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cursor<P> {
    At(P),
    Exhausted,
    Closed,
}

impl<P: Copy> Cursor<P> {
    /// Current position, or the error matching the state.
    #[inline]
    pub(crate) fn position(&self) -> Result<P> {
        match self {
            Cursor::At(p) => Ok(*p),
            Cursor::Exhausted => Err(BufferError::InvalidIterator),
            Cursor::Closed => Err(BufferError::IteratorClosed),
        }
    }

    #[inline]
    pub(crate) fn is_positioned(&self) -> bool {
        matches!(self, Cursor::At(_))
    }
}

// =============================================================================
// Construction
// =============================================================================

/// Create a buffer backed by the tree engine
pub fn new_tree_buffer() -> Box<dyn MemBuffer> {
    Box::new(TreeBuffer::new())
}

/// Create a buffer backed by the arena engine
pub fn new_arena_buffer() -> Box<dyn MemBuffer> {
    Box::new(ArenaBuffer::new())
}

/// Create a buffer for the engine and limits in `config`
pub fn new_buffer(config: &BufferConfig) -> Box<dyn MemBuffer> {
    match config.engine {
        EngineKind::Tree => Box::new(TreeBuffer::with_config(config)),
        EngineKind::Arena => Box::new(ArenaBuffer::with_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_errors() {
        assert_eq!(Cursor::At(3u32).position(), Ok(3));
        assert_eq!(
            Cursor::<u32>::Exhausted.position(),
            Err(BufferError::InvalidIterator)
        );
        assert_eq!(
            Cursor::<u32>::Closed.position(),
            Err(BufferError::IteratorClosed)
        );
        assert!(!Cursor::<u32>::Closed.is_positioned());
    }

    #[test]
    fn test_new_buffer_selects_engine() {
        let tree = new_buffer(&BufferConfig::builder().engine(EngineKind::Tree).build().unwrap());
        let arena = new_buffer(&BufferConfig::default());

        assert_eq!(tree.engine(), EngineKind::Tree);
        assert_eq!(arena.engine(), EngineKind::Arena);
        assert_eq!(new_tree_buffer().engine(), EngineKind::Tree);
        assert_eq!(new_arena_buffer().engine(), EngineKind::Arena);
    }
}
