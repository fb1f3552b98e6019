//! # membuffer
//!
//! Ordered in-memory staging buffer for transactional key-value writes:
//! - Insert-or-overwrite writes and exact point reads
//! - Forward iteration in byte-wise key order with ceiling seek
//! - Two interchangeable engines behind one trait
//! - Wholesale release of staged memory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Transaction / Commit Layer                  │
//! │                        (external)                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  set / get / new_iterator / release
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              MemBuffer + BufferIterator traits               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ TreeBuffer  │          │ ArenaBuffer │
//!   │ (BTreeMap)  │          │ (skip list) │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │ Key Ordering │
//!               │  (byte-wise) │
//!               └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use membuffer::{new_arena_buffer, BufferError};
//!
//! let mut buffer = new_arena_buffer();
//! buffer.set(b"b", b"2").unwrap();
//! buffer.set(b"d", b"4").unwrap();
//!
//! assert_eq!(buffer.get(b"b").unwrap(), b"2");
//! assert_eq!(buffer.get(b"c"), Err(BufferError::NotFound));
//!
//! // Ceiling seek: "c" is absent, the cursor lands on "d"
//! let mut iter = buffer.new_iterator(Some(b"c".as_slice()));
//! assert_eq!(iter.key().unwrap(), b"d");
//! iter.next().unwrap();
//! assert!(!iter.valid());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod buffer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BufferError, Result};
pub use config::{BufferConfig, EngineKind};
pub use buffer::{
    new_arena_buffer, new_buffer, new_tree_buffer, ArenaBuffer, BufferIterator, MemBuffer,
    TreeBuffer,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of membuffer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
