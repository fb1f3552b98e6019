//! Configuration for membuffer
//!
//! Centralized configuration with sensible defaults.

use crate::error::{BufferError, Result};

/// Backing engine of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Balanced search tree (`BTreeMap`). Predictable latency under random
    /// insertion.
    Tree,

    /// Arena-backed skip list. Fewer allocations, bulk release.
    #[default]
    Arena,
}

/// Largest arena reservation: the arena addresses its bytes with `u32` offsets
pub const MAX_ARENA_CAPACITY: usize = u32::MAX as usize;

/// Configuration for a single buffer instance
#[derive(Debug, Clone)]
pub struct BufferConfig {
    // -------------------------------------------------------------------------
    // Engine Selection
    // -------------------------------------------------------------------------
    /// Which engine backs the buffer
    pub engine: EngineKind,

    // -------------------------------------------------------------------------
    // Arena Configuration
    // -------------------------------------------------------------------------
    /// Bytes reserved up front for key/value data (arena engine only).
    /// At most `MAX_ARENA_CAPACITY`.
    pub arena_capacity: usize,

    /// Seed for skip list heights. `None` seeds from the OS.
    pub seed: Option<u64>,

    // -------------------------------------------------------------------------
    // Limits
    // -------------------------------------------------------------------------
    /// Max live key+value bytes. `None` means unlimited.
    ///
    /// Only live entries count. Arena bytes left behind by overwrites are
    /// not bounded by this limit; they are reclaimed on release.
    pub size_limit: Option<usize>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            arena_capacity: 4 * 1024, // 4 KB
            seed: None,
            size_limit: None,
        }
    }
}

impl BufferConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for BufferConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: BufferConfig,
}

impl ConfigBuilder {
    /// Set the backing engine
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    /// Set the initial arena capacity (in bytes)
    pub fn arena_capacity(mut self, bytes: usize) -> Self {
        self.config.arena_capacity = bytes;
        self
    }

    /// Fix the skip list height seed (reproducible layouts)
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the staged size limit (in bytes)
    pub fn size_limit(mut self, bytes: usize) -> Self {
        self.config.size_limit = Some(bytes);
        self
    }

    pub fn build(self) -> Result<BufferConfig> {
        if self.config.size_limit == Some(0) {
            return Err(BufferError::Config(
                "size_limit must be greater than zero".to_string(),
            ));
        }
        if self.config.arena_capacity > MAX_ARENA_CAPACITY {
            return Err(BufferError::Config(format!(
                "arena_capacity {} exceeds maximum of {} bytes",
                self.config.arena_capacity, MAX_ARENA_CAPACITY
            )));
        }
        Ok(self.config)
    }
}

/// Reject a write that would take the buffer past `limit`.
pub(crate) fn check_size_limit(limit: Option<usize>, requested: usize) -> Result<()> {
    match limit {
        Some(limit) if requested > limit => {
            tracing::warn!(limit, requested, "Rejecting write past buffer size limit");
            Err(BufferError::SizeLimitExceeded { limit, requested })
        }
        _ => Ok(()),
    }
}
