//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Once;

use membuffer::{new_arena_buffer, new_tree_buffer, MemBuffer};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Route library tracing output through the test harness.
///
/// Set `RUST_LOG=membuffer=trace` to see it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// One fresh buffer per engine, tree first.
pub fn all_engines() -> Vec<Box<dyn MemBuffer>> {
    init_tracing();
    vec![new_tree_buffer(), new_arena_buffer()]
}

/// Zero-padded 10-digit decimal, so numeric order equals byte order.
pub fn encode_int(n: usize) -> Vec<u8> {
    format!("{:010}", n).into_bytes()
}

pub fn decode_int(bytes: &[u8]) -> usize {
    std::str::from_utf8(bytes)
        .expect("encoded ints are ASCII")
        .parse()
        .expect("encoded ints are decimal")
}

/// `encode_int(0..count)` in a reproducible shuffled order.
pub fn shuffled(count: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut data: Vec<Vec<u8>> = (0..count).map(encode_int).collect();
    data.shuffle(&mut SmallRng::seed_from_u64(seed));
    data
}

/// Drain a buffer from `seek` into (key, value) pairs.
pub fn collect(buffer: &dyn MemBuffer, seek: Option<&[u8]>) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut iter = buffer.new_iterator(seek);
    let mut out = Vec::new();
    while iter.valid() {
        out.push((iter.key().unwrap().to_vec(), iter.value().unwrap().to_vec()));
        iter.next().unwrap();
    }
    iter.close();
    out
}
