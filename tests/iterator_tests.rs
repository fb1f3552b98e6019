//! Iterator protocol tests
//!
//! Tests verify:
//! - Accessor guards on exhausted cursors
//! - next() on an exhausted cursor reports an error and does not move
//! - close() from every state, idempotence
//! - Independent cursors over the same buffer

mod common;

use common::{all_engines, encode_int};
use membuffer::{BufferError, MemBuffer};

fn fill(buffer: &mut dyn MemBuffer, count: usize) {
    for i in 0..count {
        buffer.set(&encode_int(i), &encode_int(i * 10)).unwrap();
    }
}

// =============================================================================
// Exhausted State Tests
// =============================================================================

#[test]
fn test_accessors_on_empty_buffer() {
    for buffer in all_engines() {
        let iter = buffer.new_iterator(None);

        assert!(!iter.valid());
        assert_eq!(iter.key(), Err(BufferError::InvalidIterator));
        assert_eq!(iter.value(), Err(BufferError::InvalidIterator));
    }
}

#[test]
fn test_next_past_end_reports_error() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 1);

        let mut iter = buffer.new_iterator(None);
        assert!(iter.valid());
        iter.next().unwrap();
        assert!(!iter.valid());

        // Stays exhausted, keeps reporting the same error
        for _ in 0..3 {
            assert_eq!(iter.next(), Err(BufferError::InvalidIterator));
            assert!(!iter.valid());
            assert_eq!(iter.key(), Err(BufferError::InvalidIterator));
        }
    }
}

#[test]
fn test_seek_past_end_is_exhausted() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 5);

        let mut iter = buffer.new_iterator(Some(b"9".as_slice()));
        assert!(!iter.valid());
        assert_eq!(iter.next(), Err(BufferError::InvalidIterator));
    }
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_while_positioned() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 3);

        let mut iter = buffer.new_iterator(None);
        assert!(iter.valid());
        iter.close();

        assert!(!iter.valid());
        assert_eq!(iter.key(), Err(BufferError::IteratorClosed));
        assert_eq!(iter.value(), Err(BufferError::IteratorClosed));
        assert_eq!(iter.next(), Err(BufferError::IteratorClosed));
    }
}

#[test]
fn test_close_while_exhausted_and_twice() {
    for buffer in all_engines() {
        let mut iter = buffer.new_iterator(None);
        iter.close();
        iter.close();

        assert!(!iter.valid());
        assert_eq!(iter.next(), Err(BufferError::IteratorClosed));
    }
}

#[test]
fn test_close_does_not_touch_buffer() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 3);

        let mut iter = buffer.new_iterator(None);
        iter.close();
        drop(iter);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(&encode_int(1)).unwrap(), encode_int(10).as_slice());
    }
}

// =============================================================================
// Multiple Cursor Tests
// =============================================================================

#[test]
fn test_cursors_are_independent() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 4);

        let mut first = buffer.new_iterator(None);
        let second = buffer.new_iterator(Some(encode_int(2).as_slice()));

        first.next().unwrap();
        first.next().unwrap();
        first.next().unwrap();

        assert_eq!(first.key().unwrap(), encode_int(3).as_slice());
        assert_eq!(second.key().unwrap(), encode_int(2).as_slice());
        assert_eq!(second.value().unwrap(), encode_int(20).as_slice());

        first.close();
        assert!(second.valid());
    }
}

#[test]
fn test_repeated_scans_see_same_contents() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 10);

        for _ in 0..3 {
            let mut iter = buffer.new_iterator(None);
            let mut seen = 0;
            while iter.valid() {
                assert_eq!(iter.key().unwrap(), encode_int(seen).as_slice());
                seen += 1;
                iter.next().unwrap();
            }
            assert_eq!(seen, 10);
        }
    }
}

#[test]
fn test_scan_sees_writes_made_before_it() {
    for mut buffer in all_engines() {
        fill(buffer.as_mut(), 2);
        assert!(buffer.new_iterator(Some(encode_int(2).as_slice())).key().is_err());

        buffer.set(&encode_int(2), b"late").unwrap();
        let iter = buffer.new_iterator(Some(encode_int(2).as_slice()));
        assert_eq!(iter.value().unwrap(), b"late");
    }
}
