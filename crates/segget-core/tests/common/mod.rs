#![allow(dead_code)]

pub mod range_server;

/// Deterministic, non-repeating-per-block test body.
pub fn body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
