//! Proxy Bench - Concurrent Proxy Benchmark Engine
//!
//! Benchmarks a list of named proxies by downloading a fixed-size payload
//! through each one with several parallel chunked requests, measuring
//! time-to-first-byte and sustained bandwidth, then ranking the results.

pub mod bench;
pub mod directory;
pub mod export;

pub use bench::*;
pub use directory::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
