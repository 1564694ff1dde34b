//! Benchmark engine
//!
//! This module provides the measurement core:
//! - Timed single-chunk downloads through an opaque dial capability
//! - Concurrent chunk scheduling and per-proxy aggregation
//! - Sequential driving of a full proxy list
//! - Result selection, ranking and metric formatting

pub mod driver;
pub mod fetch;
pub mod format;
pub mod ranking;
pub mod scheduler;

pub use driver::run_all;
pub use fetch::{fetch_chunk, Dialer, FetchOutcome};
pub use ranking::{rank, select, SortField};
pub use scheduler::{run_proxy, BenchResult, UNAVAILABLE_BANDWIDTH};

use std::time::Duration;

/// Default liveness object URL; `%d` is replaced with the chunk size in bytes
pub const DEFAULT_URL_TEMPLATE: &str = "https://speed.cloudflare.com/__down?bytes=%d";

/// Default total download size per proxy (100 MiB)
pub const DEFAULT_DOWNLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Default per-chunk timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent chunks per proxy
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Run-wide benchmark parameters, captured once at startup
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Total download size per proxy in bytes
    pub download_size: u64,
    /// Deadline for each chunk, covering connect and full body read
    pub timeout: Duration,
    /// Number of concurrent chunks per proxy
    pub concurrency: usize,
    /// Liveness object URL template with a `%d` byte-size placeholder
    pub url_template: String,
    /// Regular expression selecting which proxy names are tested
    pub filter: String,
    /// Metric the final table is ordered by
    pub sort: SortField,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            download_size: DEFAULT_DOWNLOAD_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            filter: ".*".to_string(),
            sort: SortField::Bandwidth,
        }
    }
}

impl BenchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download_size(mut self, size: u64) -> Self {
        self.download_size = size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_url_template(mut self, template: String) -> Self {
        self.url_template = template;
        self
    }

    pub fn with_filter(mut self, filter: String) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_config_default() {
        let config = BenchConfig::default();
        assert_eq!(config.download_size, DEFAULT_DOWNLOAD_SIZE);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_bench_config_builder() {
        let config = BenchConfig::new()
            .with_download_size(1024)
            .with_timeout(Duration::from_secs(30))
            .with_concurrency(8)
            .with_url_template("http://example.com/?bytes=%d".to_string())
            .with_filter("^hk".to_string())
            .with_sort(SortField::Ttfb);

        assert_eq!(config.download_size, 1024);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.url_template, "http://example.com/?bytes=%d");
        assert_eq!(config.filter, "^hk");
        assert_eq!(config.sort, SortField::Ttfb);
    }
}
