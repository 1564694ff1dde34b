//! Timed fetch unit: one bounded download through a proxy's dial capability

use reqwest::Client;
use std::time::{Duration, Instant};

use crate::Result;

/// Widest status-code distance from 200 still counted as success
const SUCCESS_STATUS_BAND: i32 = 100;

/// Opaque dial capability bound to one proxy.
///
/// Implementations build an HTTP client whose connection establishment goes
/// through the proxy they represent. The protocol is resolved once when the
/// capability is created; the benchmark engine never inspects it.
pub trait Dialer: Send + Sync {
    /// Build a client routed through this proxy with an overall request
    /// deadline covering connect and full body read.
    fn client(&self, timeout: Duration) -> Result<Client>;
}

/// Outcome of a single chunk download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Bytes actually read from the response body
    pub bytes: u64,
    /// Time from request start to first response byte, if measured
    pub ttfb: Option<Duration>,
    /// Whether this chunk counts toward the proxy's aggregate
    pub success: bool,
}

impl FetchOutcome {
    fn failed() -> Self {
        Self {
            bytes: 0,
            ttfb: None,
            success: false,
        }
    }
}

/// Download `size_bytes` through `dialer` and time it.
///
/// `url_template` must contain a single `%d` placeholder that receives the
/// requested byte count. Dial errors, timeouts, status codes outside the
/// loose 200..=300 band and zero-byte bodies all yield a failed outcome;
/// this function never propagates an error to the caller.
pub async fn fetch_chunk(
    dialer: &dyn Dialer,
    size_bytes: u64,
    timeout: Duration,
    url_template: &str,
) -> FetchOutcome {
    let client = match dialer.client(timeout) {
        Ok(client) => client,
        Err(_) => return FetchOutcome::failed(),
    };

    let url = url_template.replacen("%d", &size_bytes.to_string(), 1);

    let start = Instant::now();
    let mut response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => return FetchOutcome::failed(),
    };
    if response.status().as_u16() as i32 - 200 > SUCCESS_STATUS_BAND {
        return FetchOutcome::failed();
    }
    let ttfb = start.elapsed();

    // Drain the body without keeping it; a read error mid-body (including
    // hitting the deadline) discards the partial count.
    let mut written: u64 = 0;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => written += chunk.len() as u64,
            Ok(None) => break,
            Err(_) => return FetchOutcome::failed(),
        }
    }
    if written == 0 {
        return FetchOutcome::failed();
    }

    FetchOutcome {
        bytes: written,
        ttfb: Some(ttfb),
        success: true,
    }
}
