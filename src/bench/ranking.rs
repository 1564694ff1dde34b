//! Name selection and result ranking

use anyhow::{anyhow, Context};
use regex::Regex;
use std::time::Duration;

use crate::bench::scheduler::BenchResult;
use crate::Result;

/// Metric the result table is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Bandwidth, descending
    Bandwidth,
    /// Time to first byte, ascending
    Ttfb,
}

impl SortField {
    /// Parse the CLI spelling. Anything else is a fatal configuration error.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "b" | "bandwidth" => Ok(SortField::Bandwidth),
            "t" | "ttfb" => Ok(SortField::Ttfb),
            _ => Err(anyhow!(
                "Unsupported sort field: {}. Use: b, bandwidth, t, ttfb",
                s
            )),
        }
    }
}

/// Return the proxy names matching `pattern`, sorted lexicographically.
///
/// An invalid pattern is a fatal configuration error; a pattern matching
/// nothing yields an empty list and the run simply tests no proxies.
pub fn select<'a, I>(names: I, pattern: &str) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let filter =
        Regex::new(pattern).with_context(|| format!("invalid filter pattern: {pattern}"))?;
    let mut selected: Vec<String> = names
        .into_iter()
        .filter(|name| filter.is_match(name))
        .cloned()
        .collect();
    selected.sort();
    Ok(selected)
}

/// Stable-sort results by the chosen metric.
///
/// Unavailable results carry a negative bandwidth and no TTFB, so they land
/// at the losing end of either ordering.
pub fn rank(results: &mut [BenchResult], field: SortField) {
    match field {
        SortField::Bandwidth => {
            results.sort_by(|a, b| b.bandwidth.total_cmp(&a.bandwidth));
        }
        SortField::Ttfb => {
            results.sort_by_key(|r| r.ttfb.unwrap_or(Duration::MAX));
        }
    }
}
