//! Metric formatting helpers, pure and side-effect free

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::bench::scheduler::BenchResult;

/// Regex matching emoji and pictographic code points stripped from names
static EMOJI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{2600}-\x{26FF}\x{1F1E0}-\x{1F1FF}]",
    )
    .expect("Invalid emoji regex")
});

/// Regex matching whitespace runs collapsed to a single space
static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("Invalid space regex"));

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RESET: &str = "\x1b[0m";

/// Proxies below 1 MiB/s render red, above 10 MiB/s green
const SLOW_BANDWIDTH: f64 = 1024.0 * 1024.0;
const FAST_BANDWIDTH: f64 = 10.0 * 1024.0 * 1024.0;

/// Display-safe proxy name: emoji stripped, whitespace runs collapsed,
/// ends trimmed. The stored name used for lookups is never altered.
pub fn display_name(name: &str) -> String {
    let no_emoji = EMOJI_REGEX.replace_all(name, "");
    let merged = SPACE_REGEX.replace_all(&no_emoji, " ");
    merged.trim().to_string()
}

/// Human-readable bandwidth, scaled by 1024 from B/s up to TB/s
pub fn format_bandwidth(v: f64) -> String {
    if v <= 0.0 {
        return "N/A".to_string();
    }
    let mut v = v;
    for unit in ["B/s", "KB/s", "MB/s", "GB/s"] {
        if v < 1024.0 {
            return format!("{v:.2}{unit}");
        }
        v /= 1024.0;
    }
    format!("{v:.2}TB/s")
}

/// Human-readable TTFB in milliseconds, `N/A` when unmeasured
pub fn format_milliseconds(v: Option<Duration>) -> String {
    match v {
        Some(d) if !d.is_zero() => format!("{:.2}ms", d.as_secs_f64() * 1000.0),
        _ => "N/A".to_string(),
    }
}

/// Column header matching `render_row`'s layout
pub fn table_header() -> String {
    format!("{:<42}\t{:<12}\t{:<12}", "Node", "Bandwidth", "TTFB")
}

/// One colored, fixed-width table row for a result
pub fn render_row(result: &BenchResult) -> String {
    let color = if result.bandwidth <= 0.0 {
        ""
    } else if result.bandwidth < SLOW_BANDWIDTH {
        ANSI_RED
    } else if result.bandwidth > FAST_BANDWIDTH {
        ANSI_GREEN
    } else {
        ""
    };
    format!(
        "{}{:<42}\t{:<12}\t{:<12}{}",
        color,
        display_name(&result.name),
        format_bandwidth(result.bandwidth),
        format_milliseconds(result.ttfb),
        ANSI_RESET,
    )
}
