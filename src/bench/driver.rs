//! Benchmark driver: sequential per-proxy iteration

use anyhow::bail;
use std::sync::Arc;
use tracing::warn;

use crate::bench::format;
use crate::bench::scheduler::{run_proxy, BenchResult};
use crate::bench::BenchConfig;
use crate::directory::ProxyDirectory;
use crate::Result;

/// Benchmark every eligible proxy in `names`, one at a time.
///
/// Routing groups are passed over silently; names the directory cannot
/// resolve, and leaf protocols this client cannot dial, are skipped with a
/// warning. An unrecognized proxy type is a configuration error that aborts
/// the whole run. A progress row is printed as each proxy completes;
/// results come back in processing order.
pub async fn run_all(
    names: &[String],
    directory: &ProxyDirectory,
    config: &BenchConfig,
) -> Result<Vec<BenchResult>> {
    let mut results = Vec::with_capacity(names.len());

    for name in names {
        let Some(entry) = directory.resolve(name) else {
            warn!("skipping {name}: not present in the directory");
            continue;
        };
        if entry.kind.is_group() {
            continue;
        }
        if !entry.kind.is_leaf() {
            bail!("unsupported proxy type: {}", entry.kind);
        }
        let Some(dialer) = &entry.dialer else {
            warn!("skipping {name}: no client support for {}", entry.kind);
            continue;
        };

        let result = run_proxy(name, Arc::clone(dialer), config).await;
        println!("{}", format::render_row(&result));
        results.push(result);
    }

    Ok(results)
}
