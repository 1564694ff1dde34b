//! Export collaborator: write ranked results to YAML or CSV

use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::bench::scheduler::BenchResult;
use crate::directory::ProxyDirectory;
use crate::Result;

/// UTF-8 byte order mark written ahead of the CSV text so spreadsheet
/// tools pick the right encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the raw configurations of the surviving proxies as a YAML sequence.
///
/// Results with unavailable metrics and results at or below `threshold`
/// bytes/sec are left out, as are names the directory no longer knows.
/// Order follows `results`, so a ranked input yields a ranked file.
pub fn write_yaml(
    path: &Path,
    results: &[BenchResult],
    directory: &ProxyDirectory,
    threshold: f64,
) -> Result<()> {
    let kept: Vec<&serde_yaml::Value> = results
        .iter()
        .filter(|r| r.is_available() && r.bandwidth > threshold)
        .filter_map(|r| directory.resolve(&r.name).map(|entry| &entry.raw))
        .collect();

    let text = serde_yaml::to_string(&kept)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write every tested proxy as a flat CSV row: name, bandwidth in MB/s with
/// two decimals, TTFB in integer milliseconds. No thresholding here.
pub fn write_csv(path: &Path, results: &[BenchResult]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["name", "bandwidth_mbps", "ttfb_ms"])?;
    for result in results {
        writer.write_record([
            result.name.as_str(),
            &format!("{:.2}", result.bandwidth / 1024.0 / 1024.0),
            &result
                .ttfb
                .map_or(0, |d| d.as_millis())
                .to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
