use anyhow::Result;
use clap::Parser;
use proxy_bench::{
    bench::{self, format, ranking, BenchConfig},
    directory, export,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Concurrent bandwidth and TTFB benchmark for clash-style proxy lists
#[derive(Parser)]
#[command(name = "proxy-bench")]
#[command(about = "Benchmark proxies by bandwidth and time-to-first-byte")]
struct Cli {
    /// Liveness object URL template; %d receives the chunk size in bytes
    #[arg(short, long, default_value = bench::DEFAULT_URL_TEMPLATE)]
    liveness: String,

    /// Configuration source(s): file path or http(s) URL, comma separated
    #[arg(short, long)]
    config: String,

    /// Filter proxies by name, using a regular expression
    #[arg(short, long, default_value = ".*")]
    filter: String,

    /// Total download size per proxy in bytes
    #[arg(long, default_value_t = bench::DEFAULT_DOWNLOAD_SIZE)]
    size: u64,

    /// Timeout per chunk in seconds
    #[arg(long, default_value_t = bench::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Sort field for the final table: b/bandwidth or t/ttfb
    #[arg(short, long, default_value = "b")]
    sort: String,

    /// Write results to a file: csv or yaml
    #[arg(short, long)]
    output: Option<String>,

    /// Base name for the output file
    #[arg(long, default_value = "result")]
    outfile: String,

    /// Number of concurrent chunks per proxy
    #[arg(short = 'n', long, default_value_t = bench::DEFAULT_CONCURRENCY)]
    concurrent: usize,

    /// Bandwidth floor in bytes/sec; proxies at or below it are left out of
    /// the yaml output
    #[arg(long, default_value_t = -0.1, allow_negative_numbers = true)]
    threshold: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sort = ranking::SortField::parse(&cli.sort)?;

    let config = BenchConfig::new()
        .with_download_size(cli.size)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_concurrency(cli.concurrent)
        .with_url_template(cli.liveness.clone())
        .with_filter(cli.filter.clone())
        .with_sort(sort);

    let proxies = directory::load_sources(&cli.config).await?;
    println!("Loaded {} proxies", proxies.len());

    let selected = ranking::select(&proxies.names(), &config.filter)?;

    println!("{}", format::table_header());
    let mut results = bench::run_all(&selected, &proxies, &config).await?;

    ranking::rank(&mut results, config.sort);
    println!("\n\n=== results, ranked ===");
    println!("{}", format::table_header());
    for result in &results {
        println!("{}", format::render_row(result));
    }

    match cli.output.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("yaml") => {
            let path = PathBuf::from(format!("{}.yaml", cli.outfile));
            export::write_yaml(&path, &results, &proxies, cli.threshold)?;
            println!("Wrote {}", path.display());
        }
        Some("csv") => {
            let path = PathBuf::from(format!("{}.csv", cli.outfile));
            export::write_csv(&path, &results)?;
            println!("Wrote {}", path.display());
        }
        _ => {}
    }

    Ok(())
}
