//! Proxy directory: resolves configuration sources into named dial capabilities
//!
//! This module provides functionality for:
//! - Reading clash-style YAML configs from local files or http(s) URLs,
//!   comma-separated
//! - Scrubbing and vetting raw entries before they become directory entries
//! - Expanding remote proxy-provider bundles into additional named entries
//! - Building one dial capability per entry at load time

pub mod models;
pub mod sanitize;

pub use models::{ProxyDirectory, ProxyEntry, ProxyKind, UpstreamDialer};

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::bench::fetch::Dialer;
use crate::Result;

/// Provider name reserved for internal use; defining it is a config error
pub const RESERVED_PROVIDER_NAME: &str = "default";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    proxies: Vec<Mapping>,
    #[serde(default, rename = "proxy-providers")]
    providers: HashMap<String, Mapping>,
}

/// Resolve a comma-separated list of config sources into a directory.
///
/// Each source is an `http(s)://` URL or a local file path. A source that
/// cannot be read is skipped with a warning; a source that reads but does
/// not parse is fatal. Duplicate names across sources keep the first
/// occurrence.
pub async fn load_sources(sources: &str) -> Result<ProxyDirectory> {
    let mut directory = ProxyDirectory::new();
    for source in sources.split(',') {
        let body = match read_source(source).await {
            Ok(body) => body,
            Err(e) => {
                warn!("failed to read config {source}: {e}");
                continue;
            }
        };
        let entries = parse_config(&body)
            .await
            .with_context(|| format!("failed to parse config {source}"))?;
        for entry in entries {
            let name = entry.name.clone();
            if !directory.insert(entry) {
                warn!("proxy {name} has a duplicate name, keeping the first");
            }
        }
    }
    Ok(directory)
}

async fn read_source(source: &str) -> Result<String> {
    if source.starts_with("http") {
        let response = reqwest::get(source).await?;
        Ok(response.text().await?)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

/// Parse one config body into entries, expanding its providers
pub async fn parse_config(body: &str) -> Result<Vec<ProxyEntry>> {
    let text = sanitize::scrub_source(body);
    let raw: RawConfig = serde_yaml::from_str(&text).context("config is not valid YAML")?;

    let mut entries = collect_entries(&raw.proxies, None);

    for (provider_name, provider_config) in &raw.providers {
        if provider_name == RESERVED_PROVIDER_NAME {
            bail!("can not define a provider called `{RESERVED_PROVIDER_NAME}`");
        }
        let expanded = expand_provider(provider_name, provider_config)
            .await
            .with_context(|| format!("failed to expand provider {provider_name}"))?;
        entries.extend(expanded);
    }

    Ok(entries)
}

/// Vet raw proxy mappings and turn the survivors into entries.
///
/// Names are prefixed `[<provider>] ` when the mappings came out of a
/// provider bundle. Duplicates within one batch keep the first occurrence.
fn collect_entries(proxies: &[Mapping], provider: Option<&str>) -> Vec<ProxyEntry> {
    let mut entries: Vec<ProxyEntry> = Vec::with_capacity(proxies.len());
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    for (i, config) in proxies.iter().enumerate() {
        let (proxy_type, name) = match sanitize::vet_entry(config) {
            Ok(fields) => fields,
            Err(rejection) => {
                warn!("skipping proxy {i}: {rejection}");
                continue;
            }
        };
        let name = match provider {
            Some(provider) => format!("[{provider}] {name}"),
            None => name.to_string(),
        };
        if !seen.insert(name.clone()) {
            warn!("proxy {name} has a duplicate name, keeping the first");
            continue;
        }

        let kind = ProxyKind::from_type_field(proxy_type);
        let dialer = build_dialer(&kind, config);
        entries.push(ProxyEntry {
            name,
            kind,
            dialer,
            raw: serde_yaml::Value::Mapping(config.clone()),
        });
    }

    entries
}

/// Fetch a provider bundle and parse its `proxies` list.
///
/// Only `type: http` providers are supported; nested providers inside a
/// bundle are ignored.
async fn expand_provider(name: &str, config: &Mapping) -> Result<Vec<ProxyEntry>> {
    let provider_type = config.get("type").and_then(|v| v.as_str()).unwrap_or("");
    if provider_type != "http" {
        bail!("unsupported provider type: {provider_type}");
    }
    let url = config
        .get("url")
        .and_then(|v| v.as_str())
        .context("provider has no url")?;

    let body = reqwest::get(url).await?.text().await?;
    let text = sanitize::scrub_source(&body);
    let raw: RawConfig = serde_yaml::from_str(&text).context("provider bundle is not valid YAML")?;

    Ok(collect_entries(&raw.proxies, Some(name)))
}

/// Build the dial capability for a leaf entry, if this client can speak its
/// protocol. The upstream URL is fixed here once; the engine never looks at
/// the protocol again.
fn build_dialer(kind: &ProxyKind, config: &Mapping) -> Option<Arc<dyn Dialer>> {
    let scheme = match kind {
        ProxyKind::Http => {
            let tls = config.get("tls").and_then(|v| v.as_bool()).unwrap_or(false);
            if tls {
                "https"
            } else {
                "http"
            }
        }
        ProxyKind::Socks5 => "socks5",
        _ => return None,
    };

    let server = config.get("server").and_then(|v| v.as_str())?;
    let port = port_field(config)?;

    let userinfo = match (
        config.get("username").and_then(|v| v.as_str()),
        config.get("password").and_then(|v| v.as_str()),
    ) {
        (Some(user), Some(pass)) => format!("{user}:{pass}@"),
        _ => String::new(),
    };

    let url = format!("{scheme}://{userinfo}{server}:{port}");
    Some(Arc::new(UpstreamDialer::new(url)))
}

fn port_field(config: &Mapping) -> Option<u16> {
    let value = config.get("port")?;
    if let Some(n) = value.as_u64() {
        return u16::try_from(n).ok();
    }
    value.as_str().and_then(|s| s.parse().ok())
}
