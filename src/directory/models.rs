//! Proxy directory data models

use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::bench::fetch::Dialer;
use crate::Result;

/// User agent presented by the benchmark client
pub const USER_AGENT: &str = "clash.meta";

/// Classification of a clash `type` field.
///
/// Leaf kinds terminate traffic at an upstream server; group kinds only
/// route to other proxies and are never benchmarked. Anything not listed
/// here is `Unknown` and aborts a run when the driver reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyKind {
    Http,
    Socks5,
    Shadowsocks,
    ShadowsocksR,
    Snell,
    Vmess,
    Vless,
    Trojan,
    Hysteria,
    Hysteria2,
    WireGuard,
    Tuic,
    Direct,
    Reject,
    Relay,
    Selector,
    Fallback,
    UrlTest,
    LoadBalance,
    Unknown(String),
}

impl ProxyKind {
    /// Map a clash configuration `type` string to a kind
    pub fn from_type_field(s: &str) -> Self {
        match s {
            "http" => ProxyKind::Http,
            "socks5" => ProxyKind::Socks5,
            "ss" => ProxyKind::Shadowsocks,
            "ssr" => ProxyKind::ShadowsocksR,
            "snell" => ProxyKind::Snell,
            "vmess" => ProxyKind::Vmess,
            "vless" => ProxyKind::Vless,
            "trojan" => ProxyKind::Trojan,
            "hysteria" => ProxyKind::Hysteria,
            "hysteria2" => ProxyKind::Hysteria2,
            "wireguard" => ProxyKind::WireGuard,
            "tuic" => ProxyKind::Tuic,
            "direct" => ProxyKind::Direct,
            "reject" => ProxyKind::Reject,
            "relay" => ProxyKind::Relay,
            "select" => ProxyKind::Selector,
            "fallback" => ProxyKind::Fallback,
            "url-test" => ProxyKind::UrlTest,
            "load-balance" => ProxyKind::LoadBalance,
            other => ProxyKind::Unknown(other.to_string()),
        }
    }

    /// Whether this kind merely routes to other proxies
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            ProxyKind::Direct
                | ProxyKind::Reject
                | ProxyKind::Relay
                | ProxyKind::Selector
                | ProxyKind::Fallback
                | ProxyKind::UrlTest
                | ProxyKind::LoadBalance
        )
    }

    /// Whether this kind terminates traffic at an upstream server
    pub fn is_leaf(&self) -> bool {
        !self.is_group() && !matches!(self, ProxyKind::Unknown(_))
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProxyKind::Http => "http",
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Shadowsocks => "ss",
            ProxyKind::ShadowsocksR => "ssr",
            ProxyKind::Snell => "snell",
            ProxyKind::Vmess => "vmess",
            ProxyKind::Vless => "vless",
            ProxyKind::Trojan => "trojan",
            ProxyKind::Hysteria => "hysteria",
            ProxyKind::Hysteria2 => "hysteria2",
            ProxyKind::WireGuard => "wireguard",
            ProxyKind::Tuic => "tuic",
            ProxyKind::Direct => "direct",
            ProxyKind::Reject => "reject",
            ProxyKind::Relay => "relay",
            ProxyKind::Selector => "select",
            ProxyKind::Fallback => "fallback",
            ProxyKind::UrlTest => "url-test",
            ProxyKind::LoadBalance => "load-balance",
            ProxyKind::Unknown(other) => other.as_str(),
        };
        write!(f, "{s}")
    }
}

/// Dialer backed by an upstream proxy URL.
///
/// The URL scheme is fixed when the directory is built; every request
/// scheme is routed through it (`reqwest::Proxy::all`).
pub struct UpstreamDialer {
    url: String,
}

impl UpstreamDialer {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl Dialer for UpstreamDialer {
    fn client(&self, timeout: Duration) -> Result<Client> {
        let proxy = reqwest::Proxy::all(&self.url)?;
        let client = Client::builder()
            .proxy(proxy)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(client)
    }
}

/// One named proxy from the configuration.
///
/// `raw` keeps the original YAML mapping verbatim for selective re-emission
/// by the export collaborator. `dialer` is present only for leaf protocols
/// this client can actually establish connections through.
pub struct ProxyEntry {
    pub name: String,
    pub kind: ProxyKind,
    pub dialer: Option<Arc<dyn Dialer>>,
    pub raw: serde_yaml::Value,
}

/// Name-keyed proxy collection for one benchmark run
#[derive(Default)]
pub struct ProxyDirectory {
    entries: HashMap<String, ProxyEntry>,
}

impl ProxyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; returns false (and keeps the original) when the
    /// name is already taken.
    pub fn insert(&mut self, entry: ProxyEntry) -> bool {
        if self.entries.contains_key(&entry.name) {
            return false;
        }
        self.entries.insert(entry.name.clone(), entry);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<&ProxyEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
