//! Configuration scrubbing and per-entry policy filters
//!
//! Proxy lists in the wild are frequently scraped out of HTML and carry
//! entity fragments and glob characters that break YAML parsing; the
//! scrubber removes those before the parser sees the text. The entry
//! filters drop malformed or policy-excluded proxies before they reach
//! the directory.

use serde_yaml::Mapping;

/// Cipher excluded by policy on every non-trojan entry
const EXCLUDED_CIPHER: &str = "aes-128-gcm";

/// Canonical UUID text length required on vmess entries
const VMESS_UUID_LEN: usize = 36;

/// Strip artifacts of HTML-scraped configs from the raw source text
pub fn scrub_source(text: &str) -> String {
    text.replace("&quot;", "")
        .replace("&quot", "")
        .replace('*', "")
        .replace('?', "")
}

/// Why an entry was dropped before reaching the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingType,
    MissingName,
    ExcludedCipher(String),
    BadVmessUuid,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MissingType => write!(f, "missing or non-string type field"),
            Rejection::MissingName => write!(f, "missing or non-string name field"),
            Rejection::ExcludedCipher(c) => write!(f, "policy-excluded cipher {c}"),
            Rejection::BadVmessUuid => write!(f, "vmess uuid missing or malformed"),
        }
    }
}

fn str_field<'a>(config: &'a Mapping, key: &str) -> Option<&'a str> {
    config.get(key).and_then(|v| v.as_str())
}

/// Validate one raw proxy mapping against the entry policy.
///
/// Returns the entry's `type` and `name` on success so callers don't
/// re-extract them.
pub fn vet_entry(config: &Mapping) -> Result<(&str, &str), Rejection> {
    let proxy_type = str_field(config, "type").ok_or(Rejection::MissingType)?;
    let name = str_field(config, "name").ok_or(Rejection::MissingName)?;

    if proxy_type != "trojan" {
        if let Some(cipher) = str_field(config, "cipher") {
            if cipher.contains(EXCLUDED_CIPHER) {
                return Err(Rejection::ExcludedCipher(cipher.to_string()));
            }
        }
    }

    if proxy_type == "vmess" {
        match str_field(config, "uuid") {
            Some(uuid) if uuid.chars().count() == VMESS_UUID_LEN => {}
            _ => return Err(Rejection::BadVmessUuid),
        }
    }

    Ok((proxy_type, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> Mapping {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert((*k).into(), (*v).into());
        }
        m
    }

    #[test]
    fn test_scrub_source_removes_scrape_artifacts() {
        let dirty = "name: &quot;node&quot;\nserver: a.example.com\npath: /ws?ed=2048*";
        let clean = scrub_source(dirty);
        assert!(!clean.contains("&quot"));
        assert!(!clean.contains('*'));
        assert!(!clean.contains('?'));
        assert!(clean.contains("node"));
    }

    #[test]
    fn test_scrub_source_handles_bare_quot() {
        assert_eq!(scrub_source("a&quotb"), "ab");
        assert_eq!(scrub_source("a&quot;b"), "ab");
    }

    #[test]
    fn test_vet_entry_accepts_plain_http() {
        let m = mapping(&[("type", "http"), ("name", "n1"), ("server", "h")]);
        assert_eq!(vet_entry(&m).unwrap(), ("http", "n1"));
    }

    #[test]
    fn test_vet_entry_requires_type_and_name() {
        let m = mapping(&[("name", "n1")]);
        assert_eq!(vet_entry(&m).unwrap_err(), Rejection::MissingType);

        let m = mapping(&[("type", "http")]);
        assert_eq!(vet_entry(&m).unwrap_err(), Rejection::MissingName);
    }

    #[test]
    fn test_vet_entry_excluded_cipher() {
        let m = mapping(&[("type", "ss"), ("name", "n1"), ("cipher", "aes-128-gcm")]);
        assert!(matches!(
            vet_entry(&m).unwrap_err(),
            Rejection::ExcludedCipher(_)
        ));

        // A trojan entry is exempt from the cipher policy.
        let m = mapping(&[("type", "trojan"), ("name", "n2"), ("cipher", "aes-128-gcm")]);
        assert!(vet_entry(&m).is_ok());

        let m = mapping(&[
            ("type", "ss"),
            ("name", "n3"),
            ("cipher", "chacha20-ietf-poly1305"),
        ]);
        assert!(vet_entry(&m).is_ok());
    }

    #[test]
    fn test_vet_entry_vmess_uuid() {
        let m = mapping(&[
            ("type", "vmess"),
            ("name", "n1"),
            ("uuid", "123e4567-e89b-12d3-a456-426614174000"),
        ]);
        assert!(vet_entry(&m).is_ok());

        let m = mapping(&[("type", "vmess"), ("name", "n2"), ("uuid", "short")]);
        assert_eq!(vet_entry(&m).unwrap_err(), Rejection::BadVmessUuid);

        let m = mapping(&[("type", "vmess"), ("name", "n3")]);
        assert_eq!(vet_entry(&m).unwrap_err(), Rejection::BadVmessUuid);
    }
}
