use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::guard::AllowList;

/// Hosts permitted when `ALLOWED_HOSTS` is not set.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["video.tpa.ao"];

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,

    /// Base used for rewritten manifest lines. When `None`, it is derived
    /// from the incoming request's `Host` header.
    pub public_base_url: Option<Url>,

    pub allow_list: AllowList,

    pub upstream_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,

    /// Also rewrite `URI="..."` attributes inside tag lines.
    pub rewrite_tag_uris: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: None,
            allow_list: AllowList::new(DEFAULT_ALLOWED_HOSTS),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            rewrite_tag_uris: false,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(p) => p.parse().with_context(|| format!("invalid PORT: {}", p))?,
            None => defaults.port,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                let url = Url::parse(s.trim())
                    .with_context(|| format!("invalid PUBLIC_BASE_URL: {}", s))?;
                anyhow::ensure!(
                    matches!(url.scheme(), "http" | "https"),
                    "PUBLIC_BASE_URL must be an http(s) URL: {}",
                    s
                );
                Ok::<_, anyhow::Error>(url)
            })
            .transpose()?;

        let allow_list = match lookup("ALLOWED_HOSTS") {
            Some(list) => AllowList::parse(&list),
            None => defaults.allow_list,
        };
        if allow_list.is_empty() {
            tracing::warn!("ALLOWED_HOSTS is empty, every proxy request will be forbidden");
        }

        let upstream_timeout = parse_secs(&lookup, "UPSTREAM_TIMEOUT_SECS")?
            .unwrap_or(defaults.upstream_timeout);
        let connect_timeout = parse_secs(&lookup, "UPSTREAM_CONNECT_TIMEOUT_SECS")?
            .unwrap_or(defaults.connect_timeout);

        let rewrite_tag_uris = match lookup("REWRITE_TAG_URIS") {
            Some(v) => {
                parse_bool(&v).with_context(|| format!("invalid REWRITE_TAG_URIS: {}", v))?
            }
            None => defaults.rewrite_tag_uris,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            public_base_url,
            allow_list,
            upstream_timeout,
            connect_timeout,
            user_agent: lookup("UPSTREAM_USER_AGENT").unwrap_or(defaults.user_agent),
            rewrite_tag_uris,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<Duration>> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid {}: {}", key, value))?;
    anyhow::ensure!(secs > 0, "{} must be greater than zero", key);
    Ok(Some(Duration::from_secs(secs)))
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert!(config.public_base_url.is_none());
        assert!(config.allow_list.contains("video.tpa.ao"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert!(!config.rewrite_tag_uris);
        assert!(config.user_agent.starts_with("hls-relay/"));
    }

    #[test]
    fn test_overrides() {
        let config = ProxyConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("PUBLIC_BASE_URL", "https://proxy.example"),
            ("ALLOWED_HOSTS", "a.example,b.example"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("REWRITE_TAG_URIS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(
            config.public_base_url.unwrap().as_str(),
            "https://proxy.example/"
        );
        assert!(config.allow_list.contains("b.example"));
        assert!(!config.allow_list.contains("video.tpa.ao"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert!(config.rewrite_tag_uris);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ProxyConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(ProxyConfig::from_lookup(lookup(&[("PUBLIC_BASE_URL", "/relative")])).is_err());
        assert!(ProxyConfig::from_lookup(lookup(&[("PUBLIC_BASE_URL", "ftp://x")])).is_err());
        assert!(ProxyConfig::from_lookup(lookup(&[("UPSTREAM_TIMEOUT_SECS", "0")])).is_err());
        assert!(ProxyConfig::from_lookup(lookup(&[("REWRITE_TAG_URIS", "maybe")])).is_err());
    }
}
