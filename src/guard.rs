//! Upstream origin validation.
//!
//! Every target URL passes through [`OriginGuard::validate`] before the
//! proxy opens a connection. Only absolute `http`/`https` URLs whose host is
//! listed verbatim in the [`AllowList`] get through, so the service cannot be
//! used as an open relay.

use std::{collections::HashSet, fmt, sync::Arc};

use url::Url;

use crate::{Error, Result};

/// Hostnames the proxy may fetch from.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone, Default)]
pub struct AllowList {
    hosts: Arc<HashSet<String>>,
}

impl AllowList {
    /// Build an allow-list from hostnames. Entries are trimmed and
    /// lower-cased; blank entries are skipped.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self {
            hosts: Arc::new(hosts),
        }
    }

    /// Parse a comma-separated host list, e.g. `a.example,b.example`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Exact, case-insensitive hostname match. No wildcard or subdomain
    /// inference.
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(&host.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hosts in sorted order, for logging.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.hosts.iter().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }
}

impl fmt::Debug for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hosts()).finish()
    }
}

/// An upstream URL that passed origin validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(Url);

impl TargetUrl {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Validates raw `url` query values against an [`AllowList`].
pub struct OriginGuard;

impl OriginGuard {
    /// Turn a raw query value into a [`TargetUrl`].
    ///
    /// Pure: performs no I/O.
    pub fn validate(raw: Option<&str>, allow_list: &AllowList) -> Result<TargetUrl> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty());
        let Some(raw) = raw else {
            return Err(Error::MissingUrl);
        };

        let url = Url::parse(raw)?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(Error::UnsupportedScheme(other.to_string())),
        }

        let Some(host) = url.host_str() else {
            return Err(Error::InvalidUrl(format!("missing host in {}", raw)));
        };

        if !allow_list.contains(host) {
            return Err(Error::ForbiddenHost(host.to_string()));
        }

        Ok(TargetUrl(url))
    }
}
