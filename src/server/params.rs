use serde::Deserialize;

/// Query parameters for `GET /`.
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    /// Percent-encoded absolute URL of the upstream resource.
    #[serde(default)]
    pub url: Option<String>,
}
