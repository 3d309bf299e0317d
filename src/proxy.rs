pub mod classify;
pub mod client;
pub mod relay;

pub use classify::PayloadKind;
pub use client::{ProxyClient, UpstreamResponse};
