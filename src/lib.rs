pub mod config;
pub mod error;
pub mod guard;
pub mod hls;
pub mod proxy;
pub mod server;
pub mod stream;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
