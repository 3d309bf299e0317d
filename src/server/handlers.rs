pub mod health;
pub mod proxy;

pub use health::health_check;
pub use proxy::{handle_proxy, method_not_allowed};
