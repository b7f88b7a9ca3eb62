mod http;
pub mod retry;

pub use http::*;
pub use retry::RetryPolicy;
