pub mod error;
pub mod fill;

pub use error::ProxyError;
