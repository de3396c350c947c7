pub mod disk;
pub mod record;

pub use disk::{CacheError, DiskCache};
pub use record::StoredResponse;
