pub mod origin;
pub mod resize;

pub use origin::{HttpOrigin, Origin, OriginError, OriginResponse};
pub use resize::{LanczosResizer, ResizeError, Resizer};
