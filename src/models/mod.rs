pub mod fill;

pub use fill::{FillRequest, ParseError};
