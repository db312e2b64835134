//! HTTP request handlers.

mod download;
mod upload;

pub use download::*;
pub use upload::*;
