//! CLI command implementations.

pub mod compare;
pub mod inspect;
pub mod serve;
