//! Shared types for the dotname registry.

pub mod address;
pub mod params;
pub mod record;

pub use address::*;
pub use params::*;
pub use record::*;
