//! Hierarchical Name Registry
//!
//! Resolves dotted names such as `example.name` to owner addresses. Names are
//! normalized on write, stored under a hierarchical key, and indexed by owner
//! so that both name lookups and owner listings are single prefix scans.

pub mod account;
pub mod codec;
pub mod errors;
pub mod keeper;
pub mod keys;
pub mod normalize;

pub use account::*;
pub use codec::*;
pub use errors::*;
pub use keeper::NameKeeper;
pub use keys::*;
pub use normalize::{is_valid_segment, normalize};
