//! Command implementations for the jobscout CLI

mod detect;
mod portals;

pub use detect::*;
pub use portals::*;
