pub mod badge;
pub mod cli;
pub mod confidence;
pub mod config;
pub mod detector;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generic;
pub mod job;
pub mod page;
pub mod portals;

pub use detector::{DetectionResult, Detector, PortalMatcher};
pub use error::{JobScoutError, Result};
pub use job::JobData;
pub use page::Page;
