//! Department Timetable Core Library
//!
//! This library renders department timetables as text, CSV, HTML or PDF and
//! shares them through whatever platform capabilities are available,
//! falling back to a plain-text share when a richer path is missing or fails.

pub mod capability;
pub mod catalog;
pub mod error;
pub mod export;
pub mod permission;
pub mod render;
pub mod types;

// Re-export core types and error handling
pub use capability::{Capabilities, CapabilitiesBuilder, Capability, CapabilitySet};
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        capability::*, catalog::*, export::*, permission::*, render::*, types::*,
    };
}
