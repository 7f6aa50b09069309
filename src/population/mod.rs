//! Population management
//!
//! This module provides the sorted Population type.

#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::population::*;
}
