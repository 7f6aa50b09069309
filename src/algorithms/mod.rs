//! Search algorithms
//!
//! This module provides the generational controller that drives a tuning run.

pub mod generational;

pub mod prelude {
    pub use super::generational::*;
}
