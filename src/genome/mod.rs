//! Configurations and the parameter space they are built over
//!
//! This module provides the `Configuration` chromosome, its fitness state,
//! and the named integer parameters it encodes.

pub mod bounds;
pub mod configuration;
pub mod parameters;

pub mod prelude {
    pub use super::bounds::*;
    pub use super::configuration::*;
    pub use super::parameters::*;
}
