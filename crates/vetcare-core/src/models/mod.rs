//! Domain models for the vetcare system.

mod appointment;
mod clinical;
mod sale;

pub use appointment::*;
pub use clinical::*;
pub use sale::*;
