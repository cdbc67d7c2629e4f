//! Appointment scheduling: lifecycle transitions and teleconference links.

mod lifecycle;
mod teleconference;

pub use lifecycle::*;
pub use teleconference::*;
