pub mod controller;
pub mod doctor;
pub mod runtime;
pub mod setup;

pub use controller::Controller;
