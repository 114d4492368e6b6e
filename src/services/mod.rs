mod container_service;
mod image_service;
mod launcher;

pub use container_service::ContainerService;
pub use image_service::{BuildFailure, BuildOutcome, ImageService};
pub use launcher::{LaunchError, LaunchReport, Launcher};
