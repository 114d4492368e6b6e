pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    BuildRequest, Container, ContainerEngine, ContainerSpec, ContainerState, HostArch,
    ImageRecipe, Platform,
};
pub use infra::{DockerAdapter, LaunchConfig};
pub use services::{ContainerService, ImageService, LaunchError, LaunchReport, Launcher};
