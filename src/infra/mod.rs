pub mod config;
pub mod docker_adapter;

pub use config::LaunchConfig;
pub use docker_adapter::DockerAdapter;
