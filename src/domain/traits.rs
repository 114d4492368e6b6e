use super::{BuildRequest, Container, ContainerSpec};
use anyhow::Result;
use std::fmt::Debug;

/// Trait for container engine operations
pub trait ContainerEngine: Send + Sync + Debug {
    /// Name of the engine executable (e.g. `docker`)
    fn binary(&self) -> &str;

    /// Check if the engine executable is resolvable on PATH
    fn is_available(&self) -> bool;

    /// Build an image
    fn build_image(&self, request: &BuildRequest) -> Result<()>;

    /// Get the current state of a container
    fn get_container(&self, name: &str) -> Result<Container>;

    /// Force-remove a container, running or not
    fn remove_container(&self, name: &str) -> Result<()>;

    /// Start a new container from a spec
    fn run_container(&self, spec: &ContainerSpec) -> Result<()>;

    /// Stop a running container
    fn stop_container(&self, name: &str) -> Result<()>;

    /// Stream container logs to the terminal
    fn show_logs(&self, name: &str, follow: bool) -> Result<()>;
}
