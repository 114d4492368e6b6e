use super::Platform;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    NotCreated,
}

impl ContainerState {
    pub fn exists(&self) -> bool {
        !matches!(self, Self::NotCreated)
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    pub state: ContainerState,
}

impl Container {
    pub fn new(name: String, state: ContainerState) -> Self {
        Self { name, state }
    }
}

/// Everything needed to start a container with `run`.
#[derive(Debug, Clone)]
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub ports: &'a [String],
    pub env: &'a [String],
    pub detach: bool,
}

/// One image build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub tag: String,
    pub dockerfile: PathBuf,
    pub context_dir: PathBuf,
    pub platform: Option<Platform>,
}

impl BuildRequest {
    /// Same build, retargeted at another platform.
    pub fn with_platform(&self, platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..self.clone()
        }
    }
}

/// Formats a `host:container` port mapping.
pub fn port_mapping(host: u16, container: u16) -> String {
    format!("{host}:{container}")
}
