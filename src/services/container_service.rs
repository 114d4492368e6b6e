use crate::domain::{Container, ContainerEngine, ContainerSpec, ContainerState};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ContainerService {
    engine: Arc<dyn ContainerEngine>,
}

impl ContainerService {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    pub fn is_engine_available(&self) -> bool {
        self.engine.is_available()
    }

    pub fn engine_binary(&self) -> &str {
        self.engine.binary()
    }

    pub fn get_status(&self, name: &str) -> Result<Container> {
        self.engine.get_container(name)
    }

    /// Force-removes `name` if it exists. Returns whether something was removed.
    pub fn remove_if_exists(&self, name: &str) -> Result<bool> {
        let container = self.engine.get_container(name)?;

        if !container.state.exists() {
            return Ok(false);
        }

        info!("Removing existing container {name}...");
        self.engine.remove_container(name)?;
        Ok(true)
    }

    pub fn run(&self, spec: &ContainerSpec) -> Result<()> {
        self.engine.run_container(spec)
    }

    pub fn stop(&self, name: &str) -> Result<()> {
        let container = self.engine.get_container(name)?;

        match container.state {
            ContainerState::Running => {
                info!("Stopping {name}...");
                self.engine.stop_container(name)
            }
            ContainerState::Stopped | ContainerState::NotCreated => {
                warn!("{name} is already stopped or was never created");
                Ok(())
            }
        }
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        if !self.remove_if_exists(name)? {
            warn!("{name} does not exist, nothing to remove");
        }
        Ok(())
    }

    pub fn logs(&self, name: &str, follow: bool) -> Result<()> {
        let container = self.engine.get_container(name)?;

        if !container.state.exists() {
            bail!("Container {name} does not exist. Run 'pcieviz up' first.");
        }

        self.engine.show_logs(name, follow)
    }
}
