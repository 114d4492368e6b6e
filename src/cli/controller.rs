use crate::domain::{ContainerEngine, ContainerState, HostArch};
use crate::infra::{DockerAdapter, LaunchConfig};
use crate::services::{ContainerService, ImageService, LaunchReport, Launcher};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Wires the services for one invocation against a configured engine.
pub struct Controller {
    config: LaunchConfig,
    container_service: Arc<ContainerService>,
    launcher: Launcher,
}

impl Controller {
    pub fn new(config: LaunchConfig) -> Self {
        let engine = Arc::new(DockerAdapter::new(config.engine.clone()));
        Self::with_engine(config, engine)
    }

    pub fn with_engine(config: LaunchConfig, engine: Arc<dyn ContainerEngine>) -> Self {
        let container_service = Arc::new(ContainerService::new(engine.clone()));
        let image_service = Arc::new(ImageService::new(engine));
        let launcher = Launcher::new(container_service.clone(), image_service);

        Self {
            config,
            container_service,
            launcher,
        }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn up(&self, arch: &HostArch) -> Result<LaunchReport> {
        let report = self.launcher.launch(&self.config, arch)?;
        info!("Container {} started", report.container);
        Ok(report)
    }

    pub fn stop(&self) -> Result<()> {
        self.container_service.stop(&self.config.container_name)
    }

    pub fn down(&self) -> Result<()> {
        self.container_service.remove(&self.config.container_name)
    }

    pub fn logs(&self, follow: bool) -> Result<()> {
        self.container_service
            .logs(&self.config.container_name, follow)
    }

    pub fn status(&self) -> Result<ContainerState> {
        Ok(self
            .container_service
            .get_status(&self.config.container_name)?
            .state)
    }

    pub fn engine_available(&self) -> bool {
        self.container_service.is_engine_available()
    }
}
