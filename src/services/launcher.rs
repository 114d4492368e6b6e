use crate::domain::{BuildRequest, ContainerSpec, HostArch, Platform};
use crate::infra::LaunchConfig;
use crate::services::{BuildOutcome, ContainerService, ImageService};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Terminal failures of a launch. Each one maps to exit status 1.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Docker is not installed: `{0}` was not found on PATH. Install it and try again.")]
    EngineUnavailable(String),

    #[error("Failed to build image {image} (also retried with --platform {fallback}): {reason:#}")]
    BuildFailed {
        image: String,
        fallback: Platform,
        reason: anyhow::Error,
    },

    #[error("Failed to start container {container}: {reason:#}")]
    RunFailed {
        container: String,
        reason: anyhow::Error,
    },
}

/// What a successful launch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub image: String,
    pub container: String,
    pub platform: Option<Platform>,
    pub used_fallback: bool,
    pub replaced_existing: bool,
    pub url: String,
}

/// Runs the build-and-run sequence: preflight, build (with one fallback),
/// replace any existing container, start a new one.
pub struct Launcher {
    container_service: Arc<ContainerService>,
    image_service: Arc<ImageService>,
}

impl Launcher {
    pub fn new(container_service: Arc<ContainerService>, image_service: Arc<ImageService>) -> Self {
        Self {
            container_service,
            image_service,
        }
    }

    pub fn preflight(&self) -> Result<()> {
        if !self.container_service.is_engine_available() {
            return Err(LaunchError::EngineUnavailable(
                self.container_service.engine_binary().to_string(),
            )
            .into());
        }
        debug!("{} found on PATH", self.container_service.engine_binary());
        Ok(())
    }

    pub fn build_with_fallback(
        &self,
        config: &LaunchConfig,
        arch: &HostArch,
    ) -> Result<BuildOutcome> {
        let request = BuildRequest {
            tag: config.image_name.clone(),
            dockerfile: config.dockerfile_path(),
            context_dir: config.context_dir.clone(),
            platform: arch.preferred_platform(),
        };

        self.image_service
            .build_with_fallback(&request, config.fallback_platform)
            .map_err(|failure| {
                debug!("primary build error: {:#}", failure.primary);
                LaunchError::BuildFailed {
                    image: config.image_name.clone(),
                    fallback: config.fallback_platform,
                    reason: failure.fallback,
                }
                .into()
            })
    }

    /// A failed removal is only logged; a leftover container makes `start` fail instead.
    pub fn replace_existing(&self, config: &LaunchConfig) -> Result<bool> {
        match self
            .container_service
            .remove_if_exists(&config.container_name)
        {
            Ok(removed) => Ok(removed),
            Err(e) => {
                warn!("Could not remove {}: {e:#}", config.container_name);
                Ok(false)
            }
        }
    }

    pub fn start(&self, config: &LaunchConfig) -> Result<()> {
        let ports = config.port_mappings();
        let spec = ContainerSpec {
            name: &config.container_name,
            image: &config.image_name,
            ports: &ports,
            env: &config.env,
            detach: true,
        };

        info!(
            "Starting container {} ({})...",
            config.container_name,
            ports.join(", ")
        );

        self.container_service
            .run(&spec)
            .map_err(|reason| {
                LaunchError::RunFailed {
                    container: config.container_name.clone(),
                    reason,
                }
                .into()
            })
    }

    pub fn launch(&self, config: &LaunchConfig, arch: &HostArch) -> Result<LaunchReport> {
        self.preflight()?;

        info!("Detected architecture: {arch}");
        let build = self.build_with_fallback(config, arch)?;

        let replaced_existing = self.replace_existing(config)?;
        self.start(config)?;

        Ok(LaunchReport {
            image: config.image_name.clone(),
            container: config.container_name.clone(),
            platform: build.platform,
            used_fallback: build.used_fallback,
            replaced_existing,
            url: config.access_url(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainerState;
    use crate::test_support::MockEngine;

    fn launcher(mock: &Arc<MockEngine>) -> Launcher {
        Launcher::new(
            Arc::new(ContainerService::new(mock.clone())),
            Arc::new(ImageService::new(mock.clone())),
        )
    }

    #[test]
    fn test_missing_engine_stops_before_build() {
        let mock = Arc::new(MockEngine::new());
        mock.set_available(false);

        let err = launcher(&mock)
            .launch(&LaunchConfig::default(), &HostArch::Amd64)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::EngineUnavailable(_))
        ));
        assert!(err.to_string().contains("Docker is not installed"));
        assert!(mock.get_builds().is_empty());
        assert!(!mock.get_commands().iter().any(|c| c.starts_with("run:")));
    }

    #[test]
    fn test_arm64_host_builds_for_arm64() {
        let mock = Arc::new(MockEngine::new());

        let report = launcher(&mock)
            .launch(&LaunchConfig::default(), &HostArch::Arm64)
            .unwrap();

        assert_eq!(report.platform, Some(Platform::LinuxArm64));
        assert_eq!(mock.get_builds()[0].platform, Some(Platform::LinuxArm64));
    }

    #[test]
    fn test_build_step_reports_fallback_outcome() {
        let mock = Arc::new(MockEngine::new());
        mock.set_fail_times("build_image", 1);

        let outcome = launcher(&mock)
            .build_with_fallback(&LaunchConfig::default(), &HostArch::Arm64)
            .unwrap();

        assert_eq!(
            outcome,
            BuildOutcome {
                platform: Some(Platform::LinuxAmd64),
                used_fallback: true
            }
        );
    }

    #[test]
    fn test_run_failure_is_typed() {
        let mock = Arc::new(MockEngine::new());
        mock.set_fail_on("run");

        let err = launcher(&mock)
            .launch(&LaunchConfig::default(), &HostArch::Amd64)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::RunFailed { .. })
        ));
        assert_eq!(mock.get_state("pcie-visualization"), None);
    }

    #[test]
    fn test_replaces_running_container() {
        let mock = Arc::new(MockEngine::new());
        mock.add_container("pcie-visualization", ContainerState::Running);

        let report = launcher(&mock)
            .launch(&LaunchConfig::default(), &HostArch::Amd64)
            .unwrap();

        assert!(report.replaced_existing);
        let commands = mock.get_commands();
        let remove = commands
            .iter()
            .position(|c| c == "remove:pcie-visualization")
            .unwrap();
        let run = commands
            .iter()
            .position(|c| c == "run:pcie-visualization")
            .unwrap();
        assert!(remove < run);
    }
}
