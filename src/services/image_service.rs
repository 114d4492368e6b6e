use crate::domain::{BuildRequest, ContainerEngine, Platform};
use anyhow::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Image builds against the container engine
pub struct ImageService {
    engine: Arc<dyn ContainerEngine>,
}

/// Result of a build that eventually succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub platform: Option<Platform>,
    pub used_fallback: bool,
}

/// Both attempts failed.
#[derive(Debug)]
pub struct BuildFailure {
    pub primary: Error,
    pub fallback: Error,
}

impl ImageService {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    pub fn build_image(&self, request: &BuildRequest) -> Result<()> {
        self.engine.build_image(request)
    }

    /// Builds `request`; on failure retries exactly once targeting `fallback`.
    pub fn build_with_fallback(
        &self,
        request: &BuildRequest,
        fallback: Platform,
    ) -> std::result::Result<BuildOutcome, BuildFailure> {
        match request.platform {
            Some(platform) => info!("Building image {} for {platform}...", request.tag),
            None => info!("Building image {}...", request.tag),
        }

        let primary = match self.engine.build_image(request) {
            Ok(()) => {
                return Ok(BuildOutcome {
                    platform: request.platform,
                    used_fallback: false,
                });
            }
            Err(e) => e,
        };

        warn!("Build failed: {primary:#}");
        warn!("Retrying build with --platform {fallback}...");

        match self.engine.build_image(&request.with_platform(fallback)) {
            Ok(()) => Ok(BuildOutcome {
                platform: Some(fallback),
                used_fallback: true,
            }),
            Err(fallback) => Err(BuildFailure { primary, fallback }),
        }
    }
}
