use crate::infra::LaunchConfig;
use crate::infra::config::install_dockerfile;
use anyhow::Result;
use tracing::info;

pub fn init(config: &LaunchConfig, force: bool) -> Result<()> {
    let target = config.dockerfile_path();
    info!("Preparing Dockerfile at {:?}", target);

    if install_dockerfile(config, force)? {
        println!("✅ Wrote {:?}", target);
    } else {
        println!(
            "⚠️  {:?} already exists, left untouched (use --force to overwrite)",
            target
        );
    }

    Ok(())
}
