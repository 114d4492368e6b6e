use super::Controller;
use crate::domain::HostArch;
use anyhow::Result;

/// One line per check; missing pieces are reported, not treated as errors.
pub fn report(controller: &Controller, arch: &HostArch) -> Vec<String> {
    let config = controller.config();
    let mut lines = Vec::new();

    if controller.engine_available() {
        lines.push(format!("✅ {} available", config.engine));
    } else {
        lines.push(format!("⚠️  {} not found on PATH", config.engine));
    }

    match arch.preferred_platform() {
        Some(platform) => lines.push(format!("✅ Architecture {arch}: building for {platform}")),
        None => lines.push(format!(
            "✅ Architecture {arch}: building without --platform (fallback {})",
            config.fallback_platform
        )),
    }

    if config.context_dir.is_dir() {
        lines.push(format!("✅ Build context: {:?}", config.context_dir));
    } else {
        lines.push(format!("⚠️  Build context missing: {:?}", config.context_dir));
    }

    let dockerfile = config.dockerfile_path();
    if dockerfile.is_file() {
        lines.push(format!("✅ Dockerfile: {:?}", dockerfile));
    } else {
        lines.push(format!(
            "⚠️  Dockerfile missing at {:?} (use 'pcieviz init')",
            dockerfile
        ));
    }

    lines
}

pub fn run(controller: &Controller, arch: &HostArch) -> Result<()> {
    println!("🔍 Checking engine and build context...");
    for line in report(controller, arch) {
        println!("{line}");
    }
    Ok(())
}
