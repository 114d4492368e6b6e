use super::Controller;
use crate::domain::{ContainerState, HostArch};
use crate::services::LaunchReport;
use anyhow::Result;

pub fn up(controller: &Controller, arch: &HostArch) -> Result<()> {
    println!("🏗️  Building and starting {}...", controller.config().image_name);
    let report = controller.up(arch)?;
    println!("{}", success_message(&report, &controller.config().engine));
    Ok(())
}

pub fn stop(controller: &Controller) -> Result<()> {
    controller.stop()?;
    println!("✅ {} stopped", controller.config().container_name);
    Ok(())
}

pub fn down(controller: &Controller) -> Result<()> {
    controller.down()?;
    println!("✅ {} removed", controller.config().container_name);
    Ok(())
}

pub fn logs(controller: &Controller, follow: bool) -> Result<()> {
    controller.logs(follow)
}

pub fn status(controller: &Controller) -> Result<()> {
    let name = &controller.config().container_name;
    let line = match controller.status()? {
        ContainerState::Running => format!(
            "🟢 {name} is running at {}",
            controller.config().access_url()
        ),
        ContainerState::Stopped => format!("🔴 {name} is stopped"),
        ContainerState::NotCreated => format!("⚪ {name} does not exist (run 'pcieviz up')"),
    };
    println!("{line}");
    Ok(())
}

/// Final message after a successful launch: access URL plus stop/logs hints.
pub fn success_message(report: &LaunchReport, engine: &str) -> String {
    let mut lines = vec![format!("✅ {} is running", report.container)];

    if report.used_fallback {
        if let Some(platform) = report.platform {
            lines.push(format!("ℹ️  Image was built for {platform} (fallback)"));
        }
    }
    if report.replaced_existing {
        lines.push("ℹ️  Previous container was replaced".to_string());
    }

    lines.push(format!("🌐 Open {} in your browser", report.url));
    lines.push(format!("   Stop:  {engine} stop {}", report.container));
    lines.push(format!("   Logs:  {engine} logs {}", report.container));

    lines.join("\n")
}
