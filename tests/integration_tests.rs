use anyhow::Result;
use pcieviz::cli::Controller;
use pcieviz::domain::HostArch;
use pcieviz::infra::LaunchConfig;
use pcieviz::infra::config::{Overrides, install_dockerfile, load_app_config, resolve_launch_config};
use pcieviz::test_support::MockEngine;
use std::fs;
use std::sync::Arc;

#[test]
fn test_config_file_drives_launch() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let context = temp_dir.path();

    fs::write(
        context.join("pcieviz.toml"),
        r#"
[engine]
binary = "podman"

[build]
image_name = "pcie-tool:test"

[container]
name = "pcie-test"
host_port = 9000
env = ["GRADIO_ANALYTICS_ENABLED=False"]
"#,
    )?;

    let app_config = load_app_config(None, context)?;
    let mut config = LaunchConfig::from_app_config(app_config)?;
    config.context_dir = context.to_path_buf();

    assert_eq!(config.engine, "podman");
    assert_eq!(config.access_url(), "http://localhost:9000");

    let mock = Arc::new(MockEngine::new());
    let report = Controller::with_engine(config, mock.clone()).up(&HostArch::Amd64)?;

    assert_eq!(report.image, "pcie-tool:test");
    assert_eq!(report.url, "http://localhost:9000");
    assert_eq!(mock.get_container_ports("pcie-test"), vec!["9000:7860".to_string()]);
    assert_eq!(mock.get_builds()[0].dockerfile, context.join("Dockerfile"));

    Ok(())
}

#[test]
fn test_init_writes_recipe_for_container_port() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let config = LaunchConfig {
        context_dir: temp_dir.path().join("app"),
        container_port: 8000,
        ..LaunchConfig::default()
    };

    assert!(install_dockerfile(&config, false)?);

    let dockerfile = fs::read_to_string(config.dockerfile_path())?;
    assert!(dockerfile.contains("EXPOSE 8000"));
    assert!(dockerfile.contains("pip install --no-cache-dir gradio numpy pandas plotly"));
    assert!(dockerfile.contains("ENV PYTHONUNBUFFERED=1"));

    Ok(())
}

#[test]
fn test_command_line_overrides_beat_config_file() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    fs::create_dir_all(&first)?;
    fs::create_dir_all(&second)?;

    fs::write(
        first.join("pcieviz.toml"),
        "[container]\nname = \"from-first\"\nhost_port = 8080\n",
    )?;
    fs::write(
        second.join("pcieviz.toml"),
        "[container]\nname = \"from-second\"\nhost_port = 8080\n",
    )?;

    // --context decides which pcieviz.toml is read
    let config = resolve_launch_config(&Overrides {
        context: Some(second.clone()),
        ..Overrides::default()
    })?;
    assert_eq!(config.container_name, "from-second");
    assert_eq!(config.host_port, 8080);
    assert_eq!(config.context_dir, second);

    // --port wins over the file, untouched keys keep the file's value
    let config = resolve_launch_config(&Overrides {
        context: Some(first.clone()),
        port: Some(9000),
        ..Overrides::default()
    })?;
    assert_eq!(config.container_name, "from-first");
    assert_eq!(config.host_port, 9000);
    assert_eq!(config.access_url(), "http://localhost:9000");

    // an explicit --config beats the one in the context
    let config = resolve_launch_config(&Overrides {
        config_file: Some(second.join("pcieviz.toml")),
        context: Some(first.clone()),
        container: Some("from-flag".into()),
        ..Overrides::default()
    })?;
    assert_eq!(config.container_name, "from-flag");
    assert_eq!(config.context_dir, first);

    Ok(())
}

#[test]
fn test_defaults_without_any_file() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    let config = resolve_launch_config(&Overrides {
        context: Some(temp_dir.path().to_path_buf()),
        ..Overrides::default()
    })?;

    assert_eq!(
        config,
        LaunchConfig {
            context_dir: temp_dir.path().to_path_buf(),
            ..LaunchConfig::default()
        }
    );

    Ok(())
}
