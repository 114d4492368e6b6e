use crate::domain::{ImageRecipe, Platform, port_mapping};
use crate::infra::docker_adapter::DEFAULT_ENGINE;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "pcieviz.toml";
pub const DEFAULT_IMAGE_NAME: &str = "pcie-visualization-tool";
pub const DEFAULT_CONTAINER_NAME: &str = "pcie-visualization";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
pub const DEFAULT_PORT: u16 = crate::domain::recipe::DEFAULT_PORT;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub binary: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub image_name: Option<String>,
    pub context: Option<PathBuf>,
    pub dockerfile: Option<PathBuf>,
    pub fallback_platform: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    pub name: Option<String>,
    pub host_port: Option<u16>,
    pub container_port: Option<u16>,
    pub env: Option<Vec<String>>,
}

/// Values given on the command line or through `PCIEVIZ_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub context: Option<PathBuf>,
    pub engine: Option<String>,
    pub image: Option<String>,
    pub container: Option<String>,
    pub port: Option<u16>,
}

/// Contents of `pcieviz.toml`. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub container: ContainerConfig,
}

impl AppConfig {
    /// Command-line layer, ready to be merged over the file.
    pub fn from_overrides(overrides: &Overrides) -> Self {
        let mut config = AppConfig::default();
        config.engine.binary = overrides.engine.clone();
        config.build.image_name = overrides.image.clone();
        config.build.context = overrides.context.clone();
        config.container.name = overrides.container.clone();
        config.container.host_port = overrides.port;
        config
    }

    /// Merges another AppConfig into self.
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(bin) = other.engine.binary {
            self.engine.binary = Some(bin);
        }
        if let Some(name) = other.build.image_name {
            self.build.image_name = Some(name);
        }
        if let Some(ctx) = other.build.context {
            self.build.context = Some(ctx);
        }
        if let Some(df) = other.build.dockerfile {
            self.build.dockerfile = Some(df);
        }
        if let Some(fp) = other.build.fallback_platform {
            self.build.fallback_platform = Some(fp);
        }
        if let Some(name) = other.container.name {
            self.container.name = Some(name);
        }
        if let Some(port) = other.container.host_port {
            self.container.host_port = Some(port);
        }
        if let Some(port) = other.container.container_port {
            self.container.container_port = Some(port);
        }
        if let Some(env) = other.container.env {
            self.container.env = Some(env);
        }
    }
}

/// Resolved parameters for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub engine: String,
    pub image_name: String,
    pub container_name: String,
    pub context_dir: PathBuf,
    pub dockerfile: PathBuf,
    pub host_port: u16,
    pub container_port: u16,
    pub env: Vec<String>,
    pub fallback_platform: Platform,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            image_name: DEFAULT_IMAGE_NAME.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            context_dir: PathBuf::from("."),
            dockerfile: PathBuf::from(DEFAULT_DOCKERFILE),
            host_port: DEFAULT_PORT,
            container_port: DEFAULT_PORT,
            env: Vec::new(),
            fallback_platform: Platform::LinuxAmd64,
        }
    }
}

impl LaunchConfig {
    /// Builds the launch parameters from defaults overlaid with `config`.
    pub fn from_app_config(config: AppConfig) -> Result<Self> {
        let defaults = Self::default();

        let fallback_platform = match config.build.fallback_platform {
            Some(raw) => raw.parse().context("invalid build.fallback_platform")?,
            None => defaults.fallback_platform,
        };

        let context_dir = config
            .build
            .context
            .map(|p| expand_path(&p))
            .unwrap_or(defaults.context_dir);

        for (key, port) in [
            ("container.host_port", config.container.host_port),
            ("container.container_port", config.container.container_port),
        ] {
            if port == Some(0) {
                bail!("{key} must be between 1 and 65535");
            }
        }

        Ok(Self {
            engine: config.engine.binary.unwrap_or(defaults.engine),
            image_name: config.build.image_name.unwrap_or(defaults.image_name),
            container_name: config.container.name.unwrap_or(defaults.container_name),
            context_dir,
            dockerfile: config.build.dockerfile.unwrap_or(defaults.dockerfile),
            host_port: config.container.host_port.unwrap_or(defaults.host_port),
            container_port: config
                .container
                .container_port
                .unwrap_or(defaults.container_port),
            env: config.container.env.unwrap_or(defaults.env),
            fallback_platform,
        })
    }

    /// Dockerfile location; relative names resolve against the build context.
    pub fn dockerfile_path(&self) -> PathBuf {
        if self.dockerfile.is_absolute() {
            self.dockerfile.clone()
        } else {
            self.context_dir.join(&self.dockerfile)
        }
    }

    pub fn port_mappings(&self) -> Vec<String> {
        vec![port_mapping(self.host_port, self.container_port)]
    }

    pub fn access_url(&self) -> String {
        format!("http://localhost:{}", self.host_port)
    }

    pub fn recipe(&self) -> ImageRecipe {
        ImageRecipe::default().with_port(self.container_port)
    }
}

pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

pub fn parse_app_config(content: &str, origin: &Path) -> Result<AppConfig> {
    toml::from_str(content).with_context(|| format!("parsing {:?}", origin))
}

/// Loads `pcieviz.toml`.
///
/// An explicitly requested file must exist; the implicit one in the build
/// context is optional. A relative `build.context` inside the file is taken
/// relative to the file's directory.
pub fn load_app_config(explicit: Option<&Path>, context_dir: &Path) -> Result<AppConfig> {
    let (path, required) = match explicit {
        Some(p) => (expand_path(p), true),
        None => (context_dir.join(DEFAULT_CONFIG_FILE_NAME), false),
    };

    if !path.exists() {
        if required {
            bail!("config file {:?} not found", path);
        }
        debug!("no config file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    info!("Loading config from {:?}", path);
    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    let mut config = parse_app_config(&content, &path)?;

    if let Some(ctx) = config.build.context.take() {
        let ctx = expand_path(&ctx);
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.build.context = Some(if ctx.is_relative() {
            base.join(ctx)
        } else {
            ctx
        });
    }

    Ok(config)
}

/// Layers defaults, `pcieviz.toml` and `overrides`, later ones winning.
///
/// `overrides.context` also decides where the implicit config file is looked up.
pub fn resolve_launch_config(overrides: &Overrides) -> Result<LaunchConfig> {
    let context_dir = overrides
        .context
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut app_config = load_app_config(overrides.config_file.as_deref(), &context_dir)?;
    app_config.merge(AppConfig::from_overrides(overrides));

    LaunchConfig::from_app_config(app_config)
}

/// Writes the rendered Dockerfile into the build context.
///
/// Returns `false` when a Dockerfile is already there and `force` is not set.
pub fn install_dockerfile(config: &LaunchConfig, force: bool) -> Result<bool> {
    let target = config.dockerfile_path();

    if target.exists() && !force {
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
    }

    fs::write(&target, config.recipe().render())
        .with_context(|| format!("writing {:?}", target))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_constants() {
        let cfg = LaunchConfig::default();

        assert_eq!(cfg.engine, "docker");
        assert_eq!(cfg.image_name, "pcie-visualization-tool");
        assert_eq!(cfg.container_name, "pcie-visualization");
        assert_eq!(cfg.port_mappings(), vec!["7860:7860".to_string()]);
        assert_eq!(cfg.access_url(), "http://localhost:7860");
        assert_eq!(cfg.fallback_platform, Platform::LinuxAmd64);
    }

    #[test]
    fn test_parse_partial_file() {
        let toml = r#"
[container]
host_port = 8080

[build]
fallback_platform = "linux/arm64"
"#;
        let app = parse_app_config(toml, Path::new("pcieviz.toml")).unwrap();
        let cfg = LaunchConfig::from_app_config(app).unwrap();

        assert_eq!(cfg.host_port, 8080);
        assert_eq!(cfg.container_port, 7860);
        assert_eq!(cfg.port_mappings(), vec!["8080:7860".to_string()]);
        assert_eq!(cfg.fallback_platform, Platform::LinuxArm64);
        assert_eq!(cfg.container_name, "pcie-visualization");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let toml = "[container]\nnmae = \"typo\"\n";
        assert!(parse_app_config(toml, Path::new("pcieviz.toml")).is_err());
    }

    #[test]
    fn test_invalid_fallback_platform() {
        let toml = "[build]\nfallback_platform = \"s390x\"\n";
        let app = parse_app_config(toml, Path::new("pcieviz.toml")).unwrap();
        assert!(LaunchConfig::from_app_config(app).is_err());
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let app = parse_app_config("[container]\nhost_port = 0\n", Path::new("pcieviz.toml")).unwrap();
        let err = LaunchConfig::from_app_config(app).unwrap_err();
        assert!(err.to_string().contains("container.host_port"));
    }

    #[test]
    fn test_relative_context_follows_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("pcieviz.toml");
        fs::write(&config_file, "[build]\ncontext = \"app\"\n").unwrap();

        let app = load_app_config(Some(&config_file), Path::new("/unrelated")).unwrap();
        assert_eq!(app.build.context, Some(dir.path().join("app")));

        fs::write(&config_file, "[build]\ncontext = \"/srv/tool\"\n").unwrap();
        let app = load_app_config(Some(&config_file), Path::new("/unrelated")).unwrap();
        assert_eq!(app.build.context, Some(PathBuf::from("/srv/tool")));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = parse_app_config(
            "[engine]\nbinary = \"podman\"\n[container]\nname = \"a\"\n",
            Path::new("a"),
        )
        .unwrap();
        let other = parse_app_config("[container]\nname = \"b\"\n", Path::new("b")).unwrap();

        base.merge(other);

        assert_eq!(base.engine.binary.as_deref(), Some("podman"));
        assert_eq!(base.container.name.as_deref(), Some("b"));
    }

    #[test]
    fn test_dockerfile_path_relative_to_context() {
        let cfg = LaunchConfig {
            context_dir: PathBuf::from("/srv/tool"),
            ..LaunchConfig::default()
        };
        assert_eq!(cfg.dockerfile_path(), PathBuf::from("/srv/tool/Dockerfile"));

        let cfg = LaunchConfig {
            dockerfile: PathBuf::from("/elsewhere/Dockerfile"),
            ..cfg
        };
        assert_eq!(cfg.dockerfile_path(), PathBuf::from("/elsewhere/Dockerfile"));
    }

    #[test]
    fn test_missing_implicit_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let app = load_app_config(None, dir.path()).unwrap();
        assert!(app.container.name.is_none());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_app_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_install_dockerfile_respects_existing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LaunchConfig {
            context_dir: dir.path().to_path_buf(),
            ..LaunchConfig::default()
        };

        assert!(install_dockerfile(&cfg, false).unwrap());
        fs::write(cfg.dockerfile_path(), "FROM scratch\n").unwrap();

        assert!(!install_dockerfile(&cfg, false).unwrap());
        assert_eq!(fs::read_to_string(cfg.dockerfile_path()).unwrap(), "FROM scratch\n");

        assert!(install_dockerfile(&cfg, true).unwrap());
        assert!(
            fs::read_to_string(cfg.dockerfile_path())
                .unwrap()
                .contains("EXPOSE 7860")
        );
    }
}
