use crate::domain::{BuildRequest, Container, ContainerEngine, ContainerSpec, ContainerState};
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

pub const DEFAULT_ENGINE: &str = "docker";

/// Drives a Docker-compatible CLI (`docker`, `podman`, ...).
#[derive(Debug, Clone)]
pub struct DockerAdapter {
    binary: String,
}

impl DockerAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn engine<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let status = self.engine_status(args, context)?;
        self.ensure_success(status, context)
    }

    fn engine_status<I, S>(&self, args: I, context: &str) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|item| item.as_ref().to_os_string())
            .collect();
        debug!("{} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(&args)
            .status()
            .with_context(|| context.to_string())
    }

    fn ensure_success(&self, status: ExitStatus, context: &str) -> Result<()> {
        if status.success() {
            return Ok(());
        }

        bail!("{} returned status {:?} ({context})", self.binary, status.code())
    }

    fn inspect_state(&self, name: &str) -> Result<ContainerState> {
        let output = Command::new(&self.binary)
            .args([
                "container",
                "inspect",
                name,
                "--format",
                "{{.State.Running}}",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("checking state of container {name}"))?;

        parse_inspect(
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
        .with_context(|| format!("{} container inspect {name}", self.binary))
    }
}

impl Default for DockerAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl ContainerEngine for DockerAdapter {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn is_available(&self) -> bool {
        find_in_path(&self.binary).is_some()
    }

    fn build_image(&self, request: &BuildRequest) -> Result<()> {
        self.engine(
            build_args(request),
            &format!(
                "building image {} from {:?}",
                request.tag, request.dockerfile
            ),
        )
    }

    fn get_container(&self, name: &str) -> Result<Container> {
        let state = self.inspect_state(name)?;
        Ok(Container::new(name.to_string(), state))
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.engine(["rm", "-f", name], &format!("removing container {name}"))
    }

    fn run_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.engine(
            run_args(spec),
            &format!("starting container {} from {}", spec.name, spec.image),
        )
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.engine(["stop", name], &format!("stopping container {name}"))
    }

    fn show_logs(&self, name: &str, follow: bool) -> Result<()> {
        let mut args = vec!["logs"];
        if follow {
            args.push("-f");
        }
        args.push(name);

        self.engine(args, &format!("reading logs of {name}"))
    }
}

/// Maps the outcome of `container inspect --format {{.State.Running}}` to a state.
///
/// Only a "no such container/object" failure means the container is absent; any
/// other failure (daemon unreachable, permission denied) is an error.
pub fn parse_inspect(success: bool, stdout: &str, stderr: &str) -> Result<ContainerState> {
    if success {
        return Ok(if stdout.trim() == "true" {
            ContainerState::Running
        } else {
            ContainerState::Stopped
        });
    }

    let lowered = stderr.to_lowercase();
    if lowered.contains("no such container") || lowered.contains("no such object") {
        return Ok(ContainerState::NotCreated);
    }

    match stderr.trim() {
        "" => bail!("engine exited with an error and no message"),
        message => bail!("{message}"),
    }
}

/// Arguments for `<engine> build`.
pub fn build_args(request: &BuildRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["build".into()];

    if let Some(platform) = request.platform {
        args.push("--platform".into());
        args.push(platform.as_flag().into());
    }

    args.push("-t".into());
    args.push(request.tag.clone().into());
    args.push("-f".into());
    args.push(request.dockerfile.as_os_str().to_os_string());
    args.push(request.context_dir.as_os_str().to_os_string());

    args
}

/// Arguments for `<engine> run`.
pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args: Vec<String> = vec!["run".into()];

    if spec.detach {
        args.push("-d".into());
    }

    args.push("--name".into());
    args.push(spec.name.into());

    for port in spec.ports {
        args.push("-p".into());
        args.push(port.clone());
    }

    for env in spec.env {
        args.push("-e".into());
        args.push(env.clone());
    }

    args.push(spec.image.into());

    args
}

/// Resolves an executable the way a shell's `command -v` would.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
