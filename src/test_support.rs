use crate::domain::{BuildRequest, Container, ContainerEngine, ContainerSpec, ContainerState};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct MockContainer {
    pub name: String,
    pub state: ContainerState,
    pub image: Option<String>,
    pub ports: Vec<String>,
}

/// In-memory engine that records every call as `"op:arg"`.
#[derive(Debug)]
pub struct MockEngine {
    containers: RwLock<HashMap<String, MockContainer>>,
    commands: RwLock<Vec<String>>,
    builds: RwLock<Vec<BuildRequest>>,
    /// operation -> remaining failures (`None` fails forever)
    fail_on: RwLock<HashMap<String, Option<usize>>>,
    available: RwLock<bool>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            commands: RwLock::new(Vec::new()),
            builds: RwLock::new(Vec::new()),
            fail_on: RwLock::new(HashMap::new()),
            available: RwLock::new(true),
        }
    }

    pub fn add_container(&self, name: &str, state: ContainerState) {
        self.containers.write().unwrap().insert(
            name.to_string(),
            MockContainer {
                name: name.to_string(),
                state,
                image: None,
                ports: Vec::new(),
            },
        );
    }

    pub fn set_available(&self, available: bool) {
        *self.available.write().unwrap() = available;
    }

    /// Makes `operation` fail on every call.
    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on
            .write()
            .unwrap()
            .insert(operation.to_string(), None);
    }

    /// Makes `operation` fail only on its next `times` calls.
    pub fn set_fail_times(&self, operation: &str, times: usize) {
        self.fail_on
            .write()
            .unwrap()
            .insert(operation.to_string(), Some(times));
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn get_builds(&self) -> Vec<BuildRequest> {
        self.builds.read().unwrap().clone()
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers.read().unwrap().contains_key(name)
    }

    pub fn get_state(&self, name: &str) -> Option<ContainerState> {
        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.state.clone())
    }

    pub fn get_container_ports(&self, name: &str) -> Vec<String> {
        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.ports.clone())
            .unwrap_or_default()
    }

    pub fn container_count(&self) -> usize {
        self.containers.read().unwrap().len()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        let mut fail_on = self.fail_on.write().unwrap();

        match fail_on.get_mut(operation) {
            None => Ok(()),
            Some(None) => bail!("Mock failure on: {}", operation),
            Some(Some(0)) => Ok(()),
            Some(Some(remaining)) => {
                *remaining -= 1;
                bail!("Mock failure on: {}", operation)
            }
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for MockEngine {
    fn binary(&self) -> &str {
        "mock-docker"
    }

    fn is_available(&self) -> bool {
        self.record_command("is_available");
        *self.available.read().unwrap()
    }

    fn build_image(&self, request: &BuildRequest) -> Result<()> {
        self.record_command(&format!("build_image:{}", request.tag));
        self.builds.write().unwrap().push(request.clone());
        self.check_fail("build_image")
    }

    fn get_container(&self, name: &str) -> Result<Container> {
        self.record_command(&format!("get_container:{}", name));
        self.check_fail("get_container")?;

        let state = self
            .get_state(name)
            .unwrap_or(ContainerState::NotCreated);

        Ok(Container::new(name.to_string(), state))
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("remove:{}", name));
        self.check_fail("remove")?;

        self.containers.write().unwrap().remove(name);
        Ok(())
    }

    fn run_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.record_command(&format!("run:{}", spec.name));
        self.check_fail("run")?;

        let mut containers = self.containers.write().unwrap();
        if containers.contains_key(spec.name) {
            bail!("container name {} is already in use", spec.name);
        }

        containers.insert(
            spec.name.to_string(),
            MockContainer {
                name: spec.name.to_string(),
                state: if spec.detach {
                    ContainerState::Running
                } else {
                    ContainerState::Stopped
                },
                image: Some(spec.image.to_string()),
                ports: spec.ports.to_vec(),
            },
        );
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("stop:{}", name));
        self.check_fail("stop")?;

        if let Some(container) = self.containers.write().unwrap().get_mut(name) {
            container.state = ContainerState::Stopped;
        }
        Ok(())
    }

    fn show_logs(&self, name: &str, follow: bool) -> Result<()> {
        if follow {
            self.record_command(&format!("logs:{}:follow", name));
        } else {
            self.record_command(&format!("logs:{}", name));
        }
        self.check_fail("logs")
    }
}
