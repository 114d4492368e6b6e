//! The container recipe for the visualization tool, kept as data so the
//! Dockerfile written by `init` and the port the launcher publishes cannot drift apart.

pub const DEFAULT_BASE_IMAGE: &str = "python:3.10-slim";
pub const DEFAULT_WORKDIR: &str = "/app";
pub const DEFAULT_PACKAGES: [&str; 4] = ["gradio", "numpy", "pandas", "plotly"];
pub const DEFAULT_ENTRYPOINT: [&str; 2] = ["python", "pcie_bw_gradio_ui.py"];
pub const DEFAULT_PORT: u16 = 7860;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecipe {
    pub base_image: String,
    pub workdir: String,
    pub packages: Vec<String>,
    pub exposed_port: u16,
    pub env: Vec<(String, String)>,
    pub command: Vec<String>,
}

impl Default for ImageRecipe {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            workdir: DEFAULT_WORKDIR.to_string(),
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            exposed_port: DEFAULT_PORT,
            env: vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())],
            command: DEFAULT_ENTRYPOINT.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ImageRecipe {
    pub fn with_port(mut self, port: u16) -> Self {
        self.exposed_port = port;
        self
    }

    /// Renders the Dockerfile text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("FROM {}\n\n", self.base_image));
        out.push_str(&format!("WORKDIR {}\n\n", self.workdir));

        if !self.packages.is_empty() {
            out.push_str(&format!(
                "RUN pip install --no-cache-dir {}\n\n",
                self.packages.join(" ")
            ));
        }

        out.push_str(&format!("COPY . {}\n\n", self.workdir));
        out.push_str(&format!("EXPOSE {}\n\n", self.exposed_port));

        for (key, value) in &self.env {
            out.push_str(&format!("ENV {key}={value}\n"));
        }
        if !self.env.is_empty() {
            out.push('\n');
        }

        let quoted: Vec<String> = self.command.iter().map(|c| format!("\"{c}\"")).collect();
        out.push_str(&format!("CMD [{}]\n", quoted.join(", ")));

        out
    }
}
