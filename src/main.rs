use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use pcieviz::cli::{Controller, doctor, runtime, setup};
use pcieviz::domain::HostArch;
use pcieviz::infra::config::{Overrides, resolve_launch_config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pcieviz",
    about = "Builds and runs the PCIe bandwidth visualization container"
)]
struct Cli {
    /// Config file (default: pcieviz.toml inside the build context, if present)
    #[arg(long, env = "PCIEVIZ_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Build context directory holding the Dockerfile and the application
    #[arg(long, env = "PCIEVIZ_CONTEXT", global = true)]
    context: Option<PathBuf>,

    /// Container engine executable
    #[arg(long, env = "PCIEVIZ_ENGINE", global = true)]
    engine: Option<String>,

    /// Image tag to build
    #[arg(long, env = "PCIEVIZ_IMAGE", global = true)]
    image: Option<String>,

    /// Container name
    #[arg(long, env = "PCIEVIZ_CONTAINER", global = true)]
    container: Option<String>,

    /// Host port published to the container
    #[arg(
        long,
        env = "PCIEVIZ_PORT",
        global = true,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    port: Option<u16>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image and (re)start the container
    Up,
    /// Stop the container
    Stop,
    /// Remove the container
    Down,
    /// Show container logs
    Logs {
        /// Keep streaming
        #[arg(short, long)]
        follow: bool,
    },
    /// Show container state
    Status,
    /// Write the Dockerfile into the build context
    Init {
        /// Overwrite an existing Dockerfile
        #[arg(long)]
        force: bool,
    },
    /// Check engine and build context
    Doctor,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            context: self.context.clone(),
            engine: self.engine.clone(),
            image: self.image.clone(),
            container: self.container.clone(),
            port: self.port,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = std::env::var("PCIEVIZ_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_launch_config(&cli.overrides())?;

    let controller = Controller::new(config);

    match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => runtime::up(&controller, &HostArch::detect()),
        Commands::Stop => runtime::stop(&controller),
        Commands::Down => runtime::down(&controller),
        Commands::Logs { follow } => runtime::logs(&controller, follow),
        Commands::Status => runtime::status(&controller),
        Commands::Init { force } => setup::init(controller.config(), force),
        Commands::Doctor => doctor::run(&controller, &HostArch::detect()),
    }
}
