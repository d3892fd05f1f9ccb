use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use camweb::util::{self, Tool, ToolAvailability};
use camweb::{config, CamwebCore, Config, ServerConfig, WebAppState};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "camweb")]
#[command(author, version)]
#[command(about = "Web interface for a Raspberry Pi camera")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Data directory for config and logs (default: ~/.camweb)
    #[arg(long, global = true, env = "CAMWEB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind (overrides [server] host)
    #[arg(long, global = true, env = "CAMWEB_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides [server] port)
    #[arg(short, long, global = true, env = "CAMWEB_PORT")]
    port: Option<u16>,

    /// Directory for photos and videos (overrides [storage] recordings_dir)
    #[arg(long, global = true, env = "CAMWEB_RECORDINGS_DIR")]
    recordings_dir: Option<PathBuf>,

    /// Allow cross-origin requests from any origin
    #[arg(long, global = true)]
    cors_permissive: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,

    /// Store an explicit path for an external tool in config.toml
    SetTool {
        /// Tool name: rpicam-still, rpicam-vid or ffmpeg
        tool: String,
        /// Path to the executable
        path: String,
    },

    /// Show which external tools were found
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    util::init_data_dir(cli.data_dir.clone());
    init_logging(cli.log_stderr)?;

    match cli.command.take() {
        Some(Command::SetTool { tool, path }) => set_tool(&tool, &path),
        Some(Command::Tools) => {
            print_tools(&ToolAvailability::detect(&Config::load().tool_paths));
            Ok(())
        }
        Some(Command::Serve) | None => serve(cli).await,
    }
}

fn init_logging(to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    // Initialize logging to file (~/.camweb/logs/camweb.log)
    fs::create_dir_all(util::logs_dir())
        .with_context(|| format!("creating {}", util::logs_dir().display()))?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    Ok(())
}

async fn serve(cli: Cli) -> Result<()> {
    let mut config = Config::load();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.recordings_dir {
        config = config.with_recordings_dir(dir);
    }

    let tools = ToolAvailability::detect(&config.tool_paths);
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        cors_permissive: cli.cors_permissive,
    };

    println!(
        "camweb {} listening on http://{}:{}",
        env!("CARGO_PKG_VERSION"),
        server_config.host,
        server_config.port
    );
    println!("Recordings: {}", config.recordings_dir.display());
    for tool in tools.missing_tools() {
        println!("Warning: {} not found ({})", tool.binary_name(), tool.description());
    }

    let core = CamwebCore::new(config, tools);
    camweb::run_server(WebAppState::new(core), server_config).await
}

fn set_tool(name: &str, path: &str) -> Result<()> {
    let Some(tool) = Tool::from_binary_name(name) else {
        let known: Vec<_> = Tool::all().iter().map(|t| t.binary_name()).collect();
        bail!("Unknown tool '{}' (expected one of: {})", name, known.join(", "));
    };

    let resolved = ToolAvailability::validate_path(path).map_err(anyhow::Error::msg)?;
    config::save_tool_path(tool, &resolved)
        .with_context(|| format!("writing {}", util::config_path().display()))?;

    println!("{} set to {}", tool.binary_name(), resolved.display());
    Ok(())
}

fn print_tools(tools: &ToolAvailability) {
    for &tool in Tool::all() {
        match tools.get_path(tool) {
            Some(path) if tools.is_available(tool) => {
                println!("{:<14} {}", tool.binary_name(), path.display())
            }
            _ => println!("{:<14} not found", tool.binary_name()),
        }
    }
}
