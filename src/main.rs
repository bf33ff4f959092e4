//! outfit - generate gender-consistent outfits with a language model.
//!
//! Runs the generate/classify/validate loop once from the command line, or
//! serves it over HTTP.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use outfit_workflow::core::Config;
use outfit_workflow::workflow::graph;

/// Generate gender-consistent outfits with a language model
#[derive(Parser)]
#[command(name = "outfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to .outfit.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one outfit workflow and print the final state (default)
    #[cfg(feature = "ai")]
    Run {
        /// Maximum validation passes before giving up
        #[arg(short, long)]
        max_attempts: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Serve the workflow over HTTP
    #[cfg(all(feature = "ai", feature = "server"))]
    Serve {
        /// Address to bind the server to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum validation passes per request
        #[arg(short, long)]
        max_attempts: Option<u32>,
    },

    /// Render the workflow graph as Mermaid source
    Graph {
        /// Write a Markdown file instead of printing to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Output format for `run`.
#[cfg(feature = "ai")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    // A missing .env file is fine
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "Failed to load .env");
        }
    }

    let config_path = cli.config.clone();

    // Handle commands
    match cli.command {
        #[cfg(feature = "ai")]
        None => cmd_run(config_path.as_deref(), None, OutputFormat::Text)?,
        #[cfg(not(feature = "ai"))]
        None => {
            Cli::command().print_help()?;
        }
        #[cfg(feature = "ai")]
        Some(Commands::Run { max_attempts, format }) => {
            cmd_run(config_path.as_deref(), max_attempts, format)?;
        }
        #[cfg(all(feature = "ai", feature = "server"))]
        Some(Commands::Serve { host, port, max_attempts }) => {
            cmd_serve(config_path.as_deref(), host, port, max_attempts)?;
        }
        Some(Commands::Graph { output }) => {
            cmd_graph(output)?;
        }
        Some(Commands::Config { path }) => {
            cmd_config(config_path.as_deref(), path)?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Load configuration from `--config` or the default locations.
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from_file(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load(),
    }
}

/// Run one workflow.
#[cfg(feature = "ai")]
fn cmd_run(
    config_path: Option<&std::path::Path>,
    max_attempts: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    use outfit_workflow::ai::provider_from_config;
    use outfit_workflow::workflow::CycleController;

    let mut config = load_config(config_path)?;
    if let Some(max) = max_attempts {
        config.workflow.max_attempts = max;
    }

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let llm = provider_from_config(&config.ai)?;
        if !llm.is_available().await {
            anyhow::bail!(
                "AI provider '{}' is not available.\n\
                 Set ANTHROPIC_API_KEY for Claude, or run Ollama locally.",
                llm.name()
            );
        }

        let controller = CycleController::new(config.workflow.max_attempts);
        let outcome = controller.run(llm.as_ref()).await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&outcome.state)?);
            }
            OutputFormat::Text => print_outcome(&outcome),
        }
        Ok(())
    })
}

#[cfg(feature = "ai")]
fn print_outcome(outcome: &outfit_workflow::WorkflowOutcome) {
    use outfit_workflow::CycleStatus;

    let state = &outcome.state;
    let headline = match outcome.status {
        CycleStatus::Approved => "Outfit approved",
        _ => "Gave up without a consistent outfit",
    };
    println!("{headline} after {} attempt(s)\n", state.attempts);

    let show = |label: &str, item: &Option<String>, gender: Option<outfit_workflow::Gender>| {
        println!(
            "  {label:<6} {} ({})",
            item.as_deref().unwrap_or("-"),
            gender.map_or("-", |g| g.as_str())
        );
    };
    show("head:", &state.head_item, state.head_gender);
    show("torso:", &state.torso_item, state.torso_gender);
    show("legs:", &state.leg_item, state.leg_gender);

    println!("\n  overall: {}", state.gender.map_or("-", |g| g.as_str()));
}

/// Serve the workflow over HTTP.
#[cfg(all(feature = "ai", feature = "server"))]
fn cmd_serve(
    config_path: Option<&std::path::Path>,
    host: Option<String>,
    port: Option<u16>,
    max_attempts: Option<u32>,
) -> Result<()> {
    use outfit_workflow::ai::provider_from_config;
    use outfit_workflow::api::{self, ApiState};
    use outfit_workflow::workflow::CycleController;

    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(max) = max_attempts {
        config.workflow.max_attempts = max;
    }

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let llm = provider_from_config(&config.ai)?;
        tracing::info!(
            provider = llm.name(),
            max_attempts = config.workflow.max_attempts,
            "Starting outfit API"
        );

        let state = ApiState::new(CycleController::new(config.workflow.max_attempts), llm);
        api::serve(&config.server, state).await
    })
}

/// Render the workflow graph.
fn cmd_graph(output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            graph::write_markdown(&path)?;
            println!("Diagram saved to {}", path.display());
        }
        None => print!("{}", graph::render_mermaid()),
    }
    Ok(())
}

/// Show configuration or its location.
fn cmd_config(config_path: Option<&std::path::Path>, show_path: bool) -> Result<()> {
    if show_path {
        let path = config_path.map(std::path::Path::to_path_buf).or_else(Config::discover);
        match path {
            Some(path) => println!("{}", path.display()),
            None => {
                if let Some(dir) = Config::config_dir() {
                    println!("{} (not found, using defaults)", dir.join("config.toml").display());
                }
            }
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    println!("{}", config.to_toml()?);

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "outfit", &mut io::stdout());
}
