//! statusgen CLI - persona status reports from Jira
//!
//! Main entry point for the statusgen command-line tool.

use clap::{Parser, Subcommand};
use statusgen::cli::{self, GenerateOptions, OutputFormat};
use statusgen::config::{load_config, LoggingConfig};
use statusgen::Preset;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "statusgen")]
#[command(about = "Persona-tailored status reports from Jira, with an optional LLM judge", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Load this config file instead of ~/.statusgen and ./.statusgen
    #[arg(long, global = true, env = "STATUSGEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a status report
    Generate {
        /// Initiative name shown in the report header
        #[arg(short, long)]
        initiative: Option<String>,
        /// Comma-separated project keys or names
        #[arg(short, long)]
        projects: Option<String>,
        /// Comma-separated labels
        #[arg(short, long)]
        labels: Option<String>,
        /// Audience: team_lead, manager, group_manager, cto
        #[arg(long)]
        persona: Option<String>,
        /// last_week, last_month or "YYYY-MM-DD to YYYY-MM-DD"
        #[arg(long)]
        period: Option<String>,
        /// Summary provider: none, groq, openai, xai, gemini
        #[arg(long)]
        provider: Option<String>,
        /// Summary model
        #[arg(long)]
        model: Option<String>,
        /// Validate the report with a judge model
        #[arg(long)]
        judge: bool,
        /// Judge provider (defaults to [judge] or [llm] config)
        #[arg(long)]
        judge_provider: Option<String>,
        /// Judge model
        #[arg(long)]
        judge_model: Option<String>,
        /// Fill unset flags from a saved preset
        #[arg(long)]
        preset: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Preset management commands
    #[command(subcommand)]
    Preset(PresetCommands),

    /// List projects accessible with the configured credentials
    Projects {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List models offered by an OpenAI-compatible provider
    Models {
        /// groq, openai or xai
        #[arg(long, default_value = "groq")]
        provider: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum PresetCommands {
    /// Save report criteria under a name
    Save {
        /// Preset name
        name: String,
        #[arg(short, long)]
        initiative: String,
        /// Tracker URL
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(short, long, default_value = "")]
        projects: String,
        #[arg(short, long, default_value = "")]
        labels: String,
        #[arg(long, default_value = "")]
        provider: String,
        #[arg(long, default_value = "")]
        persona: String,
        #[arg(long, default_value = "")]
        period: String,
    },
    /// List saved presets
    List,
    /// Show one preset
    Show {
        /// Preset name
        name: String,
    },
    /// Delete a preset
    Delete {
        /// Preset name
        name: String,
    },
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match logging.format.as_str() {
        "json" => builder.json().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("{}", statusgen::version::full_version());
        return Ok(());
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default())?;
            eprintln!("✗ {}", e);
            return Err(e.into());
        }
    };
    init_tracing(&config.logging)?;

    let outcome = match cli.command {
        Commands::Generate {
            initiative,
            projects,
            labels,
            persona,
            period,
            provider,
            model,
            judge,
            judge_provider,
            judge_model,
            preset,
            format,
        } => {
            let options = GenerateOptions {
                initiative,
                projects,
                labels,
                persona,
                period,
                provider,
                model,
                judge,
                judge_provider,
                judge_model,
                preset,
                format,
            };
            cli::generate::handle_generate(&config, options).await
        }
        Commands::Preset(preset_cmd) => match preset_cmd {
            PresetCommands::Save {
                name,
                initiative,
                url,
                email,
                projects,
                labels,
                provider,
                persona,
                period,
            } => {
                let preset = Preset {
                    initiative_name: initiative,
                    url,
                    email,
                    projects,
                    labels,
                    llm_provider: provider,
                    persona,
                    period,
                };
                cli::preset::handle_save(&config, &name, preset)
            }
            PresetCommands::List => cli::preset::handle_list(&config),
            PresetCommands::Show { name } => cli::preset::handle_show(&config, &name),
            PresetCommands::Delete { name } => cli::preset::handle_delete(&config, &name),
        },
        Commands::Projects { format } => cli::projects::handle_projects(&config, format).await,
        Commands::Models { provider, format } => {
            cli::models::handle_models(&config, &provider, format).await
        }
        Commands::Version => Ok(()),
    };

    if let Err(e) = outcome {
        eprintln!("✗ {}", e);
        return Err(e.into());
    }
    Ok(())
}
