mod config;
mod export_cmd;
mod suggest_cmd;
mod tui;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use bom_core::ModuleCatalog;
use bom_core::module_file::load_module_file;
use bom_core::suggest::GeminiSuggester;

use config::BomConfig;
use suggest_cmd::OutputFormat;

#[derive(Parser)]
#[command(
    name = "bom",
    about = "Bill of Materials editor with AI-assisted component suggestions"
)]
struct Cli {
    /// Gemini API key (overrides BOM_API_KEY, GEMINI_API_KEY, API_KEY and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a bom config file
    Init {
        /// Gemini model name
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Launch the interactive dashboard (default)
    Dashboard {
        /// Load modules from a TOML definition file instead of the samples
        #[arg(long)]
        modules: Option<PathBuf>,
        /// Start with no modules
        #[arg(long, conflicts_with = "modules")]
        empty: bool,
        /// Directory CSV exports are written to
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },
    /// Ask the AI service for components of a module and print them
    Suggest {
        /// Module name
        name: String,
        /// Extra description passed to the model
        #[arg(long)]
        context: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Export modules from a TOML definition file as CSV
    Export {
        /// Path to the module definition file
        file: PathBuf,
        /// Only export the module with this name
        #[arg(long)]
        module: Option<String>,
        /// Directory to write CSV files to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Write CSV to stdout instead of files (single module only)
        #[arg(long)]
        stdout: bool,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `bom init` command: write config file.
fn cmd_init(api_key: Option<&str>, model: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.map(str::to_string),
            model: model.map(str::to_string),
            base_url: None,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => println!("  gemini.api_key = {}", config::mask_key(key)),
        None => println!("  gemini.api_key not set (use --api-key or BOM_API_KEY)"),
    }
    if let Some(model) = model {
        println!("  gemini.model = {model}");
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Dashboard {
        modules: None,
        empty: false,
        export_dir: PathBuf::from("."),
    });

    // The dashboard owns the terminal; keep log output to warnings there.
    let default_level = match command {
        Commands::Dashboard { .. } => "warn",
        _ => "info",
    };
    init_tracing(default_level);

    match command {
        Commands::Init { model, force } => {
            cmd_init(cli.api_key.as_deref(), model.as_deref(), force)?;
        }
        Commands::Dashboard {
            modules,
            empty,
            export_dir,
        } => {
            let catalog = if let Some(path) = modules {
                let modules = load_module_file(&path)
                    .with_context(|| format!("failed to load modules from {}", path.display()))?;
                ModuleCatalog::from_modules(modules)
            } else if empty {
                ModuleCatalog::new()
            } else {
                ModuleCatalog::with_demo_modules()
            };
            let resolved = BomConfig::resolve(cli.api_key.as_deref());
            let suggester = Arc::new(GeminiSuggester::new(resolved.gemini));
            let app = tui::app::App::new(catalog, suggester, export_dir);
            tui::run_dashboard(app).await?;
        }
        Commands::Suggest {
            name,
            context,
            format,
        } => {
            let resolved = BomConfig::resolve(cli.api_key.as_deref());
            let suggester = GeminiSuggester::new(resolved.gemini);
            suggest_cmd::run_suggest(&suggester, &name, context.as_deref(), format).await?;
        }
        Commands::Export {
            file,
            module,
            output_dir,
            stdout,
        } => {
            export_cmd::run_export(&file, module.as_deref(), &output_dir, stdout)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "bom", &mut std::io::stdout());
        }
    }

    Ok(())
}
