use clap::{Parser, Subcommand};
use confgen::emit::CodeTarget;
use confgen::migrate::{ConfigUpdater, TEMPLATE, save_callback};
use confgen::{Result, Settings, compile};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "confgen")]
#[command(about = "Config schema compiler and migrator", long_about = None)]
struct Cli {
    /// Settings file (default: ./confgen.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schema, menu, generated code and locale files; refresh the template config.
    Generate {
        #[arg(long, value_enum)]
        target: Option<CodeTarget>,
    },

    /// Migrate `<config_dir>/<name>.json` onto the current schema.
    Migrate {
        name: String,

        /// Ignore user values and write pure defaults.
        #[arg(long)]
        template: bool,

        /// Print the migrated config instead of writing it.
        #[arg(long)]
        dry_run: bool,

        /// Apply cloud-phone overrides.
        #[arg(long)]
        constrained: bool,
    },

    /// Print the companion keys written when `key` changes to `value`.
    Callback { key: String, value: String },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("confgen error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let mut settings = Settings::load(cli.config.as_deref())?;
    tracing::debug!(?settings, "settings loaded");

    match cli.cmd {
        Commands::Generate { target } => {
            if let Some(target) = target {
                settings.code_target = target;
            }

            // 1) Compile and write artifacts.
            let generator = compile::generate(&settings)?;

            // 2) Refresh the template config against the new schema.
            let updater = ConfigUpdater::new(
                generator.args.clone(),
                generator.sources.registry.clone(),
                generator.sources.redirects.clone(),
            )
            .constrained_environment(settings.constrained_environment)
            .config_dir(settings.config_dir.clone());
            updater.update_file(TEMPLATE, true)?;

            if !generator.diagnostics.is_empty() {
                eprintln!(
                    "{} schema entries skipped, see warnings above",
                    generator.diagnostics.len()
                );
            }
            println!("Wrote {}", settings.output_dir.display());
        }
        Commands::Migrate {
            name,
            template,
            dry_run,
            constrained,
        } => {
            if constrained {
                settings.constrained_environment = true;
            }
            let updater = ConfigUpdater::from_settings(&settings)?;
            if dry_run {
                let data = updater.read_file(&name, template)?;
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                updater.update_file(&name, template)?;
                println!("Updated {}", settings.config_dir.join(format!("{name}.json")).display());
            }
        }
        Commands::Callback { key, value } => {
            let value: Value =
                serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));
            for (key, value) in save_callback(&key, &value) {
                println!("{key} = {value}");
            }
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CONFGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
