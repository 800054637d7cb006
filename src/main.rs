//! resolve-config CLI - bind and resolve job configurations

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::debug;

use jobconf::local_paths::derive_local_paths;
use jobconf::{ConfigError, Environment, FixSuggestion, JobConfig, Settings, TransferPlan};

#[derive(Parser)]
#[command(name = "resolve-config")]
#[command(about = "Parse and resolve job configurations with ATTR: and ENV: substitutions")]
#[command(version)]
struct Cli {
    /// Verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML settings file (local_root, local_prefix, pretty)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Error output format
    #[arg(long, value_enum, default_value_t = ErrorFormat::Text, global = true)]
    format: ErrorFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ErrorFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a configuration and print it as JSON
    Resolve {
        /// Configuration file (JSON or YAML) or inline JSON string
        config: String,

        /// Pretty print the resolved JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check that a configuration binds and resolves
    Validate {
        /// Configuration file (JSON or YAML) or inline JSON string
        config: String,
    },

    /// Print local paths derived for one input or output
    LocalPaths {
        /// Configuration file (JSON or YAML) or inline JSON string
        config: String,

        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        local: LocalArgs,
    },

    /// Print the transfer plan for one input (download) or output (upload / copy)
    Plan {
        /// Configuration file (JSON or YAML) or inline JSON string
        config: String,

        /// Input to download
        #[arg(long, conflicts_with = "upload", required_unless_present = "upload")]
        download: Option<String>,

        /// Output to upload
        #[arg(long)]
        upload: Option<String>,

        /// Copy the output's local files into this directory instead of uploading
        #[arg(long, requires = "upload")]
        copy_to: Option<String>,

        /// Fail if a local file is missing: download destinations, upload/copy sources
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        local: LocalArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Input name
    #[arg(long)]
    input: Option<String>,

    /// Output name
    #[arg(long)]
    output: Option<String>,
}

#[derive(Args)]
struct LocalArgs {
    /// Local working directory (overrides settings)
    #[arg(long)]
    local_root: Option<String>,

    /// Sub-directory under the local root (overrides settings)
    #[arg(long)]
    prefix: Option<String>,
}

impl LocalArgs {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(root) = &self.local_root {
            settings.local_root = root.clone();
        }
        if let Some(prefix) = &self.prefix {
            settings.local_prefix = Some(prefix.clone());
        }
        settings
    }
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let environment = Environment::from_process();
    let format = cli.format;

    if let Err(e) = run(cli, &environment) {
        report(&e, format);
        std::process::exit(1);
    }
}

fn run(cli: Cli, environment: &Environment) -> Result<(), ConfigError> {
    let settings = Settings::load(cli.settings.as_deref())?.with_env(environment);

    match cli.command {
        Commands::Resolve { config, pretty } => {
            let resolved = load(&config)?.resolve(environment)?;
            print_json(&resolved, pretty || settings.pretty)
        }
        Commands::Validate { config } => validate(&config, environment),
        Commands::LocalPaths { config, target, local } => {
            let settings = local.apply(settings);
            let resolved = load(&config)?.resolved(environment)?;

            // clap guarantees exactly one of --input / --output
            let paths = if let Some(name) = &target.input {
                let input = resolved.input(name).ok_or_else(|| not_found("input", name))?;
                derive_local_paths(&input.paths, &settings.local_root, settings.local_prefix())
            } else {
                let name = target.output.unwrap_or_default();
                let output = resolved.output(&name).ok_or_else(|| not_found("output", &name))?;
                derive_local_paths(&output.paths, &settings.local_root, settings.local_prefix())
            };

            print_json(&serde_json::to_value(paths).map_err(ConfigError::Encode)?, settings.pretty)
        }
        Commands::Plan {
            config,
            download,
            upload,
            copy_to,
            check,
            local,
        } => {
            let settings = local.apply(settings);
            let resolved = load(&config)?.resolved(environment)?;
            let exists = |path: &str| Path::new(path).exists();

            let plan = if let Some(name) = download {
                let input = resolved.input(&name).ok_or_else(|| not_found("input", &name))?;
                let plan = TransferPlan::download(input, &settings.local_root);
                if check {
                    plan.check_destinations(exists)?;
                }
                plan
            } else {
                let name = upload.unwrap_or_default();
                let output = resolved.output(&name).ok_or_else(|| not_found("output", &name))?;
                let plan = match &copy_to {
                    Some(dir) => TransferPlan::copy(output, &settings.local_root, settings.local_prefix(), dir),
                    None => TransferPlan::upload(output, &settings.local_root, settings.local_prefix()),
                };
                if check {
                    plan.check_sources(exists)?;
                }
                plan
            };

            debug!(transfers = plan.len(), "built transfer plan");
            print_json(&serde_json::to_value(&plan).map_err(ConfigError::Encode)?, settings.pretty)
        }
    }
}

/// Load from a file when `source` names one, otherwise parse it as inline JSON
fn load(source: &str) -> Result<JobConfig, ConfigError> {
    let path = Path::new(source);
    if !path.is_file() {
        debug!("parsing configuration from JSON string");
        return JobConfig::from_json_str(source);
    }

    debug!(file = %path.display(), "loading configuration from file");
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => JobConfig::from_yaml_str(&content),
        _ => JobConfig::from_json_str(&content),
    }
}

fn validate(source: &str, environment: &Environment) -> Result<(), ConfigError> {
    let config = load(source)?;
    config.resolve(environment)?;

    println!("{} Configuration '{}' is valid", "✓".green(), config.name());
    println!("  Type: {}", config.job_type());
    println!("  Attributes: {}", config.attributes().len());
    println!("  Inputs: {}", config.inputs().len());
    println!("  Outputs: {}", config.outputs().len());
    println!("  Stores: {}", config.stores().len());
    Ok(())
}

fn not_found(section: &'static str, name: &str) -> ConfigError {
    ConfigError::ItemNotFound {
        section,
        name: name.to_string(),
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<(), ConfigError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(ConfigError::Encode)?;
    println!("{}", text);
    Ok(())
}

fn report(e: &ConfigError, format: ErrorFormat) {
    match format {
        ErrorFormat::Text => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
        }
        ErrorFormat::Json => {
            let body = json!({
                "code": e.code(),
                "stage": e.stage(),
                "message": e.to_string(),
                "missing": e.missing_refs(),
            });
            eprintln!("{}", body);
        }
    }
}
