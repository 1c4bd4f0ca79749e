// src/main.rs

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::error;

use schemamig::config::MigrateOptions;
use schemamig::schema::SchemaFormat;
use schemamig::{bootstrap, driver, seed, wait};

#[derive(Parser)]
#[command(name = "schemamig")]
#[command(author, version, about = "Declarative MySQL schema migration", long_about = None)]
struct Cli {
    /// Schema document is JSON
    #[arg(short = 'j', long, global = true, conflicts_with = "yaml")]
    json: Option<PathBuf>,

    /// Schema document is YAML
    #[arg(short = 'y', long, global = true, conflicts_with = "json")]
    yaml: Option<PathBuf>,

    /// Path to the persisted state snapshot
    #[arg(short = 's', long, global = true, default_value = "state.yml")]
    state: PathBuf,

    /// Path to the database configuration file
    #[arg(short = 'd', long, global = true, default_value = "./database.yml")]
    database: PathBuf,

    /// Environment name within the database configuration file
    #[arg(short = 'e', long, global = true, default_value = "default")]
    environment: String,

    /// Path to the seed-data file
    #[arg(short = 'S', long, global = true, default_value = "seed.yml")]
    seed: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and execute the migration plan
    Run,
    /// Compute and print the migration plan without touching the database
    Plan,
    /// Create the target database if it doesn't exist
    Init,
    /// Load seed data into the target database
    Seed,
    /// Wait for the target database server to accept connections
    Wait,
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn schema_options(cli: &Cli) -> schemamig::Result<(PathBuf, SchemaFormat)> {
    match (&cli.json, &cli.yaml) {
        (Some(path), None) => Ok((path.clone(), SchemaFormat::Json)),
        (None, Some(path)) => Ok((path.clone(), SchemaFormat::Yaml)),
        (None, None) => Err(schemamig::MigrationError::OptionEmpty(
            "one of --json or --yaml is required".to_string(),
        )),
        (Some(_), Some(_)) => Err(schemamig::MigrationError::OptionEmpty(
            "--json and --yaml are mutually exclusive".to_string(),
        )),
    }
}

fn migrate_options(cli: &Cli) -> schemamig::Result<MigrateOptions> {
    let (schema_path, schema_format) = schema_options(cli)?;
    Ok(MigrateOptions {
        schema_path,
        schema_format,
        state_path: cli.state.clone(),
        database_config_path: cli.database.clone(),
        environment: cli.environment.clone(),
    })
}

fn run_cli() -> schemamig::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "schemamig", &mut io::stdout());
            Ok(())
        }
        Commands::Plan => {
            let options = migrate_options(&cli)?;
            driver::plan(&options)?;
            Ok(())
        }
        Commands::Run => {
            let options = migrate_options(&cli)?;
            driver::run(&options)
        }
        Commands::Init => {
            let config = schemamig::config::load_database_config(&cli.database, &cli.environment)?;
            bootstrap::create_database_if_missing(&config)
        }
        Commands::Seed => {
            let config = schemamig::config::load_database_config(&cli.database, &cli.environment)?;
            let mut conn = mysql::Conn::new(
                mysql::Opts::from_url(&config.dsn()).map_err(mysql::Error::from)?,
            )?;
            seed::load(&mut conn, cli.seed.to_string_lossy().as_ref())
        }
        Commands::Wait => {
            let config = schemamig::config::load_database_config(&cli.database, &cli.environment)?;
            wait::until_ready(&config.server_dsn())
        }
    }
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!(">>> MIGRATION FAILED: {e}");
            ExitCode::FAILURE
        }
    }
}
