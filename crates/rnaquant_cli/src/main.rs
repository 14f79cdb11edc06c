//! Command-line probe over one quantification store.
//!
//! # Responsibility
//! - Mount a single store as a quantification set of a dataset.
//! - Run searches and compound-id lookups and print the transfer objects
//!   as JSON on stdout.
//!
//! # Exit codes
//! - 0 on success, 2 for unknown ids, 3 when the store cannot be read,
//!   1 for everything else.

use clap::{Args, Parser, Subcommand};
use log::{debug, error};
use rnaquant_core::{
    init_from_config, search_expression_levels, search_rna_quantifications, ConfigError,
    CoreConfig, Dataset, RnaServiceError, SearchExpressionLevelsRequest,
    SearchRnaQuantificationsRequest,
};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rnaquant")]
#[command(about = "Query RNA quantification stores")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    mount: MountArgs,

    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MountArgs {
    /// Path of the quantification store file.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[arg(long, global = true, default_value = "dataset")]
    dataset: String,

    /// Local id of the quantification set backed by `--store`.
    #[arg(long = "set", global = true, default_value = "default")]
    set_name: String,

    #[arg(long, global = true)]
    reference_set: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the mounted quantification set")]
    Set,
    #[command(about = "List quantifications of the mounted set")]
    Quantifications(PageArgs),
    #[command(about = "List expression levels of one quantification")]
    ExpressionLevels(ExpressionLevelArgs),
    #[command(about = "Look up a quantification by compound id")]
    Quantification(LookupArgs),
    #[command(about = "Look up an expression level by compound id")]
    ExpressionLevel(LookupArgs),
}

#[derive(Args)]
struct PageArgs {
    #[arg(long, default_value = "")]
    page_token: String,

    /// Maximum items per page; 0 returns everything.
    #[arg(long, default_value_t = 0)]
    page_size: u32,
}

#[derive(Args)]
struct ExpressionLevelArgs {
    /// Local id of the quantification inside the mounted set.
    quantification: String,

    #[arg(long)]
    threshold: Option<f64>,

    /// Restrict to these feature ids; repeat for several.
    #[arg(long = "feature-id")]
    feature_ids: Vec<String>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct LookupArgs {
    id: String,
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    MissingStore,
    Service(RnaServiceError),
    Output(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::MissingStore => write!(f, "--store is required"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl From<RnaServiceError> for CliError {
    fn from(value: RnaServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::from(map_exit_code(&err))
        }
    }
}

fn map_exit_code(error: &CliError) -> u8 {
    match error {
        CliError::Service(
            RnaServiceError::QuantificationNotFound(_)
            | RnaServiceError::ExpressionLevelNotFound(_)
            | RnaServiceError::RnaQuantificationSetNotFound(_),
        ) => 2,
        CliError::Service(RnaServiceError::StoreUnavailable { .. }) => 3,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = CoreConfig::from_env().map_err(CliError::Config)?;
    init_from_config(&config).map_err(CliError::Logging)?;

    let store = cli.mount.store.clone().ok_or(CliError::MissingStore)?;
    let mut dataset = Dataset::new(&cli.mount.dataset)?.with_store_options(config.store_options());
    let set_id = dataset
        .add_quantification_set(&cli.mount.set_name, store, cli.mount.reference_set.clone())?
        .id()
        .clone();
    debug!("event=cli_mount module=cli status=ok set={set_id}");

    match cli.command {
        Commands::Set => {
            let set = dataset.resolve_set(&set_id.token())?;
            print_json(&set.to_protocol(), cli.pretty)
        }
        Commands::Quantifications(page) => {
            let response = search_rna_quantifications(
                &dataset,
                &SearchRnaQuantificationsRequest {
                    rna_quantification_set_id: set_id.token(),
                    page_token: page.page_token,
                    page_size: page.page_size,
                },
            )?;
            print_json(&response, cli.pretty)
        }
        Commands::ExpressionLevels(args) => {
            let quantification_id = set_id.child(&args.quantification).map_err(RnaServiceError::from)?;
            let response = search_expression_levels(
                &dataset,
                &SearchExpressionLevelsRequest {
                    rna_quantification_id: quantification_id.token(),
                    page_token: args.page.page_token,
                    page_size: args.page.page_size,
                    threshold: args.threshold,
                    feature_ids: args.feature_ids,
                },
            )?;
            print_json(&response, cli.pretty)
        }
        Commands::Quantification(lookup) => {
            let quantification = dataset.resolve_quantification(&lookup.id)?;
            print_json(&quantification.to_protocol(), cli.pretty)
        }
        Commands::ExpressionLevel(lookup) => {
            let level = dataset.resolve_expression_level(&lookup.id)?;
            print_json(&level.to_protocol(), cli.pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
