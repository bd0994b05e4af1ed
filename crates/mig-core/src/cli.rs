//! Command-line interface for the rollup.
//!
//! Subcommands map onto the read surfaces of the pipeline: `load` persists
//! an export, `summary`/`metrics`/`groups`/`rows`/`options` query either an
//! explicit `--input` file or the persisted dataset, `sample` emits the
//! synthetic export, and `config` inspects the stage map. Human output goes
//! to stdout as text; `--format json` swaps in serialized metrics structs.

use crate::exit_codes::ExitCode;
use crate::ingest::{self, IngestReport};
use crate::metrics::{self, MetricsSnapshot};
use crate::output;
use crate::pipeline::{self, FilterSelection, RollupOutcome};
use crate::sample;
use crate::store::DatasetStore;
use crate::table::EnrichedRow;
use clap::{Args, Parser, Subcommand};
use mig_common::{DatasetId, Error, OutputFormat, SCHEMA_VERSION};
use mig_config::{resolve_stage_map, stage_map_schema, StageMap};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "mig-core",
    version,
    about = "Migration status rollups over tabular exports"
)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Stage-map file (overrides MIG_ROLLUP_CONFIG and the config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory for the persisted dataset
    #[arg(long, global = true, value_name = "DIR", env = "MIG_ROLLUP_DATA")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest a CSV export and persist it as the latest dataset
    Load(LoadArgs),
    /// Group summary table with per-group progress
    Summary(QueryArgs),
    /// Global KPI tiles
    Metrics(QueryArgs),
    /// Per-dev-group rollup across projects
    Groups(QueryArgs),
    /// Normalized, filtered row set
    Rows(QueryArgs),
    /// Distinct filter options in the dataset
    Options(InputArgs),
    /// Emit a synthetic sample export to stdout
    Sample(SampleArgs),
    /// Stage-map configuration utilities
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// CSV export to ingest
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Read this CSV instead of the persisted dataset
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Keep only these projects (repeatable)
    #[arg(long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Keep only these dev groups (repeatable)
    #[arg(long = "group", value_name = "NAME")]
    pub groups: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Generator seed
    #[arg(long, default_value_t = sample::DEFAULT_SEED)]
    pub seed: u64,

    /// Approximate total row count
    #[arg(long, value_name = "N")]
    pub rows_hint: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved stage map
    Show,
    /// Validate a stage-map file
    Validate {
        /// Stage-map JSON file to check
        file: PathBuf,
    },
    /// Print the stage-map JSON schema
    Schema,
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> ExitCode {
    match &cli.command {
        Command::Load(args) => run_load(&cli, args),
        Command::Summary(args) => run_summary(&cli, args),
        Command::Metrics(args) => run_metrics(&cli, args),
        Command::Groups(args) => run_groups(&cli, args),
        Command::Rows(args) => run_rows(&cli, args),
        Command::Options(args) => run_options(&cli, args),
        Command::Sample(args) => run_sample(args),
        Command::Config(args) => run_config(&cli, args),
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

struct LoadedInput {
    bytes: Vec<u8>,
    dataset_id: DatasetId,
}

struct QueryContext {
    snapshot: MetricsSnapshot,
    rows: Vec<EnrichedRow>,
    report: IngestReport,
}

/// Print an error and map it to its exit code by numeric range.
fn fail(err: Error) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from_error(&err)
}

fn load_stage_map_or_fail(cli: &Cli) -> Result<StageMap, ExitCode> {
    resolve_stage_map(cli.config.as_deref()).map_err(|e| fail(e.into()))
}

fn open_store(cli: &Cli) -> Result<DatasetStore, ExitCode> {
    match &cli.data_dir {
        Some(dir) => Ok(DatasetStore::from_data_dir(dir)),
        None => DatasetStore::from_env().map_err(|e| fail(e.into())),
    }
}

/// Read the query input: an explicit `--input` file, or the persisted
/// dataset. `Ok(None)` means nothing has ever been loaded.
fn acquire_input(cli: &Cli, input: &InputArgs) -> Result<Option<LoadedInput>, ExitCode> {
    if let Some(path) = &input.input {
        let bytes = std::fs::read(path).map_err(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            ExitCode::from_error(&Error::Io(e))
        })?;
        let dataset_id = DatasetId::from_bytes(&bytes);
        return Ok(Some(LoadedInput { bytes, dataset_id }));
    }

    let store = open_store(cli)?;
    match store.load_latest() {
        Ok(Some((bytes, receipt))) => Ok(Some(LoadedInput {
            bytes,
            dataset_id: receipt.dataset_id,
        })),
        Ok(None) => Ok(None),
        Err(e) => Err(fail(e.into())),
    }
}

/// Run the pipeline for one query command.
///
/// With no dataset at all this still succeeds, with an empty, well-typed
/// context, so every command renders its empty shape uniformly.
fn prepare_query(
    cli: &Cli,
    input: &InputArgs,
    projects: &[String],
    groups: &[String],
) -> Result<QueryContext, ExitCode> {
    let map = load_stage_map_or_fail(cli)?;
    let selection = FilterSelection::from_lists(projects.to_vec(), groups.to_vec());

    let (outcome, report, dataset_id) = match acquire_input(cli, input)? {
        Some(loaded) => {
            let ingested =
                ingest::read_csv_bytes(&loaded.bytes).map_err(|e| fail(e.into()))?;
            let outcome = pipeline::run(&ingested.rows, &map, &selection);
            (outcome, ingested.report, Some(loaded.dataset_id))
        }
        None => {
            eprintln!("no dataset loaded; run `mig-core load <FILE>` or `mig-core sample`");
            (RollupOutcome::default(), IngestReport::default(), None)
        }
    };

    let snapshot = metrics::snapshot(&outcome, &selection, dataset_id);
    Ok(QueryContext {
        snapshot,
        rows: outcome.rows,
        report,
    })
}

/// Exit code shared by all query commands. Missing expected columns win
/// over an empty result set.
fn query_exit(ctx: &QueryContext) -> ExitCode {
    if !ctx.report.is_complete() {
        eprintln!(
            "warning: input missing expected columns: {}",
            ctx.report.missing_columns.join(", ")
        );
        return ExitCode::InputIncomplete;
    }
    if ctx.rows.is_empty() {
        return ExitCode::NoData;
    }
    ExitCode::Ok
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

fn run_load(cli: &Cli, args: &LoadArgs) -> ExitCode {
    let bytes = match std::fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.file.display());
            return ExitCode::from_error(&Error::Io(e));
        }
    };

    // Parse before persisting so a malformed export never becomes the
    // stored dataset.
    let ingested = match ingest::read_csv_bytes(&bytes) {
        Ok(ingested) => ingested,
        Err(e) => return fail(e.into()),
    };

    let store = match open_store(cli) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let source_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    let receipt = match store.save_latest(&source_name, &bytes) {
        Ok(receipt) => receipt,
        Err(e) => return fail(e.into()),
    };

    info!(
        rows = ingested.report.rows_read,
        dataset = %receipt.dataset_id.short(),
        "dataset loaded"
    );

    match cli.format {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "receipt": receipt,
                "rows_read": ingested.report.rows_read,
                "columns_seen": ingested.report.columns_seen,
                "missing_columns": ingested.report.missing_columns,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", output::render_receipt(&receipt));
            println!("  rows      {}", ingested.report.rows_read);
        }
    }

    if !ingested.report.is_complete() {
        eprintln!(
            "warning: input missing expected columns: {}",
            ingested.report.missing_columns.join(", ")
        );
        return ExitCode::InputIncomplete;
    }
    ExitCode::Ok
}

// ---------------------------------------------------------------------------
// Query commands
// ---------------------------------------------------------------------------

fn run_summary(cli: &Cli, args: &QueryArgs) -> ExitCode {
    let ctx = match prepare_query(cli, &args.input, &args.projects, &args.groups) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ctx.snapshot).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", output::render_group_table(&ctx.snapshot.groups));
            if !ctx.snapshot.groups.is_empty() {
                println!();
                println!("{}", output::render_group_cards(&ctx.snapshot.groups));
            }
        }
    }

    query_exit(&ctx)
}

fn run_metrics(cli: &Cli, args: &QueryArgs) -> ExitCode {
    let ctx = match prepare_query(cli, &args.input, &args.projects, &args.groups) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let tiles = output::kpi_tiles(&ctx.snapshot.global);
    match cli.format {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": ctx.snapshot.schema_version,
                "generated_at": ctx.snapshot.generated_at,
                "dataset_id": ctx.snapshot.dataset_id,
                "filter": ctx.snapshot.filter,
                "global": ctx.snapshot.global,
                "tiles": tiles,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", output::render_tiles(&tiles));
        }
    }

    query_exit(&ctx)
}

fn run_groups(cli: &Cli, args: &QueryArgs) -> ExitCode {
    let ctx = match prepare_query(cli, &args.input, &args.projects, &args.groups) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match cli.format {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": ctx.snapshot.schema_version,
                "generated_at": ctx.snapshot.generated_at,
                "dataset_id": ctx.snapshot.dataset_id,
                "filter": ctx.snapshot.filter,
                "dev_group_rollup": ctx.snapshot.dev_group_rollup,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        OutputFormat::Text => {
            println!(
                "{}",
                output::render_dev_group_rollup(&ctx.snapshot.dev_group_rollup)
            );
        }
    }

    query_exit(&ctx)
}

fn run_rows(cli: &Cli, args: &QueryArgs) -> ExitCode {
    let ctx = match prepare_query(cli, &args.input, &args.projects, &args.groups) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match cli.format {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": ctx.snapshot.schema_version,
                "generated_at": ctx.snapshot.generated_at,
                "dataset_id": ctx.snapshot.dataset_id,
                "filter": ctx.snapshot.filter,
                "rows": ctx.rows,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", output::render_rows(&ctx.rows));
        }
    }

    query_exit(&ctx)
}

fn run_options(cli: &Cli, args: &InputArgs) -> ExitCode {
    let ctx = match prepare_query(cli, args, &[], &[]) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let options = metrics::filter_options(&ctx.rows);
    match cli.format {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": ctx.snapshot.schema_version,
                "dataset_id": ctx.snapshot.dataset_id,
                "projects": options.projects,
                "dev_groups": options.dev_groups,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", output::render_options(&options));
        }
    }

    query_exit(&ctx)
}

// ---------------------------------------------------------------------------
// sample
// ---------------------------------------------------------------------------

fn run_sample(args: &SampleArgs) -> ExitCode {
    print!("{}", sample::sample_csv(args.seed, args.rows_hint));
    ExitCode::Ok
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommand::Show => {
            let map = match load_stage_map_or_fail(cli) {
                Ok(map) => map,
                Err(code) => return code,
            };
            println!("{}", serde_json::to_string_pretty(&map).unwrap());
            ExitCode::Ok
        }
        ConfigCommand::Validate { file } => match StageMap::from_file(file) {
            Ok(_) => {
                match cli.format {
                    OutputFormat::Json => {
                        let response = json!({"status": "ok", "file": file.display().to_string()});
                        println!("{}", serde_json::to_string_pretty(&response).unwrap());
                    }
                    OutputFormat::Text => println!("stage map valid: {}", file.display()),
                }
                ExitCode::Ok
            }
            Err(e) => fail(e.into()),
        },
        ConfigCommand::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&stage_map_schema()).unwrap()
            );
            ExitCode::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "mig-core", "summary", "--project", "Apollo", "--project", "Hermes", "--group",
            "Core ETL",
        ])
        .unwrap();
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.projects, vec!["Apollo", "Hermes"]);
                assert_eq!(args.groups, vec!["Core ETL"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn format_defaults_to_text() {
        let cli = Cli::try_parse_from(["mig-core", "metrics"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        let cli = Cli::try_parse_from(["mig-core", "--format", "json", "metrics"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn sample_seed_defaults() {
        let cli = Cli::try_parse_from(["mig-core", "sample"]).unwrap();
        match cli.command {
            Command::Sample(args) => {
                assert_eq!(args.seed, sample::DEFAULT_SEED);
                assert_eq!(args.rows_hint, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
