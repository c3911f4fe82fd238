//! meddir - Healthcare facility directory

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use meddir::api::{self, ApiResponse, Body};
use meddir::config::{Config, OutputFormat, DEFAULT_DATABASE, LOG_ENV};
use meddir::model::WorkerFilter;
use meddir::output::render_to_terminal;
use meddir::report;
use meddir::store::SqliteStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Healthcare facility directory: workers, departments and spreadsheet export
#[derive(Parser, Debug)]
#[command(name = "meddir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(short, long, global = true, default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: CliOutputFormat,

    /// Log filter (overrides MEDDIR_LOG), e.g. "debug" or "meddir=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema, optionally with example data
    Init {
        /// Insert the example directory
        #[arg(long)]
        seed: bool,
    },
    /// Write the full spreadsheet export
    Report {
        /// Directory the report is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Width of columns without an override
        #[arg(long)]
        column_width: Option<f64>,
    },
    /// List facility types
    FacilityTypes,
    /// List specializations
    Specializations,
    /// List departments
    Departments {
        /// Only departments of this facility type
        #[arg(long)]
        facility_type: Option<i64>,
    },
    /// Show one department
    Department { id: i64 },
    /// Delete a department without workers
    DeleteDepartment { id: i64 },
    /// List medical workers
    Workers {
        #[arg(long)]
        department: Option<i64>,
        #[arg(long)]
        specialization: Option<i64>,
    },
    /// Show one medical worker
    Worker { id: i64 },
    /// Add a worker from JSON (inline, @file or - for stdin)
    AddWorker { json: String },
    /// Update a worker from JSON that carries the row_version last read
    UpdateWorker { id: i64, json: String },
    /// Delete a worker
    DeleteWorker { id: i64 },
    /// Manage a worker's image
    Image {
        #[command(subcommand)]
        action: ImageCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ImageCommand {
    /// Save the stored image to a file
    Get {
        id: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Store an image file
    Set { id: i64, file: PathBuf },
    /// Remove the stored image
    Delete { id: i64 },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// An explicit `--log-level` wins over MEDDIR_LOG, which wins over the default
fn init_logging(explicit: bool, filter: &str) {
    let filter = if explicit {
        EnvFilter::new(filter)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(filter))
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run() -> Result<u8> {
    let cli = Cli::parse();

    let mut config = Config::new(cli.database).with_output_format(cli.format.into());
    let explicit_log = cli.log_level.is_some();
    if let Some(filter) = cli.log_level {
        config = config.with_log_filter(filter);
    }
    init_logging(explicit_log, &config.log_filter);

    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("Failed to open database: {}", config.database.display()))?;
    store.init_schema().context("Failed to create schema")?;

    let response = match cli.command {
        Command::Init { seed } => {
            if seed {
                store.seed_example_data().context("Failed to seed example data")?;
            }
            println!("Initialized {}", config.database.display());
            return Ok(0);
        }
        Command::Report {
            output,
            column_width,
        } => {
            config = config.with_output_dir(output);
            if let Some(width) = column_width {
                config = config.with_column_width(width);
            }
            let builder = report::builder(config.column_width);
            let now = chrono::Local::now().naive_local();
            let response = api::download_report(&store, &builder, now);
            if let Body::Binary {
                filename: Some(name),
                data,
                ..
            } = &response.body
            {
                let path = config.output_dir.join(name);
                std::fs::write(&path, data)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("{}", path.display());
                return Ok(0);
            }
            response
        }
        Command::FacilityTypes => api::facility_types(&store),
        Command::Specializations => api::specializations(&store),
        Command::Departments { facility_type } => api::departments(&store, facility_type),
        Command::Department { id } => api::department(&store, id),
        Command::DeleteDepartment { id } => api::delete_department(&store, id),
        Command::Workers {
            department,
            specialization,
        } => api::workers(
            &store,
            WorkerFilter {
                department_id: department,
                specialization_id: specialization,
            },
        ),
        Command::Worker { id } => api::worker(&store, id),
        Command::AddWorker { json } => api::add_worker(&store, &read_body(&json)?),
        Command::UpdateWorker { id, json } => api::update_worker(&store, id, &read_body(&json)?),
        Command::DeleteWorker { id } => api::delete_worker(&store, id),
        Command::Image { action } => match action {
            ImageCommand::Get { id, output } => {
                let response = api::worker_image(&store, id);
                if let Body::Binary { data, .. } = &response.body {
                    std::fs::write(&output, data)
                        .with_context(|| format!("Failed to write image: {}", output.display()))?;
                    println!("{}", output.display());
                    return Ok(0);
                }
                response
            }
            ImageCommand::Set { id, file } => {
                let image = std::fs::read(&file)
                    .with_context(|| format!("Failed to read image: {}", file.display()))?;
                api::upload_worker_image(&store, id, &image)
            }
            ImageCommand::Delete { id } => api::delete_worker_image(&store, id),
        },
    };

    finish(&response, config.output_format)
}

fn finish(response: &ApiResponse, format: OutputFormat) -> Result<u8> {
    render_to_terminal(response, format)?;
    Ok(u8::try_from(response.exit_code()).unwrap_or(2))
}

/// JSON argument: inline text, `@path` for a file, `-` for stdin
fn read_body(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read stdin")?;
        return Ok(body);
    }
    match arg.strip_prefix('@') {
        Some(path) => read_file(Path::new(path)),
        None => Ok(arg.to_string()),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
