//! Command-line entry point for the household personal-data file.
//!
//! # Responsibility
//! - Parse subcommands and global options.
//! - Build one `StoreConfig` and hand it to the core service.
//! - Render reports to stdout and errors to stderr with exit status 1.

use clap::{Parser, Subcommand};
use formfill_core::{
    default_log_level, init_logging, to_pretty_json, ConfigOverrides, GapFilter, GapReport,
    HouseholdService, InitOutcome, JsonFileStore, LogTarget, ServiceError, ShowView, StoreConfig,
    StoreError, UpdateReport,
};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process;

const LOG_LEVEL_ENV: &str = "PDF_FORM_FILLER_LOG";

/// Failures surfaced by the binary.
#[derive(Debug)]
enum CliError {
    Service(ServiceError),
    /// Output could not be serialized for display.
    Render(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Parser)]
#[command(name = "formfill")]
#[command(about = "Manage personal data for PDF form filling")]
#[command(version)]
struct Cli {
    /// Path to personal_data.json (default: $PDF_FORM_FILLER_DATA or the user config dir)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Path to the template used by init and add-member
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write rotating log files to this absolute directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data file from template
    Init,

    /// Show stored data
    Show {
        /// Filter by member ID
        #[arg(long)]
        member: Option<String>,
    },

    /// Update a field; nested fields use dot notation, e.g. health.allergies
    Update {
        #[arg(long)]
        member: String,
        #[arg(long)]
        field: String,
        /// Parsed as JSON when possible, otherwise stored as a string
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Update multiple fields from a JSON object of field:value pairs
    BatchUpdate {
        #[arg(long)]
        member: String,
        #[arg(long)]
        updates: String,
    },

    /// Add a new family member
    AddMember {
        #[arg(long)]
        id: String,
        /// parent, child, or other
        #[arg(long)]
        role: String,
    },

    /// Find null fields for a member
    FindGaps {
        #[arg(long)]
        member: String,
        /// Comma-separated field filter
        #[arg(long)]
        fields: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(message) = setup_logging(&cli) {
        eprintln!("WARNING: logging disabled: {message}");
    }

    let overrides = ConfigOverrides {
        data_file: cli.data_file.clone(),
        template_file: cli.template.clone(),
    };
    let config = match StoreConfig::from_env(&overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(1);
        }
    };

    let service = HouseholdService::new(JsonFileStore::new(config));
    if let Err(err) = run(&service, cli.command) {
        report_error(&err);
        process::exit(1);
    }
}

fn setup_logging(cli: &Cli) -> Result<(), String> {
    let level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| default_log_level().to_string());
    let target = match &cli.log_dir {
        Some(dir) => LogTarget::directory(dir)?,
        None => LogTarget::Stderr,
    };
    init_logging(&level, target)
}

fn run(service: &HouseholdService<JsonFileStore>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Init => match service.init()? {
            InitOutcome::Created(path) => {
                println!("Saved: {}", path.display());
                println!("Initialized personal data at: {}", path.display());
            }
            InitOutcome::AlreadyExists(path) => {
                println!("Data file already exists: {}", path.display());
                println!("Use 'show' to view or 'update' to modify.");
            }
        },
        Commands::Show { member } => {
            let view = service.show(member.as_deref())?;
            println!("{}", render_view(&view)?);
        }
        Commands::Update {
            member,
            field,
            value,
        } => {
            let report = service.update(&member, &field, &value)?;
            println!("Saved: {}", report.saved_to.display());
            for change in &report.changes {
                println!(
                    "Updated {}.{}: {} -> {}",
                    report.member_id,
                    change.field,
                    render_previous(change.previous.as_ref()),
                    render_value(&change.current)
                );
            }
        }
        Commands::BatchUpdate { member, updates } => {
            let report = service.batch_update(&member, &updates)?;
            print_batch_report(&report);
        }
        Commands::AddMember { id, role } => {
            let report = service.add_member(&id, &role)?;
            println!("Saved: {}", report.saved_to.display());
            println!(
                "Added member '{}' with role '{}'.",
                report.member_id, report.role
            );
        }
        Commands::FindGaps { member, fields } => {
            let filter = fields.as_deref().map(GapFilter::from_csv);
            let report = service.find_gaps(&member, filter)?;
            print_gap_report(&report);
        }
    }
    Ok(())
}

fn render_view(view: &ShowView) -> Result<String, CliError> {
    let text = match view {
        ShowView::Document(document) => to_pretty_json(document)?,
        ShowView::Member(member) => to_pretty_json(member)?,
    };
    Ok(text)
}

fn print_batch_report(report: &UpdateReport) {
    for change in &report.changes {
        println!(
            "  {}.{}: {} -> {}",
            report.member_id,
            change.field,
            render_previous(change.previous.as_ref()),
            render_value(&change.current)
        );
    }
    println!("Saved: {}", report.saved_to.display());
    println!("Updated {} field(s).", report.changes.len());
}

fn print_gap_report(report: &GapReport) {
    if report.gaps.is_empty() {
        match &report.filter {
            Some(filter) => println!(
                "No missing fields for '{}' (filtered: {})",
                report.member_id,
                filter.prefixes().join(",")
            ),
            None => println!("No missing fields for '{}'", report.member_id),
        }
        return;
    }

    println!("Missing fields for '{}':", report.member_id);
    for gap in &report.gaps {
        println!("  - {gap}");
    }
}

fn render_previous(value: Option<&Value>) -> String {
    match value {
        Some(value) => render_value(value),
        None => "<absent>".to_string(),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn report_error(err: &CliError) {
    let err = match err {
        CliError::Service(err) => err,
        CliError::Render(_) => {
            eprintln!("ERROR: {err}");
            return;
        }
    };
    match err {
        ServiceError::Store(StoreError::FileNotFound(path)) => {
            eprintln!("ERROR: Data file not found: {}", path.display());
            eprintln!("Run 'formfill init' to create it.");
        }
        ServiceError::MemberNotFound { id, available } => {
            eprintln!("ERROR: Member '{id}' not found.");
            eprintln!("Available: {available:?}");
        }
        ServiceError::DuplicateMember(id) => {
            eprintln!("ERROR: Member '{id}' already exists.");
        }
        ServiceError::InvalidUpdatesPayload(details) => {
            eprintln!("ERROR: Invalid JSON for --updates: {details}");
        }
        other => eprintln!("ERROR: {other}"),
    }
}
