use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use studio_docs::app::{App, DatabaseSource};
use studio_docs::auth::{EnvTokenProvider, LazyToken, TokenProvider};
use studio_docs::config::{ConfigLoader, ResolvedConfig};
use studio_docs::drive::{DriveClient, DriveHttpClient};
use studio_docs::error::StudioError;
use studio_docs::generate::{DocumentKind, GenerateResult};
use studio_docs::ids::{FileId, FolderId, SpreadsheetId};
use studio_docs::output::{JsonOutput, OutputMode, TextOutput};
use studio_docs::sheets::{CsvSheetSource, SheetSource, SheetsHttpClient};

#[derive(Parser)]
#[command(name = "studio-docs")]
#[command(about = "Export the Studio Database and generate per-project documents in Google Drive")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    /// Read worksheets from `<dir>/<sheet>.csv` instead of Google Sheets.
    #[arg(long, global = true)]
    csv_dir: Option<Utf8PathBuf>,

    /// Read a previously exported studio_db.json instead of the spreadsheet.
    #[arg(long, global = true)]
    studio_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Export the Studio Database to JSON")]
    Export(ExportArgs),
    #[command(about = "Create one sprint log per project")]
    SprintLogs(ProjectDocArgs),
    #[command(about = "Create one end-of-quarter checklist per project")]
    EoqChecklists(QuarterDocArgs),
    #[command(about = "Create one weekly document per student")]
    TheWeekly(QuarterDocArgs),
    #[command(about = "Create one Individual Progress Map per student")]
    Ipm(IpmArgs),
    #[command(about = "Copy a single file into a folder")]
    Copy(CopyArgs),
}

#[derive(Args, Clone, Default)]
struct DatabaseArgs {
    studio_db_url: Option<String>,
    sig_sheet: Option<String>,
    project_sheet: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ProjectDocArgs {
    template_url: String,
    folder_url: String,

    #[command(flatten)]
    database: DatabaseArgs,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct QuarterDocArgs {
    template_url: String,
    folder_url: String,
    quarter: String,

    #[command(flatten)]
    database: DatabaseArgs,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct IpmArgs {
    template_url: String,
    folder_url: String,
    /// JSON array of student names.
    students_json: String,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct CopyArgs {
    file_url: String,
    folder_url: String,
    name: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(studio) = report.downcast_ref::<StudioError>() {
            return ExitCode::from(map_exit_code(studio));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &StudioError) -> u8 {
    match error {
        StudioError::InvalidFileUrl(_)
        | StudioError::InvalidFolderUrl(_)
        | StudioError::InvalidSpreadsheetUrl(_)
        | StudioError::UnknownSig { .. }
        | StudioError::DuplicateSig(_)
        | StudioError::InvalidStudentName(_)
        | StudioError::InvalidStudentList(_)
        | StudioError::UnknownField { .. }
        | StudioError::ConflictingAlias { .. }
        | StudioError::MissingConfig
        | StudioError::MissingArgument(_)
        | StudioError::MissingToken(_)
        | StudioError::SheetNotFound(_) => 2,
        StudioError::SheetsHttp(_)
        | StudioError::SheetsStatus { .. }
        | StudioError::DriveHttp(_)
        | StudioError::DriveStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve_or_default(cli.config.as_deref())?;
    let token: Arc<dyn TokenProvider> = Arc::new(LazyToken::new(EnvTokenProvider::new()?));
    let drive = DriveHttpClient::new(Arc::clone(&token))?;
    let context = RunContext {
        studio_db: cli.studio_db,
        output_mode,
    };

    match cli.csv_dir {
        Some(dir) => {
            let app = App::new(CsvSheetSource::new(dir), drive, config);
            run_command(cli.command, &app, &context)
        }
        None => {
            let sheets = SheetsHttpClient::new(token)?;
            let app = App::new(sheets, drive, config);
            run_command(cli.command, &app, &context)
        }
    }
}

struct RunContext {
    studio_db: Option<PathBuf>,
    output_mode: OutputMode,
}

fn run_command<S: SheetSource, D: DriveClient>(
    command: Commands,
    app: &App<S, D>,
    context: &RunContext,
) -> miette::Result<()> {
    match command {
        Commands::Export(args) => run_export(args, app, context),
        Commands::SprintLogs(args) => {
            let (template, folder) = parse_targets(&args.template_url, &args.folder_url)?;
            let source = database_source(args.database, context, app.config())?;
            run_generate(
                &DocumentKind::SprintLog,
                &source,
                &template,
                &folder,
                args.dry_run,
                app,
                context.output_mode,
            )
        }
        Commands::EoqChecklists(args) => {
            let (template, folder) = parse_targets(&args.template_url, &args.folder_url)?;
            let source = database_source(args.database, context, app.config())?;
            let kind = DocumentKind::EoqChecklist {
                quarter: args.quarter,
            };
            run_generate(
                &kind,
                &source,
                &template,
                &folder,
                args.dry_run,
                app,
                context.output_mode,
            )
        }
        Commands::TheWeekly(args) => {
            let (template, folder) = parse_targets(&args.template_url, &args.folder_url)?;
            let source = database_source(args.database, context, app.config())?;
            let kind = DocumentKind::TheWeekly {
                quarter: args.quarter,
            };
            run_generate(
                &kind,
                &source,
                &template,
                &folder,
                args.dry_run,
                app,
                context.output_mode,
            )
        }
        Commands::Ipm(args) => {
            let (template, folder) = parse_targets(&args.template_url, &args.folder_url)?;
            let students = parse_students(&args.students_json)?;
            let result = match context.output_mode {
                OutputMode::NonInteractive => {
                    app.generate_ipm(&students, &template, &folder, args.dry_run, &JsonOutput)?
                }
                OutputMode::Interactive => {
                    app.generate_ipm(&students, &template, &folder, args.dry_run, &TextOutput)?
                }
            };
            print_generate(&result, context.output_mode)
        }
        Commands::Copy(args) => {
            let (template, folder) = parse_targets(&args.file_url, &args.folder_url)?;
            let result = match context.output_mode {
                OutputMode::NonInteractive => app.copy(&template, &folder, &args.name, &JsonOutput)?,
                OutputMode::Interactive => app.copy(&template, &folder, &args.name, &TextOutput)?,
            };
            print_generate(&result, context.output_mode)
        }
    }
}

fn run_export<S: SheetSource, D: DriveClient>(
    args: ExportArgs,
    app: &App<S, D>,
    context: &RunContext,
) -> miette::Result<()> {
    let source = database_source(args.database, context, app.config())?;
    let output = args.output.unwrap_or_else(|| app.config().output.clone());
    match context.output_mode {
        OutputMode::NonInteractive => {
            let result = app.export(&source, &output, &JsonOutput)?;
            JsonOutput::print_export(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = app.export(&source, &output, &TextOutput)?;
            TextOutput::print_export(&result).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_generate<S: SheetSource, D: DriveClient>(
    kind: &DocumentKind,
    source: &DatabaseSource,
    template: &FileId,
    folder: &FolderId,
    dry_run: bool,
    app: &App<S, D>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let result = match output_mode {
        OutputMode::NonInteractive => {
            app.generate(kind, source, template, folder, dry_run, &JsonOutput)?
        }
        OutputMode::Interactive => {
            app.generate(kind, source, template, folder, dry_run, &TextOutput)?
        }
    };
    print_generate(&result, output_mode)
}

fn print_generate(result: &GenerateResult, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_generate(result).into_diagnostic(),
        OutputMode::Interactive => TextOutput::print_generate(result).into_diagnostic(),
    }
}

fn parse_targets(template_url: &str, folder_url: &str) -> Result<(FileId, FolderId), StudioError> {
    Ok((template_url.parse()?, folder_url.parse()?))
}

fn parse_students(json: &str) -> Result<Vec<String>, StudioError> {
    serde_json::from_str(json).map_err(|err| StudioError::InvalidStudentList(err.to_string()))
}

fn database_source(
    args: DatabaseArgs,
    context: &RunContext,
    config: &ResolvedConfig,
) -> Result<DatabaseSource, StudioError> {
    if let Some(path) = &context.studio_db {
        return Ok(DatabaseSource::Exported(path.clone()));
    }
    let id = match args.studio_db_url {
        Some(url) => url.parse::<SpreadsheetId>()?,
        None => config
            .studio_db
            .clone()
            .ok_or(StudioError::MissingArgument("studio database URL"))?,
    };
    let sig_sheet = args
        .sig_sheet
        .or_else(|| config.sig_sheet.clone())
        .ok_or(StudioError::MissingArgument("SIG sheet name"))?;
    let project_sheet = args
        .project_sheet
        .or_else(|| config.project_sheet.clone())
        .ok_or(StudioError::MissingArgument("project sheet name"))?;
    Ok(DatabaseSource::Spreadsheet {
        id,
        sig_sheet,
        project_sheet,
    })
}
