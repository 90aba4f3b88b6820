use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StudioError {
    #[error("invalid Google Drive file URL: expected '/d/' was not found in {0}")]
    InvalidFileUrl(String),

    #[error("invalid Google Drive folder URL: expected '/folders/' was not found in {0}")]
    InvalidFolderUrl(String),

    #[error("invalid Google Sheets URL: expected '/d/' was not found in {0}")]
    InvalidSpreadsheetUrl(String),

    #[error("project {project:?} references SIG {sig:?}, which is not in the SIG sheet")]
    #[diagnostic(help("check the SIG Name column of both worksheets for typos"))]
    UnknownSig { sig: String, project: String },

    #[error("SIG {0:?} appears more than once in the SIG sheet")]
    DuplicateSig(String),

    #[error("invalid student name: {0:?}")]
    InvalidStudentName(String),

    #[error("invalid student list: {0}")]
    InvalidStudentList(String),

    #[error("unknown field {field:?} for header alias {header:?} on the {sheet} sheet")]
    UnknownField {
        sheet: String,
        header: String,
        field: String,
    },

    #[error("header alias {header:?} on the {sheet} sheet already maps to {existing:?}, not {field:?}")]
    ConflictingAlias {
        sheet: String,
        header: String,
        existing: String,
        field: String,
    },

    #[error("missing config file studio-docs.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing {0}: pass it on the command line or set it in studio-docs.json")]
    MissingArgument(&'static str),

    #[error("no access token: set STUDIO_DOCS_ACCESS_TOKEN or write {0}")]
    MissingToken(PathBuf),

    #[error("failed to read access token: {0}")]
    TokenRead(String),

    #[error("Google Sheets request failed: {0}")]
    SheetsHttp(String),

    #[error("Google Sheets returned status {status}: {message}")]
    SheetsStatus { status: u16, message: String },

    #[error("worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("Google Drive request failed: {0}")]
    DriveHttp(String),

    #[error("Google Drive returned status {status}: {message}")]
    DriveStatus { status: u16, message: String },

    #[error("failed to read CSV sheet: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
