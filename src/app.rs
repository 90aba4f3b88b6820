use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::database::StudioDatabase;
use crate::drive::DriveClient;
use crate::error::StudioError;
use crate::export::{read_studio_db, write_studio_db};
use crate::extract::extract_sheet;
use crate::generate::{DocumentKind, GenerateResult, PlannedDocument, copy_documents, plan_ipm};
use crate::ids::{FileId, FolderId, SpreadsheetId};
use crate::record::{ProjectRecord, SigRecord};
use crate::sheets::SheetSource;

#[derive(Debug, Clone)]
pub enum DatabaseSource {
    Spreadsheet {
        id: SpreadsheetId,
        sig_sheet: String,
        project_sheet: String,
    },
    Exported(PathBuf),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub output: String,
    pub sigs: usize,
    pub projects: usize,
    pub unrecognized_sig_columns: Vec<String>,
    pub unrecognized_project_columns: Vec<String>,
    #[serde(skip)]
    pub json: String,
}

#[derive(Debug, Clone)]
pub struct LoadedDatabase {
    pub db: StudioDatabase,
    pub unrecognized_sig_columns: Vec<String>,
    pub unrecognized_project_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<S: SheetSource, D: DriveClient> {
    sheets: S,
    drive: D,
    config: ResolvedConfig,
}

impl<S: SheetSource, D: DriveClient> App<S, D> {
    pub fn new(sheets: S, drive: D, config: ResolvedConfig) -> Self {
        Self {
            sheets,
            drive,
            config,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn load_database(
        &self,
        source: &DatabaseSource,
        sink: &dyn ProgressSink,
    ) -> Result<LoadedDatabase, StudioError> {
        match source {
            DatabaseSource::Exported(path) => {
                sink.event(ProgressEvent {
                    message: format!("phase=Resolve; reading {}", path.display()),
                    elapsed: None,
                });
                Ok(LoadedDatabase {
                    db: read_studio_db(path)?,
                    unrecognized_sig_columns: Vec::new(),
                    unrecognized_project_columns: Vec::new(),
                })
            }
            DatabaseSource::Spreadsheet {
                id,
                sig_sheet,
                project_sheet,
            } => {
                sink.event(ProgressEvent {
                    message: format!("phase=Fetch; worksheet {sig_sheet}"),
                    elapsed: None,
                });
                let start = Instant::now();
                let sig_values = self.sheets.fetch_sheet(id, sig_sheet)?;
                sink.event(ProgressEvent {
                    message: format!("phase=Fetch; worksheet {project_sheet}"),
                    elapsed: Some(start.elapsed()),
                });
                let project_values = self.sheets.fetch_sheet(id, project_sheet)?;

                sink.event(ProgressEvent {
                    message: "phase=Extract; normalizing rows".to_string(),
                    elapsed: Some(start.elapsed()),
                });
                let sigs = extract_sheet::<SigRecord>(&sig_values, &self.config.sig_schema);
                let projects =
                    extract_sheet::<ProjectRecord>(&project_values, &self.config.project_schema);

                sink.event(ProgressEvent {
                    message: "phase=Assemble; joining projects to SIGs".to_string(),
                    elapsed: None,
                });
                let db = StudioDatabase::assemble(sigs.records, projects.records)?;
                Ok(LoadedDatabase {
                    db,
                    unrecognized_sig_columns: sigs.unrecognized,
                    unrecognized_project_columns: projects.unrecognized,
                })
            }
        }
    }

    pub fn export(
        &self,
        source: &DatabaseSource,
        output: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<ExportResult, StudioError> {
        let loaded = self.load_database(source, sink)?;
        sink.event(ProgressEvent {
            message: format!("phase=Store; writing {}", output.display()),
            elapsed: None,
        });
        let json = write_studio_db(&loaded.db, output)?;
        Ok(ExportResult {
            output: output.display().to_string(),
            sigs: loaded.db.len(),
            projects: loaded.db.project_count(),
            unrecognized_sig_columns: loaded.unrecognized_sig_columns,
            unrecognized_project_columns: loaded.unrecognized_project_columns,
            json,
        })
    }

    pub fn generate(
        &self,
        kind: &DocumentKind,
        source: &DatabaseSource,
        template: &FileId,
        folder: &FolderId,
        dry_run: bool,
        sink: &dyn ProgressSink,
    ) -> Result<GenerateResult, StudioError> {
        let loaded = self.load_database(source, sink)?;
        let planned = kind.plan(&loaded.db);
        sink.event(ProgressEvent {
            message: format!("phase=Plan; {} {} documents", planned.len(), kind.as_str()),
            elapsed: None,
        });
        let documents = copy_documents(&self.drive, template, folder, planned, dry_run, sink);
        Ok(GenerateResult {
            kind: kind.as_str().to_string(),
            documents,
            unrecognized_sig_columns: loaded.unrecognized_sig_columns,
            unrecognized_project_columns: loaded.unrecognized_project_columns,
        })
    }

    pub fn generate_ipm(
        &self,
        students: &[String],
        template: &FileId,
        folder: &FolderId,
        dry_run: bool,
        sink: &dyn ProgressSink,
    ) -> Result<GenerateResult, StudioError> {
        let planned = plan_ipm(students)?;
        let documents = copy_documents(&self.drive, template, folder, planned, dry_run, sink);
        Ok(GenerateResult {
            kind: "ipm".to_string(),
            documents,
            unrecognized_sig_columns: Vec::new(),
            unrecognized_project_columns: Vec::new(),
        })
    }

    pub fn copy(
        &self,
        template: &FileId,
        folder: &FolderId,
        name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<GenerateResult, StudioError> {
        let planned = vec![PlannedDocument::named(name.to_string())];
        let documents = copy_documents(&self.drive, template, folder, planned, false, sink);
        Ok(GenerateResult {
            kind: "copy".to_string(),
            documents,
            unrecognized_sig_columns: Vec::new(),
            unrecognized_project_columns: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::drive::CopiedFile;
    use crate::extract::RawSheet;
    use crate::generate::CopyOutcome;
    use crate::output::JsonOutput;

    struct FixedSheets;

    impl SheetSource for FixedSheets {
        fn fetch_sheet(
            &self,
            _spreadsheet: &SpreadsheetId,
            sheet_name: &str,
        ) -> Result<RawSheet, StudioError> {
            let rows: Vec<Vec<&str>> = match sheet_name {
                "SIGs" => vec![vec!["SIG Name", "SIG Abbreviation"], vec!["Robotics", "RBT"]],
                "Projects" => vec![
                    vec!["SIG Name", "Students", "Project Name"],
                    vec!["Robotics", "Carl, Dana", "ArmBot"],
                    vec!["Robotics", "Eve", "LegBot"],
                ],
                _ => return Err(StudioError::SheetNotFound(sheet_name.to_string())),
            };
            Ok(rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect())
        }
    }

    #[derive(Default)]
    struct FlakyDrive {
        names: Mutex<Vec<String>>,
    }

    impl DriveClient for FlakyDrive {
        fn copy_file(
            &self,
            _source: &FileId,
            _folder: &FolderId,
            name: &str,
        ) -> Result<CopiedFile, StudioError> {
            let mut guard = self.names.lock().unwrap();
            guard.push(name.to_string());
            if guard.len() == 1 {
                return Err(StudioError::DriveStatus {
                    status: 403,
                    message: "rate limited".to_string(),
                });
            }
            Ok(CopiedFile {
                id: FileId::from_raw(format!("copy{}", guard.len())),
                name: Some(name.to_string()),
            })
        }
    }

    fn spreadsheet() -> DatabaseSource {
        DatabaseSource::Spreadsheet {
            id: "/d/studio".parse().unwrap(),
            sig_sheet: "SIGs".to_string(),
            project_sheet: "Projects".to_string(),
        }
    }

    #[test]
    fn failed_copy_does_not_stop_the_run() {
        let app = App::new(FixedSheets, FlakyDrive::default(), ResolvedConfig::default());
        let template: FileId = "https://docs.google.com/spreadsheets/d/tpl/edit".parse().unwrap();
        let folder: FolderId = "https://drive.google.com/drive/folders/out".parse().unwrap();

        let result = app
            .generate(
                &DocumentKind::SprintLog,
                &spreadsheet(),
                &template,
                &folder,
                false,
                &JsonOutput,
            )
            .unwrap();

        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.copied(), 1);
        assert_eq!(result.documents[0].label, "Sprint Log for [RBT] ArmBot");
        match &result.documents[1].outcome {
            CopyOutcome::Copied { url, .. } => {
                assert_eq!(url, "https://docs.google.com/spreadsheets/d/copy2/edit")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn dry_run_never_copies() {
        let drive = FlakyDrive::default();
        let app = App::new(FixedSheets, drive, ResolvedConfig::default());
        let template: FileId = "/d/tpl/".parse().unwrap();
        let folder: FolderId = "/folders/out".parse().unwrap();

        let result = app
            .generate(
                &DocumentKind::TheWeekly {
                    quarter: "Fall 2026".to_string(),
                },
                &spreadsheet(),
                &template,
                &folder,
                true,
                &JsonOutput,
            )
            .unwrap();

        let names: Vec<_> = result.documents.iter().map(|doc| doc.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Carl -- The Weekly Fall 2026",
                "Dana -- The Weekly Fall 2026",
                "Eve -- The Weekly Fall 2026"
            ]
        );
        assert!(app.drive.names.lock().unwrap().is_empty());
    }
}
