use serde::Serialize;
use tracing::{info, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::database::StudioDatabase;
use crate::drive::DriveClient;
use crate::error::StudioError;
use crate::ids::{FileId, FolderId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    SprintLog,
    EoqChecklist { quarter: String },
    TheWeekly { quarter: String },
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::SprintLog => "sprint-log",
            DocumentKind::EoqChecklist { .. } => "eoq-checklist",
            DocumentKind::TheWeekly { .. } => "the-weekly",
        }
    }

    pub fn plan(&self, db: &StudioDatabase) -> Vec<PlannedDocument> {
        let mut planned = Vec::new();
        for (sig_name, sig) in db.iter() {
            match self {
                DocumentKind::SprintLog => {
                    for project in &sig.projects {
                        let name = format!("[{}] {}", sig.abbreviation, project.project_name);
                        planned.push(PlannedDocument {
                            label: format!("Sprint Log for {name}"),
                            name,
                        });
                    }
                }
                DocumentKind::EoqChecklist { quarter } => {
                    for project in &sig.projects {
                        planned.push(PlannedDocument::named(format!(
                            "[{}] {} {quarter} End-of-Quarter Checklist",
                            sig.abbreviation, project.project_name
                        )));
                    }
                }
                DocumentKind::TheWeekly { quarter } => {
                    for student in &sig.students {
                        match first_name(student) {
                            Ok(first) => planned.push(PlannedDocument::named(format!(
                                "{first} -- The Weekly {quarter}"
                            ))),
                            Err(_) => warn!(sig = sig_name, "skipping blank student entry"),
                        }
                    }
                }
            }
        }
        planned
    }
}

pub fn plan_ipm(students: &[String]) -> Result<Vec<PlannedDocument>, StudioError> {
    students
        .iter()
        .map(|student| {
            let first = first_name(student)?;
            let initial = last_initial(student)?;
            Ok(PlannedDocument::named(format!(
                "{first} {initial}. -- Individual Progress Map"
            )))
        })
        .collect()
}

pub fn first_name(student: &str) -> Result<&str, StudioError> {
    student
        .split_whitespace()
        .next()
        .ok_or_else(|| StudioError::InvalidStudentName(student.to_string()))
}

pub fn last_initial(student: &str) -> Result<char, StudioError> {
    student
        .split_whitespace()
        .last()
        .and_then(|last| last.chars().next())
        .ok_or_else(|| StudioError::InvalidStudentName(student.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDocument {
    pub label: String,
    pub name: String,
}

impl PlannedDocument {
    pub fn named(name: String) -> Self {
        Self {
            label: name.clone(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CopyOutcome {
    Copied { id: FileId, url: String },
    Failed { reason: String },
    Planned,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub label: String,
    pub name: String,
    pub outcome: CopyOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub kind: String,
    pub documents: Vec<GeneratedDocument>,
    pub unrecognized_sig_columns: Vec<String>,
    pub unrecognized_project_columns: Vec<String>,
}

impl GenerateResult {
    pub fn copied(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| matches!(doc.outcome, CopyOutcome::Copied { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| matches!(doc.outcome, CopyOutcome::Failed { .. }))
            .count()
    }
}

/// Copies the template once per planned document. A failed copy is recorded and the
/// remaining documents are still attempted.
pub fn copy_documents<D: DriveClient + ?Sized>(
    drive: &D,
    template: &FileId,
    folder: &FolderId,
    planned: Vec<PlannedDocument>,
    dry_run: bool,
    sink: &dyn ProgressSink,
) -> Vec<GeneratedDocument> {
    let total = planned.len();
    let mut documents = Vec::with_capacity(total);
    for (index, doc) in planned.into_iter().enumerate() {
        sink.event(ProgressEvent {
            message: format!("phase=Copy; {}/{total} {}", index + 1, doc.name),
            elapsed: None,
        });
        let outcome = if dry_run {
            CopyOutcome::Planned
        } else {
            let start = std::time::Instant::now();
            let result = drive.copy_file(template, folder, &doc.name);
            sink.event(ProgressEvent {
                message: "drive.response".to_string(),
                elapsed: Some(start.elapsed()),
            });
            match result {
                Ok(copied) => {
                    info!(name = %doc.name, id = %copied.id, "copied template");
                    CopyOutcome::Copied {
                        url: copied.id.edit_url(),
                        id: copied.id,
                    }
                }
                Err(err) => {
                    warn!(name = %doc.name, error = %err, "copy failed");
                    CopyOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            }
        };
        documents.push(GeneratedDocument {
            label: doc.label,
            name: doc.name,
            outcome,
        });
    }
    documents
}
