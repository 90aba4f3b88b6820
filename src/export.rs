use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::database::{ProjectDocuments, ProjectEntry, SigEntry, StudioDatabase};
use crate::error::StudioError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocuments {
    #[serde(rename = "Sprint Log")]
    pub sprint_log: String,
    #[serde(rename = "Practical Research Canvas")]
    pub practical_research_canvas: String,
    #[serde(rename = "Research Research Canvas")]
    pub research_research_canvas: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedProject {
    pub project_name: String,
    pub students: Vec<String>,
    pub documents: ExportedDocuments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSig {
    pub name: String,
    pub abbreviation: String,
    pub sig_time: String,
    pub sig_oh_time: String,
    pub sig_heads: Vec<String>,
    pub faculty_mentors: Vec<String>,
    pub students: Vec<String>,
    pub projects: Vec<ExportedProject>,
}

impl From<&ProjectDocuments> for ExportedDocuments {
    fn from(value: &ProjectDocuments) -> Self {
        Self {
            sprint_log: value.sprint_log.clone(),
            practical_research_canvas: value.practical_research_canvas.clone(),
            research_research_canvas: value.research_research_canvas.clone(),
        }
    }
}

impl From<ExportedDocuments> for ProjectDocuments {
    fn from(value: ExportedDocuments) -> Self {
        Self {
            sprint_log: value.sprint_log,
            practical_research_canvas: value.practical_research_canvas,
            research_research_canvas: value.research_research_canvas,
        }
    }
}

pub fn to_exported(db: &StudioDatabase) -> Vec<ExportedSig> {
    db.iter()
        .map(|(name, sig)| ExportedSig {
            name: name.to_string(),
            abbreviation: sig.abbreviation.clone(),
            sig_time: sig.sig_time.clone(),
            sig_oh_time: sig.sig_oh_time.clone(),
            sig_heads: sig.sig_heads.clone(),
            faculty_mentors: sig.faculty_mentors.clone(),
            students: sig.students.clone(),
            projects: sig
                .projects
                .iter()
                .map(|project| ExportedProject {
                    project_name: project.project_name.clone(),
                    students: project.students.clone(),
                    documents: ExportedDocuments::from(&project.documents),
                })
                .collect(),
        })
        .collect()
}

impl StudioDatabase {
    /// Rebuilds a database from its exported form, keyed by each element's `name`.
    pub fn from_exported(sigs: Vec<ExportedSig>) -> Result<Self, StudioError> {
        let mut db = Self::default();
        for sig in sigs {
            let projects = sig
                .projects
                .into_iter()
                .map(|project| ProjectEntry {
                    project_name: project.project_name,
                    students: project.students,
                    documents: project.documents.into(),
                })
                .collect();
            db.insert(
                sig.name,
                SigEntry {
                    abbreviation: sig.abbreviation,
                    sig_time: sig.sig_time,
                    sig_oh_time: sig.sig_oh_time,
                    sig_heads: sig.sig_heads,
                    faculty_mentors: sig.faculty_mentors,
                    students: sig.students,
                    projects,
                },
            )?;
        }
        Ok(db)
    }
}

pub fn to_json_string(db: &StudioDatabase) -> Result<String, StudioError> {
    let exported = to_exported(db);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    exported
        .serialize(&mut serializer)
        .map_err(|err| StudioError::Json(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| StudioError::Json(err.to_string()))
}

pub fn export_json<W: Write>(db: &StudioDatabase, mut writer: W) -> Result<String, StudioError> {
    let json = to_json_string(db)?;
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|err| StudioError::Filesystem(err.to_string()))?;
    Ok(json)
}

pub fn write_studio_db(db: &StudioDatabase, path: &Path) -> Result<String, StudioError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| StudioError::Filesystem(err.to_string()))?;
    let mut builder = tempfile::Builder::new();
    builder.prefix("studio-db");
    // Temp files are created 0600; the export gets the usual umask-derived mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    let mut temp = builder
        .tempfile_in(parent)
        .map_err(|err| StudioError::Filesystem(err.to_string()))?;
    let json = export_json(db, io::BufWriter::new(temp.as_file_mut()))?;
    temp.persist(path)
        .map_err(|err| StudioError::Filesystem(err.to_string()))?;
    Ok(json)
}

pub fn read_studio_db(path: &Path) -> Result<StudioDatabase, StudioError> {
    let content = fs::read_to_string(path)
        .map_err(|err| StudioError::Filesystem(format!("read {}: {err}", path.display())))?;
    let sigs: Vec<ExportedSig> =
        serde_json::from_str(&content).map_err(|err| StudioError::Json(err.to_string()))?;
    StudioDatabase::from_exported(sigs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ProjectRecord, SigRecord};

    fn sample() -> StudioDatabase {
        StudioDatabase::assemble(
            vec![SigRecord {
                name: "Robotics".to_string(),
                abbreviation: "RBT".to_string(),
                sig_heads: vec!["Alice".to_string()],
                faculty_mentors: Vec::new(),
                sig_time: "Mon 3pm".to_string(),
                sig_oh_time: "Tue 4pm".to_string(),
            }],
            vec![ProjectRecord {
                sig_name: "Robotics".to_string(),
                students: vec!["Carl".to_string()],
                project_name: "ArmBot".to_string(),
                sprint_log: "link1".to_string(),
                practical_research_canvas: "link2".to_string(),
                research_research_canvas: "link3".to_string(),
            }],
        )
        .unwrap()
    }

    #[test]
    fn json_uses_four_spaces_and_labels() {
        let json = to_json_string(&sample()).unwrap();
        assert!(json.starts_with("[\n    {\n        \"name\": \"Robotics\","));
        assert!(json.contains("\"Sprint Log\": \"link1\""));
        assert!(json.contains("\"Practical Research Canvas\": \"link2\""));
        assert!(json.contains("\"Research Research Canvas\": \"link3\""));
        assert!(json.contains("\"faculty_mentors\": [],"));
        assert!(!json.contains("sprint_log"));
    }

    #[test]
    fn export_json_returns_what_it_writes() {
        let mut written = Vec::new();
        let json = export_json(&sample(), &mut written).unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), json);
    }
}
