use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StudioError;
use crate::record::{ProjectRecord, SigRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocuments {
    pub sprint_log: String,
    pub practical_research_canvas: String,
    pub research_research_canvas: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub project_name: String,
    pub students: Vec<String>,
    pub documents: ProjectDocuments,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigEntry {
    pub abbreviation: String,
    pub sig_time: String,
    pub sig_oh_time: String,
    pub sig_heads: Vec<String>,
    pub faculty_mentors: Vec<String>,
    pub students: Vec<String>,
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudioDatabase {
    sigs: IndexMap<String, SigEntry>,
}

impl StudioDatabase {
    /// Joins the SIG and project worksheets into one database.
    ///
    /// A repeated SIG name is a [`StudioError::DuplicateSig`] and a project naming a SIG
    /// that is not in `sigs` is a [`StudioError::UnknownSig`]; neither is recovered from.
    pub fn assemble(
        sigs: Vec<SigRecord>,
        projects: Vec<ProjectRecord>,
    ) -> Result<Self, StudioError> {
        let mut db = Self::default();
        for sig in sigs {
            let SigRecord {
                name,
                abbreviation,
                sig_heads,
                faculty_mentors,
                sig_time,
                sig_oh_time,
            } = sig;
            db.insert(
                name,
                SigEntry {
                    abbreviation,
                    sig_time,
                    sig_oh_time,
                    sig_heads,
                    faculty_mentors,
                    students: Vec::new(),
                    projects: Vec::new(),
                },
            )?;
        }

        for project in projects {
            let Some(entry) = db.sigs.get_mut(&project.sig_name) else {
                return Err(StudioError::UnknownSig {
                    sig: project.sig_name,
                    project: project.project_name,
                });
            };
            entry.students.extend(project.students.iter().cloned());
            entry.projects.push(ProjectEntry {
                project_name: project.project_name,
                students: project.students,
                documents: ProjectDocuments {
                    sprint_log: project.sprint_log,
                    practical_research_canvas: project.practical_research_canvas,
                    research_research_canvas: project.research_research_canvas,
                },
            });
        }

        debug!(sigs = db.len(), "assembled studio database");
        Ok(db)
    }

    pub(crate) fn insert(&mut self, name: String, entry: SigEntry) -> Result<(), StudioError> {
        match self.sigs.entry(name) {
            Entry::Occupied(existing) => Err(StudioError::DuplicateSig(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SigEntry> {
        self.sigs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SigEntry)> {
        self.sigs.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn sig_names(&self) -> Vec<&str> {
        self.sigs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sigs.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.sigs.values().map(|entry| entry.projects.len()).sum()
    }
}
