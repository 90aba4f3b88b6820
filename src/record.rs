use serde::{Deserialize, Serialize};

use crate::extract::{CanonicalRow, FromCanonicalRow};
use crate::schema::{
    ABBREVIATION, FACULTY_MENTORS, NAME, PRACTICAL_RESEARCH_CANVAS, PROJECT_NAME,
    RESEARCH_RESEARCH_CANVAS, SIG_HEADS, SIG_NAME, SIG_OH_TIME, SIG_TIME, SPRINT_LOG, STUDENTS,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigRecord {
    pub name: String,
    pub abbreviation: String,
    pub sig_heads: Vec<String>,
    pub faculty_mentors: Vec<String>,
    pub sig_time: String,
    pub sig_oh_time: String,
}

impl FromCanonicalRow for SigRecord {
    fn from_canonical(mut row: CanonicalRow) -> Self {
        Self {
            name: row.take_scalar(NAME),
            abbreviation: row.take_scalar(ABBREVIATION),
            sig_heads: row.take_list(SIG_HEADS),
            faculty_mentors: row.take_list(FACULTY_MENTORS),
            sig_time: row.take_scalar(SIG_TIME),
            sig_oh_time: row.take_scalar(SIG_OH_TIME),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub sig_name: String,
    pub students: Vec<String>,
    pub project_name: String,
    pub sprint_log: String,
    pub practical_research_canvas: String,
    pub research_research_canvas: String,
}

impl FromCanonicalRow for ProjectRecord {
    fn from_canonical(mut row: CanonicalRow) -> Self {
        Self {
            sig_name: row.take_scalar(SIG_NAME),
            students: row.take_list(STUDENTS),
            project_name: row.take_scalar(PROJECT_NAME),
            sprint_log: row.take_scalar(SPRINT_LOG),
            practical_research_canvas: row.take_scalar(PRACTICAL_RESEARCH_CANVAS),
            research_research_canvas: row.take_scalar(RESEARCH_RESEARCH_CANVAS),
        }
    }
}
