use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

pub const NAME: &str = "name";
pub const ABBREVIATION: &str = "abbreviation";
pub const SIG_HEADS: &str = "sig_heads";
pub const FACULTY_MENTORS: &str = "faculty_mentors";
pub const SIG_TIME: &str = "sig_time";
pub const SIG_OH_TIME: &str = "sig_oh_time";

pub const SIG_NAME: &str = "sig_name";
pub const STUDENTS: &str = "students";
pub const PROJECT_NAME: &str = "project_name";
pub const SPRINT_LOG: &str = "sprint_log";
pub const PRACTICAL_RESEARCH_CANVAS: &str = "practical_research_canvas";
pub const RESEARCH_RESEARCH_CANVAS: &str = "research_research_canvas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    Sig,
    Project,
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKind::Sig => write!(f, "SIG info"),
            SheetKind::Project => write!(f, "project info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: String,
    pub field: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone)]
pub struct SheetSchema {
    kind: SheetKind,
    columns: Vec<ColumnSpec>,
}

const SIG_COLUMNS: &[(&str, &str, FieldKind)] = &[
    ("SIG Name", NAME, FieldKind::Scalar),
    ("SIG Abbreviation", ABBREVIATION, FieldKind::Scalar),
    ("SIG Heads", SIG_HEADS, FieldKind::List),
    ("Faculty Mentors", FACULTY_MENTORS, FieldKind::List),
    ("SIG Time", SIG_TIME, FieldKind::Scalar),
    ("SIG Office Hours Time", SIG_OH_TIME, FieldKind::Scalar),
];

const PROJECT_COLUMNS: &[(&str, &str, FieldKind)] = &[
    ("SIG Name", SIG_NAME, FieldKind::Scalar),
    ("Students", STUDENTS, FieldKind::List),
    ("Project Name", PROJECT_NAME, FieldKind::Scalar),
    ("Sprint Log Link", SPRINT_LOG, FieldKind::Scalar),
    ("PRC Link", PRACTICAL_RESEARCH_CANVAS, FieldKind::Scalar),
    ("RRC Link", RESEARCH_RESEARCH_CANVAS, FieldKind::Scalar),
];

impl SheetSchema {
    pub fn for_kind(kind: SheetKind) -> Self {
        let table = match kind {
            SheetKind::Sig => SIG_COLUMNS,
            SheetKind::Project => PROJECT_COLUMNS,
        };
        let columns = table
            .iter()
            .map(|&(header, field, kind)| ColumnSpec {
                header: header.to_string(),
                field,
                kind,
            })
            .collect();
        Self { kind, columns }
    }

    pub fn sig() -> Self {
        Self::for_kind(SheetKind::Sig)
    }

    pub fn project() -> Self {
        Self::for_kind(SheetKind::Project)
    }

    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.header == header)
    }

    pub fn fields(&self) -> Vec<(&'static str, FieldKind)> {
        let mut fields: Vec<(&'static str, FieldKind)> = Vec::new();
        for column in &self.columns {
            if !fields.iter().any(|(field, _)| *field == column.field) {
                fields.push((column.field, column.kind));
            }
        }
        fields
    }

    pub fn with_alias(mut self, header: &str, field: &str) -> Result<Self, StudioError> {
        let (field, kind) = self
            .fields()
            .into_iter()
            .find(|(known, _)| *known == field)
            .ok_or_else(|| StudioError::UnknownField {
                sheet: self.kind.to_string(),
                header: header.to_string(),
                field: field.to_string(),
            })?;
        match self.column(header).map(|column| column.field) {
            Some(existing) if existing == field => {}
            Some(existing) => {
                return Err(StudioError::ConflictingAlias {
                    sheet: self.kind.to_string(),
                    header: header.to_string(),
                    existing: existing.to_string(),
                    field: field.to_string(),
                });
            }
            None => self.columns.push(ColumnSpec {
                header: header.to_string(),
                field,
                kind,
            }),
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sig_schema_list_fields() {
        let schema = SheetSchema::sig();
        assert_eq!(schema.column("SIG Heads").unwrap().kind, FieldKind::List);
        assert_eq!(
            schema.column("Faculty Mentors").unwrap().kind,
            FieldKind::List
        );
        assert_eq!(schema.column("SIG Time").unwrap().kind, FieldKind::Scalar);
        assert!(schema.column("sig heads").is_none());
    }

    #[test]
    fn alias_conflicting_with_known_header() {
        let err = SheetSchema::sig()
            .with_alias("SIG Time", ABBREVIATION)
            .unwrap_err();
        assert_matches!(
            err,
            StudioError::ConflictingAlias { ref existing, ref field, .. }
                if existing == SIG_TIME && field == ABBREVIATION
        );

        let schema = SheetSchema::sig().with_alias("SIG Time", SIG_TIME).unwrap();
        assert_eq!(schema.columns().len(), 6);
    }

    #[test]
    fn alias_inherits_kind() {
        let schema = SheetSchema::project()
            .with_alias("Team Members", STUDENTS)
            .unwrap();
        let alias = schema.column("Team Members").unwrap();
        assert_eq!(alias.field, STUDENTS);
        assert_eq!(alias.kind, FieldKind::List);
        assert_eq!(schema.fields().len(), 6);
    }

    #[test]
    fn alias_for_unknown_field() {
        let err = SheetSchema::sig()
            .with_alias("Room", "room")
            .unwrap_err();
        assert_matches!(err, StudioError::UnknownField { .. });
    }
}
