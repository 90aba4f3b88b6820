use indexmap::IndexMap;
use tracing::{debug, info};

use crate::schema::{ColumnSpec, FieldKind, SheetSchema};

pub type RawSheet = Vec<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderResolution {
    pub columns: Vec<(usize, ColumnSpec)>,
    pub unrecognized: Vec<String>,
}

impl HeaderResolution {
    pub fn indices(&self) -> Vec<usize> {
        self.columns.iter().map(|(index, _)| *index).collect()
    }
}

pub fn resolve_header(header: &[String], schema: &SheetSchema) -> HeaderResolution {
    let mut resolution = HeaderResolution::default();
    for (index, text) in header.iter().enumerate() {
        match schema.column(text) {
            Some(column) => resolution.columns.push((index, column.clone())),
            None => resolution.unrecognized.push(text.clone()),
        }
    }
    resolution
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar => FieldValue::Scalar(String::new()),
            FieldKind::List => FieldValue::List(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    values: IndexMap<&'static str, FieldValue>,
}

impl CanonicalRow {
    pub fn with_defaults(schema: &SheetSchema) -> Self {
        let values = schema
            .fields()
            .into_iter()
            .map(|(field, kind)| (field, FieldValue::default_for(kind)))
            .collect();
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn scalar(&self, field: &str) -> &str {
        match self.values.get(field) {
            Some(FieldValue::Scalar(value)) => value,
            _ => "",
        }
    }

    pub fn list(&self, field: &str) -> &[String] {
        match self.values.get(field) {
            Some(FieldValue::List(values)) => values,
            _ => &[],
        }
    }

    pub fn take_scalar(&mut self, field: &str) -> String {
        match self.values.get_mut(field) {
            Some(FieldValue::Scalar(value)) => std::mem::take(value),
            _ => String::new(),
        }
    }

    pub fn take_list(&mut self, field: &str) -> Vec<String> {
        match self.values.get_mut(field) {
            Some(FieldValue::List(values)) => std::mem::take(values),
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, column: &ColumnSpec, cell: &str) {
        let slot = self
            .values
            .entry(column.field)
            .or_insert_with(|| FieldValue::default_for(column.kind));
        match slot {
            FieldValue::List(values) => {
                values.extend(cell.split(',').map(|piece| piece.trim().to_string()));
            }
            FieldValue::Scalar(value) => *value = cell.trim().to_string(),
        }
    }
}

/// Normalizes one data row. Cells past the end of a short row keep their defaults.
pub fn normalize_row(
    row: &[String],
    resolution: &HeaderResolution,
    schema: &SheetSchema,
) -> CanonicalRow {
    let mut canonical = CanonicalRow::with_defaults(schema);
    for (index, column) in &resolution.columns {
        if let Some(cell) = row.get(*index) {
            canonical.apply(column, cell);
        }
    }
    canonical
}

pub trait FromCanonicalRow: Sized {
    fn from_canonical(row: CanonicalRow) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub unrecognized: Vec<String>,
}

pub fn extract_sheet<T: FromCanonicalRow>(
    sheet: &[Vec<String>],
    schema: &SheetSchema,
) -> Extraction<T> {
    let Some((header, rows)) = sheet.split_first() else {
        debug!(sheet = %schema.kind(), "empty worksheet");
        return Extraction {
            records: Vec::new(),
            unrecognized: Vec::new(),
        };
    };

    let resolution = resolve_header(header, schema);
    if !resolution.unrecognized.is_empty() {
        info!(
            sheet = %schema.kind(),
            columns = ?resolution.unrecognized,
            "columns not in the header mapping are left out of the studio database"
        );
    }

    let records = rows
        .iter()
        .map(|row| T::from_canonical(normalize_row(row, &resolution, schema)))
        .collect::<Vec<_>>();
    info!(sheet = %schema.kind(), rows = records.len(), "extracted worksheet");

    Extraction {
        records,
        unrecognized: resolution.unrecognized,
    }
}
