use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ExportResult, ProgressEvent, ProgressSink};
use crate::generate::{CopyOutcome, GenerateResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_export(result: &ExportResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_generate(result: &GenerateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_export(result: &ExportResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        write_unrecognized(
            &mut stdout,
            &result.unrecognized_sig_columns,
            &result.unrecognized_project_columns,
        )?;
        writeln!(
            stdout,
            "Studio Database successfully parsed and exported to {} ({} SIGs, {} projects)",
            result.output, result.sigs, result.projects
        )
    }

    pub fn print_generate(result: &GenerateResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        write_unrecognized(
            &mut stdout,
            &result.unrecognized_sig_columns,
            &result.unrecognized_project_columns,
        )?;
        for doc in &result.documents {
            match &doc.outcome {
                CopyOutcome::Copied { url, .. } => writeln!(stdout, "{}: {url}", doc.label)?,
                CopyOutcome::Planned => writeln!(stdout, "{} (dry run)", doc.label)?,
                CopyOutcome::Failed { reason } => {
                    writeln!(stderr, "{}: copy failed: {reason}", doc.label)?
                }
            }
        }
        if result.failed() > 0 {
            writeln!(
                stderr,
                "{} of {} documents could not be created",
                result.failed(),
                result.documents.len()
            )?;
        }
        Ok(())
    }
}

fn write_unrecognized<W: Write>(
    writer: &mut W,
    sig_columns: &[String],
    project_columns: &[String],
) -> io::Result<()> {
    for (sheet, columns) in [("SIG info", sig_columns), ("project info", project_columns)] {
        for column in columns {
            writeln!(writer, "Unrecognized column in {sheet} sheet: {column}")?;
        }
    }
    Ok(())
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message)
            }
            None => tracing::debug!("{}", event.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_columns_are_listed_per_sheet() {
        let mut buffer = Vec::new();
        write_unrecognized(
            &mut buffer,
            &["Room".to_string(), "Notes".to_string()],
            &["Budget".to_string()],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Unrecognized column in SIG info sheet: Room\n\
             Unrecognized column in SIG info sheet: Notes\n\
             Unrecognized column in project info sheet: Budget\n"
        );
    }
}
