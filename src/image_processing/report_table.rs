//! End-of-run table for `--report`
//!
//! Rows are captured as owned strings while the run progresses, because the
//! per-file reports themselves are only borrowed by the observer.

use prettytable::{format, Cell, Row, Table};

use super::{ConversionOutcome, ConversionReport};
use crate::utils::{display_name, format_megabytes};

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub input: String,
    pub output: String,
    pub mode: String,
    pub conversion: String,
    pub before: String,
    pub after: String,
    pub status: String,
}

impl ReportEntry {
    pub fn from_report(report: &ConversionReport) -> Self {
        let mode = report
            .file
            .mode
            .map(|mode| mode.to_string())
            .unwrap_or_else(|| "-".to_string());
        let before = report
            .file
            .byte_size
            .map(format_megabytes)
            .unwrap_or_else(|| "-".to_string());

        match &report.outcome {
            ConversionOutcome::Converted {
                output,
                conversion,
                converted_bytes,
                removed_original,
                ..
            } => Self {
                input: display_name(&report.file.path),
                output: display_name(output),
                mode,
                conversion: conversion.to_string(),
                before,
                after: format_megabytes(*converted_bytes),
                status: if *removed_original {
                    "replaced".to_string()
                } else {
                    "converted".to_string()
                },
            },
            ConversionOutcome::Skipped(_) => Self {
                input: display_name(&report.file.path),
                output: "-".to_string(),
                mode,
                conversion: "-".to_string(),
                before,
                after: "-".to_string(),
                status: "already PNG".to_string(),
            },
            ConversionOutcome::Failed(_) => Self {
                input: display_name(&report.file.path),
                output: "-".to_string(),
                mode,
                conversion: "-".to_string(),
                before,
                after: "-".to_string(),
                status: "failed".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversionTable {
    pub entries: Vec<ReportEntry>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, report: &ConversionReport) {
        self.entries.push(ReportEntry::from_report(report));
    }

    pub fn build(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.add_row(Row::new(vec![
            Cell::new("Input"),
            Cell::new("Output"),
            Cell::new("Mode"),
            Cell::new("Conversion"),
            Cell::new("Before"),
            Cell::new("After"),
            Cell::new("Status"),
        ]));

        for entry in &self.entries {
            table.add_row(Row::new(vec![
                Cell::new(&entry.input),
                Cell::new(&entry.output),
                Cell::new(&entry.mode),
                Cell::new(&entry.conversion),
                Cell::new(&entry.before),
                Cell::new(&entry.after),
                Cell::new(&entry.status),
            ]));
        }

        table
    }

    pub fn print(&self) {
        if self.entries.is_empty() {
            return;
        }
        println!("\nREPORT ({} files)\n", self.entries.len());
        self.build().printstd();
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::image_processing::{ColorMode, ImageFile, ModeConversion, SkipReason};
    use std::path::{Path, PathBuf};

    fn report(outcome: ConversionOutcome) -> ConversionReport {
        let mut file = ImageFile::new(Path::new("photos/c.gif"));
        file.mode = Some(ColorMode::Palette { transparent: true });
        file.byte_size = Some(2 * 1024 * 1024);
        ConversionReport { file, outcome }
    }

    #[test]
    fn test_converted_entry() {
        let entry = ReportEntry::from_report(&report(ConversionOutcome::Converted {
            output: PathBuf::from("photos/c.png"),
            conversion: ModeConversion::PaletteToRgba,
            original_bytes: 2 * 1024 * 1024,
            converted_bytes: 1024 * 1024,
            removed_original: true,
        }));

        assert_eq!(entry.input, "c.gif");
        assert_eq!(entry.output, "c.png");
        assert_eq!(entry.mode, "P+transparency");
        assert_eq!(entry.before, "2.00MB");
        assert_eq!(entry.after, "1.00MB");
        assert_eq!(entry.status, "replaced");
    }

    #[test]
    fn test_skipped_and_failed_entries() {
        let skipped = ReportEntry::from_report(&report(ConversionOutcome::Skipped(
            SkipReason::AlreadyPng,
        )));
        assert_eq!(skipped.status, "already PNG");
        assert_eq!(skipped.output, "-");

        let failed = ReportEntry::from_report(&report(ConversionOutcome::Failed(
            ConvertError::Conversion {
                path: PathBuf::from("photos/c.gif"),
                message: "bad".to_string(),
            },
        )));
        assert_eq!(failed.status, "failed");
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let mut table = ConversionTable::new();
        table.add(&report(ConversionOutcome::Skipped(SkipReason::AlreadyPng)));
        table.add(&report(ConversionOutcome::Skipped(SkipReason::AlreadyPng)));

        assert_eq!(table.build().len(), 3);
    }
}
