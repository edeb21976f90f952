use console::style;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

use crate::image_processing::report_table::ConversionTable;
use crate::image_processing::{BatchEvent, ConversionOutcome, ConversionReport, RunSummary};
use crate::json_output::JsonMessage;
use crate::utils::{
    create_spinner, display_name, error_println, format_duration, format_megabytes,
    verbose_println, warn_println,
};

const RULE_WIDTH: usize = 60;

/// Routes per-file results to the console or to JSON lines
pub struct Reporter {
    json: bool,
    verbose: bool,
    spinner: Option<ProgressBar>,
    table: Option<ConversionTable>,
}

impl Reporter {
    pub fn new(json: bool, verbose: bool, report: bool) -> Self {
        Self {
            json,
            verbose,
            spinner: None,
            table: report.then(ConversionTable::new),
        }
    }

    /// Show a spinner while a directory is walked (console mode only)
    pub fn start_walk(&mut self, root: &Path) {
        if self.json {
            return;
        }
        self.println(format!(
            "{} {}",
            style("Converting images to PNG in:").bold(),
            root.display()
        ));
        self.println("=".repeat(RULE_WIDTH));

        let spinner = create_spinner();
        spinner.set_message("scanning...");
        self.spinner = Some(spinner);
    }

    pub fn warning(&self, message: &str) {
        if self.json {
            JsonMessage::warning(message);
        } else {
            self.suspend(|| warn_println(message));
        }
    }

    pub fn verbose(&self, message: &str) {
        if !self.json {
            self.suspend(|| verbose_println(self.verbose, message));
        }
    }

    /// Observer for [`crate::image_processing::process_directory`]
    pub fn on_event(&mut self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started(path) => self.file_started(path),
            BatchEvent::Finished(report) => {
                self.file_finished(report);
                if let Some(spinner) = &self.spinner {
                    spinner.inc(1);
                }
            }
            BatchEvent::Directory(path) => {
                self.verbose(&format!("Scanning directory: {}", path.display()))
            }
            BatchEvent::Ignored(path) => self.verbose(&format!(
                "Ignoring {} (unsupported extension)",
                display_name(path)
            )),
            BatchEvent::WalkError(e) => self.warning(&format!("{:#}", e)),
        }
    }

    pub fn file_started(&self, path: &Path) {
        if self.json {
            return;
        }
        if let Some(spinner) = &self.spinner {
            spinner.set_message(display_name(path));
        }
        self.println(format!("Converting: {}", style(display_name(path)).bold()));
    }

    pub fn file_finished(&mut self, report: &ConversionReport) {
        if let Some(table) = &mut self.table {
            table.add(report);
        }

        if self.json {
            JsonMessage::file(report);
            return;
        }

        let file = &report.file;
        let mut lines = Vec::new();
        if file.format.is_some() {
            lines.push(format!("  Original format: {}", file.format_name()));
        }
        if let Some((width, height)) = file.dimensions {
            lines.push(format!("  Size: {}x{}", width, height));
        }

        match &report.outcome {
            ConversionOutcome::Converted {
                output,
                conversion,
                original_bytes,
                converted_bytes,
                removed_original,
            } => {
                if self.verbose {
                    if let Some(mode) = file.mode {
                        lines.push(format!(
                            "  {} Color mode: {} ({})",
                            style("[VERBOSE]").dim(),
                            mode,
                            conversion
                        ));
                    }
                }
                lines.push(format!(
                    "  {} {} → {}",
                    style("Converted to PNG:").green(),
                    format_megabytes(*original_bytes),
                    format_megabytes(*converted_bytes)
                ));
                if *removed_original {
                    lines.push(format!("  Removed original: {}", display_name(&file.path)));
                } else if output != &file.path {
                    lines.push(format!("  Saved as: {}", display_name(output)));
                }
            }
            ConversionOutcome::Skipped(_) => {
                lines.push(format!("  {}", style("Already PNG - skipped").yellow()));
            }
            ConversionOutcome::Failed(error) => {
                self.println(lines.join("\n"));
                self.suspend(|| error_println(&error.to_string()));
                self.println("");
                return;
            }
        }
        lines.push(String::new());

        self.println(lines.join("\n"));
    }

    /// Run totals for a directory walk
    pub fn summary(&mut self, summary: &RunSummary, elapsed: Duration) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }

        if self.json {
            JsonMessage::summary(summary, elapsed.as_secs_f64());
        } else {
            println!("{}", "=".repeat(RULE_WIDTH));
            println!("{}", style("Conversion complete!").bold().green());
            println!("Images processed: {}", style(summary.processed).bold());
            println!("Images converted: {}", style(summary.converted).bold().green());
            println!(
                "Images already PNG: {}",
                style(summary.already_png()).bold().yellow()
            );
            if summary.failed > 0 {
                println!("  of which failed: {}", style(summary.failed).bold().red());
            }
            if summary.converted > 0 {
                println!(
                    "Size: {} → {}",
                    format_megabytes(summary.original_bytes),
                    format_megabytes(summary.converted_bytes)
                );
            }
            println!("Total time: {}", style(format_duration(elapsed)).dim());
        }

        self.print_table();
    }

    /// Table for `--report`, printed once at the end of any run
    pub fn print_table(&mut self) {
        if self.json {
            return;
        }
        if let Some(table) = self.table.take() {
            table.print();
        }
    }

    fn println(&self, text: impl AsRef<str>) {
        // suspend prints even when the spinner is hidden (non-tty)
        self.suspend(|| println!("{}", text.as_ref()));
    }

    fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}
