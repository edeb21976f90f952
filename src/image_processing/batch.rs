use std::path::Path;
use std::time::{Duration, Instant};

use super::convert::convert_to_png;
use super::walker::{walk, WalkEntry};
use super::{ConversionOptions, ConversionOutcome, ConversionReport};

/// Progress of a directory run, delivered as each step happens
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// The walk entered a directory
    Directory(&'a Path),
    /// A file was passed over for its extension
    Ignored(&'a Path),
    /// A candidate was found and is about to be converted
    Started(&'a Path),
    /// A candidate finished, successfully or not
    Finished(&'a ConversionReport),
    /// Part of the tree could not be read; the walk goes on
    WalkError(&'a anyhow::Error),
}

/// Run totals, folded from per-file reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub original_bytes: u64,
    pub converted_bytes: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        self.processed += 1;
        match outcome {
            ConversionOutcome::Converted {
                original_bytes,
                converted_bytes,
                ..
            } => {
                self.converted += 1;
                self.original_bytes += original_bytes;
                self.converted_bytes += converted_bytes;
            }
            ConversionOutcome::Skipped(_) => self.skipped += 1,
            ConversionOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Everything processed but not converted, failures included
    pub fn already_png(&self) -> usize {
        self.processed - self.converted
    }
}

impl<'a> FromIterator<&'a ConversionOutcome> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a ConversionOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(RunSummary::default(), |mut summary, outcome| {
            summary.record(outcome);
            summary
        })
    }
}

/// Walk `root` and convert every candidate in turn
pub fn process_directory<F>(
    root: &Path,
    recursive: bool,
    options: &ConversionOptions,
    mut observer: F,
) -> (RunSummary, Duration)
where
    F: FnMut(BatchEvent<'_>),
{
    let start_time = Instant::now();
    let mut summary = RunSummary::default();

    for entry in walk(root, recursive) {
        match entry {
            Ok(WalkEntry::Candidate(path)) => {
                observer(BatchEvent::Started(&path));
                let report = convert_to_png(&path, None, options);
                summary.record(&report.outcome);
                observer(BatchEvent::Finished(&report));
            }
            Ok(WalkEntry::Directory(path)) => observer(BatchEvent::Directory(&path)),
            Ok(WalkEntry::Ignored(path)) => observer(BatchEvent::Ignored(&path)),
            Err(e) => observer(BatchEvent::WalkError(&e)),
        }
    }

    (summary, start_time.elapsed())
}
