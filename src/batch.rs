//! Multi-file conversion with per-file error isolation.
//!
//! One bad input never stops the batch: every file gets a [`BatchItem`]
//! recording where its output went or why it failed.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::engine::ConversionEngine;
use crate::error::{Error, Result};
use crate::options::{ReadOptions, WriteOptions};

/// Name of the folder that collects chunk files from every input.
pub const CHUNK_FOLDER: &str = "ALL_CHUNKS";

/// Options for [`convert_batch`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Output extension, with or without the leading dot
    pub out_ext: String,
    /// Directory for outputs; defaults to each input's own folder
    pub output_dir: Option<PathBuf>,
    /// Options handed to every reader
    pub read: ReadOptions,
    /// Options handed to every writer
    pub write: WriteOptions,
    /// Convert files concurrently
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            out_ext: "txt".to_string(),
            output_dir: None,
            read: ReadOptions::default(),
            write: WriteOptions::default(),
            parallel: false,
        }
    }
}

impl BatchOptions {
    /// Create default batch options (`.txt` output next to each input).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output extension.
    pub fn with_out_ext(mut self, ext: impl Into<String>) -> Self {
        self.out_ext = ext.into();
        self
    }

    /// Write outputs into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the read options.
    pub fn with_read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    /// Set the write options.
    pub fn with_write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    /// Enable or disable concurrent conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn dotted_ext(&self) -> String {
        format!(".{}", self.out_ext.trim_start_matches('.'))
    }
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// The input file
    pub input: PathBuf,
    /// The output path handed to the writer
    pub target: PathBuf,
    /// Files written, or the conversion error
    pub outcome: Result<Vec<PathBuf>>,
}

impl BatchItem {
    /// Whether this file converted successfully.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The error, if this file failed.
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// Input file name for display.
    pub fn display_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Per-file results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    /// Number of files converted.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Every file written by the batch.
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().ok())
            .flatten()
    }
}

/// Where the output for `input` goes.
///
/// With chunking on, every input writes into `chunk_root`; otherwise into
/// `output_dir`, or next to the input when no directory is given.
pub fn output_target(input: &Path, options: &BatchOptions, chunk_root: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}{}", stem, options.dotted_ext());

    match (chunk_root, &options.output_dir) {
        (Some(root), _) => root.join(file_name),
        (None, Some(dir)) => dir.join(file_name),
        (None, None) => input.with_extension(options.out_ext.trim_start_matches('.')),
    }
}

/// One output target per input, in input order, with no two equal.
///
/// Inputs that would share a target (same stem routed into one folder)
/// keep the first one as is; later ones get the first free `{stem}_{n}`
/// name, n starting at 2. Targets are compared case-insensitively.
pub fn assign_targets<P: AsRef<Path>>(
    inputs: &[P],
    options: &BatchOptions,
    chunk_root: Option<&Path>,
) -> Vec<PathBuf> {
    let natural: Vec<PathBuf> = inputs
        .iter()
        .map(|input| output_target(input.as_ref(), options, chunk_root))
        .collect();
    let reserved: HashSet<String> = natural.iter().map(|t| target_key(t)).collect();

    let mut taken = HashSet::with_capacity(natural.len());
    let mut targets = Vec::with_capacity(natural.len());
    for target in natural {
        if taken.insert(target_key(&target)) {
            targets.push(target);
            continue;
        }

        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let renamed = (2..)
            .map(|n| target.with_file_name(format!("{}_{}{}", stem, n, options.dotted_ext())))
            .find(|candidate| {
                let key = target_key(candidate);
                !reserved.contains(&key) && !taken.contains(&key)
            })
            .unwrap_or_else(|| target.clone());
        log::warn!(
            "{} is already a batch target; writing to {}",
            target.display(),
            renamed.display()
        );
        taken.insert(target_key(&renamed));
        targets.push(renamed);
    }
    targets
}

fn target_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Convert every input, isolating failures per file.
///
/// Only setting up the output directories can fail the whole batch.
/// `progress` is called once per finished file (from worker threads when
/// `parallel` is set).
pub fn convert_batch<P, F>(
    engine: &ConversionEngine,
    inputs: &[P],
    options: &BatchOptions,
    progress: F,
) -> Result<BatchReport>
where
    P: AsRef<Path> + Sync,
    F: Fn(&BatchItem) + Sync,
{
    if let Some(dir) = &options.output_dir {
        fs::create_dir_all(dir)?;
    }

    let chunk_root = if options.write.enable_chunk {
        let base = match (&options.output_dir, inputs.first()) {
            (Some(dir), _) => dir.clone(),
            (None, Some(first)) => first
                .as_ref()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            (None, None) => return Ok(BatchReport::default()),
        };
        let root = base.join(CHUNK_FOLDER);
        fs::create_dir_all(&root)?;
        Some(root)
    } else {
        None
    };

    let targets = assign_targets(inputs, options, chunk_root.as_deref());
    let jobs: Vec<(&Path, PathBuf)> = inputs
        .iter()
        .map(|input| input.as_ref())
        .zip(targets)
        .collect();

    let convert_one = |(input, target): &(&Path, PathBuf)| {
        let target = target.clone();
        let outcome = engine.convert(input, &target, &options.read, &options.write);
        if let Err(e) = &outcome {
            log::warn!("{}: {}", input.display(), e);
        }
        let item = BatchItem {
            input: input.to_path_buf(),
            target,
            outcome,
        };
        progress(&item);
        item
    };

    let items: Vec<BatchItem> = if options.parallel {
        jobs.par_iter().map(convert_one).collect()
    } else {
        jobs.iter().map(convert_one).collect()
    };

    let report = BatchReport { items };
    log::info!(
        "batch finished: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}
