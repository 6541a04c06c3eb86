//! untext CLI - document to plain text conversion tool

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use untext::{
    convert_batch, BatchItem, BatchOptions, ConversionEngine, Markers, ReadOptions, TableFormat,
    WriteOptions,
};

#[derive(Parser)]
#[command(name = "untext")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert DOCX and PDF documents to plain text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert files to text
    Convert(ConvertArgs),

    /// List supported input and output formats
    Formats,

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input files
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Expected input format (e.g. docx); other files are still attempted
    #[arg(long, default_value = "docx", env = "UNTEXT_IN_TYPE")]
    in_type: String,

    /// Output format (e.g. txt)
    #[arg(long, default_value = "txt", env = "UNTEXT_OUT_TYPE")]
    out_type: String,

    /// Output directory (defaults to each input's folder)
    #[arg(short, long, value_name = "DIR", env = "UNTEXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Skip tables
    #[arg(long)]
    no_tables: bool,

    /// Table layout
    #[arg(long, value_enum, default_value = "tsv", env = "UNTEXT_TABLE_FORMAT")]
    table_format: TableLayout,

    /// Do not pad table rows to the widest row
    #[arg(long)]
    no_normalize_tables: bool,

    /// Include document headers
    #[arg(long, env = "UNTEXT_INCLUDE_HEADERS")]
    include_headers: bool,

    /// Include document footers
    #[arg(long, env = "UNTEXT_INCLUDE_FOOTERS")]
    include_footers: bool,

    /// Keep empty paragraphs
    #[arg(long)]
    keep_empty: bool,

    /// Write a UTF-8 byte-order mark
    #[arg(long, env = "UNTEXT_UTF8_BOM")]
    utf8_bom: bool,

    /// Split output into overlapping chunk files under ALL_CHUNKS/
    #[arg(long, env = "UNTEXT_ENABLE_CHUNK")]
    enable_chunk: bool,

    /// Chunk size in characters
    #[arg(long, default_value_t = untext::options::DEFAULT_CHUNK_SIZE, env = "UNTEXT_CHUNK_SIZE")]
    chunk_size: i64,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = untext::options::DEFAULT_OVERLAP, env = "UNTEXT_OVERLAP")]
    overlap: i64,

    /// Convert files in parallel
    #[arg(long)]
    parallel: bool,

    /// Marker line written before each table
    #[arg(long, default_value = "[TABLE]", env = "UNTEXT_TABLE_MARKER")]
    table_marker: String,

    /// Prefix for header paragraphs
    #[arg(long, default_value = "[HEADER]", env = "UNTEXT_HEADER_MARKER")]
    header_marker: String,

    /// Prefix for footer paragraphs
    #[arg(long, default_value = "[FOOTER]", env = "UNTEXT_FOOTER_MARKER")]
    footer_marker: String,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableLayout {
    /// Tab-separated cells
    Tsv,
    /// `| cell | cell |`
    Pipe,
}

impl From<TableLayout> for TableFormat {
    fn from(layout: TableLayout) -> Self {
        match layout {
            TableLayout::Tsv => TableFormat::Tsv,
            TableLayout::Pipe => TableFormat::Pipe,
        }
    }
}

impl ConvertArgs {
    fn batch_options(&self) -> BatchOptions {
        let read = ReadOptions::new()
            .with_headers(self.include_headers)
            .with_footers(self.include_footers)
            .with_tables(!self.no_tables)
            .with_empty_paragraphs(self.keep_empty);

        let mut write = WriteOptions::new()
            .with_tables(!self.no_tables)
            .with_table_format(self.table_format.into())
            .with_normalize_tables(!self.no_normalize_tables)
            .with_bom(self.utf8_bom)
            .with_markers(Markers::new(
                &self.table_marker,
                &self.header_marker,
                &self.footer_marker,
            ));
        if self.enable_chunk {
            write = write.with_chunking(self.chunk_size, self.overlap);
        }

        let mut options = BatchOptions::new()
            .with_out_ext(&self.out_type)
            .with_read_options(read)
            .with_write_options(write)
            .with_parallel(self.parallel);
        if let Some(dir) = &self.output_dir {
            options = options.with_output_dir(dir);
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert(args) => cmd_convert(&args),
        Commands::Formats => {
            cmd_formats();
            Ok(())
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(args: &ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let expected = args.in_type.trim_start_matches('.').to_lowercase();
    for file in &args.files {
        let ext = file
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if ext != expected {
            log::warn!("{} is not a .{} file", file.display(), expected);
        }
    }

    let options = args.batch_options();
    let engine = ConversionEngine::with_defaults();

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = convert_batch(&engine, &args.files, &options, |item: &BatchItem| {
        let name = item.display_name();
        pb.println(format!("{}: {}", "Converting".cyan(), name));
        match status_line(item) {
            Ok(line) => pb.println(line),
            Err(line) => pb.suspend(|| eprintln!("{}", line)),
        }
        pb.inc(1);
    })?;

    pb.finish_and_clear();

    let summary = format!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    if report.failed() == 0 {
        println!("\n{} {}", "Done!".green().bold(), summary);
    } else {
        println!("\n{} {}", "Done with errors:".yellow().bold(), summary);
    }

    Ok(())
}

/// Per-file result line; failures are meant for stderr.
fn status_line(item: &BatchItem) -> Result<String, String> {
    let name = item.display_name();
    match &item.outcome {
        Ok(_) => Ok(format!("{} {}", "Successfully converted".green(), name)),
        Err(e) => Err(format!("{} {}: {}", "Failed to convert".red(), name, e)),
    }
}

fn cmd_formats() {
    let engine = ConversionEngine::with_defaults();
    let registry = engine.registry();

    println!("{}", "Input formats".cyan().bold());
    for ext in registry.available_inputs() {
        println!("  .{}", ext);
    }
    println!("{}", "Output formats".cyan().bold());
    for ext in registry.available_outputs() {
        println!("  .{}", ext);
    }
}

fn cmd_version() {
    println!("{} {}", "untext".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document to plain text conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/untext".dimmed());
    println!("License: MIT");
}
