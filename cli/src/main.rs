//! pdf2xls CLI - PDF to spreadsheet conversion tool

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2xls::{
    parse_file_with_options, Config, ConvertOptions, Converter, PageSelection, ParseOptions,
};

#[derive(Parser)]
#[command(name = "pdf2xls")]
#[command(version)]
#[command(about = "Convert PDF text and tables to XLSX workbooks", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output XLSX file (defaults to the input name with .xlsx)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    flags: ConvertFlags,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct ConvertFlags {
    /// Page selection (e.g., "all", "1-10", "1,3,5-7")
    #[arg(long, value_name = "PAGES")]
    pages: Option<String>,

    /// Header band to ignore, in millimeters
    #[arg(long, value_name = "MM")]
    header_mm: Option<f32>,

    /// Footer band to ignore, in millimeters
    #[arg(long, value_name = "MM")]
    footer_mm: Option<f32>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "PDF2XLS_CONFIG")]
    config: Option<PathBuf>,

    /// Disable table detection (everything becomes body text)
    #[arg(long)]
    no_tables: bool,

    /// Keep numeric-looking table cells as text
    #[arg(long)]
    no_number_detection: bool,

    /// Insert "Page N" marker rows in the text sheet
    #[arg(long)]
    page_labels: bool,

    /// Name of the body-text sheet
    #[arg(long, value_name = "NAME")]
    text_sheet: Option<String>,

    /// Fail on the first page that cannot be parsed
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to an XLSX workbook
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output XLSX file (defaults to the input name with .xlsx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            flags,
        }) => cmd_convert(&input, output.as_deref(), &flags),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &cli.flags)
            } else {
                println!("{}", "Usage: pdf2xls <FILE> [OUTPUT]".yellow());
                println!("       pdf2xls --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Build conversion options from the config file (if any) and CLI flags.
///
/// CLI flags win over the configuration file.
fn build_options(flags: &ConvertFlags) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::default();
    options.parse = options.parse.lenient();

    if let Some(ref path) = flags.config {
        options = Config::load(path)?.apply(options)?;
    }

    if let Some(ref pages) = flags.pages {
        options.parse.pages = PageSelection::parse(pages)?;
    }
    if let Some(mm) = flags.header_mm {
        options.parse.header_mm = mm;
    }
    if let Some(mm) = flags.footer_mm {
        options.parse.footer_mm = mm;
    }
    if flags.no_tables {
        options.parse.detect_tables = false;
    }
    if flags.no_number_detection {
        options.detect_numbers = false;
    }
    if flags.page_labels {
        options.page_labels = true;
    }
    if let Some(ref name) = flags.text_sheet {
        options.text_sheet = name.clone();
    }
    if flags.strict {
        options.parse = options.parse.with_error_mode(pdf2xls::ErrorMode::Strict);
    }

    log::debug!(
        "resolved options: pages={:?}, header_mm={}, footer_mm={}, tables={}, numbers={}",
        options.parse.pages,
        options.parse.header_mm,
        options.parse.footer_mm,
        options.parse.detect_tables,
        options.detect_numbers
    );

    Ok(options)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    flags: &ConvertFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.with_extension("xlsx"));

    let options = build_options(flags)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(format!("Converting {}...", input.display()));

    let result = Converter::with_options(options).convert_file(input, &output);
    pb.finish_and_clear();

    let summary = result?;

    println!(
        "{} {} ({} page(s), {} table(s), {} sheet(s), {} row(s))",
        "Wrote".green().bold(),
        output.display(),
        summary.pages,
        summary.tables,
        summary.sheets,
        summary.rows
    );

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient mode: show metadata even when some pages fail to parse
    let options = ParseOptions::new().lenient();
    let doc = parse_file_with_options(input, options)?;

    if json {
        let info = serde_json::json!({
            "file": input.display().to_string(),
            "pdf_version": doc.metadata.pdf_version,
            "pages": doc.metadata.page_count,
            "title": doc.metadata.title,
            "author": doc.metadata.author,
            "subject": doc.metadata.subject,
            "creator": doc.metadata.creator,
            "producer": doc.metadata.producer,
            "created": doc.metadata.created,
            "modified": doc.metadata.modified,
            "tables": doc.table_count(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let words: usize = text.split_whitespace().count();

    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Tables".bold(), doc.table_count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdf2xls".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to spreadsheet conversion tool");
}
