//! Mailmetrics CLI - Analyze email contact metadata exports
//!
//! # Main Commands
//!
//! ```bash
//! mailmetrics analyze contacts.csv -o report.html   # Full pipeline to HTML report
//! mailmetrics analyze contacts.csv --json           # Raw results as JSON
//! mailmetrics generate --names names.txt --domains domains.txt
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! mailmetrics parse contacts.csv       # Just parse the CSV to typed JSON
//! mailmetrics mbox archive.mbox        # Per-day message counts from an mbox
//! ```

use clap::{Parser, Subcommand};
use mailmetrics::{
    report_context, Analysis, Dataset, DomainDistribution, GmailMbox, Metric, ReaderOptions,
    Report, TestDataGenerator, TopCorrespondents,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mailmetrics")]
#[command(about = "Analyze email contact metadata exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the metric pipeline and render a report
    Analyze {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: report.html, or stdout with --json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template to render the report with
        #[arg(long, default_value = "report.html")]
        template: String,

        /// Print the raw result set as JSON instead of rendering HTML
        #[arg(long)]
        json: bool,

        /// Input encoding label, or 'auto' to detect
        #[arg(long)]
        encoding: Option<String>,

        /// How many top correspondents to keep
        #[arg(long, default_value = "10")]
        top: usize,

        /// Report title
        #[arg(long)]
        title: Option<String>,
    },

    /// Parse a CSV file and output typed records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Only emit the first N records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input encoding label, or 'auto' to detect
        #[arg(long)]
        encoding: Option<String>,
    },

    /// Extract sender timestamps from an mbox archive as per-day counts
    Mbox {
        /// Path to the mbox archive
        archive: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate synthetic or anonymized test data
    Generate {
        /// Newline-delimited file of candidate names
        #[arg(long)]
        names: PathBuf,

        /// Newline-delimited file of candidate domains
        #[arg(long)]
        domains: PathBuf,

        /// Anonymize this fixture instead of generating from scratch
        #[arg(long)]
        anonymize: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            template,
            json,
            encoding,
            top,
            title,
        } => cmd_analyze(
            &input,
            output.as_deref(),
            &template,
            json,
            encoding.as_deref(),
            top,
            title.as_deref(),
        ),

        Commands::Parse {
            input,
            limit,
            output,
            encoding,
        } => cmd_parse(&input, limit, output.as_deref(), encoding.as_deref()),

        Commands::Mbox { archive, output } => cmd_mbox(&archive, output.as_deref()),

        Commands::Generate {
            names,
            domains,
            anonymize,
            output,
        } => cmd_generate(&names, &domains, anonymize.as_deref(), output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Map the --encoding flag onto reader options.
fn reader_options(encoding: Option<&str>) -> ReaderOptions {
    match encoding {
        None => ReaderOptions::default(),
        Some("auto") => ReaderOptions::auto_encoding(),
        Some(label) => ReaderOptions {
            encoding: Some(label.to_string()),
            ..ReaderOptions::default()
        },
    }
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    template: &str,
    json: bool,
    encoding: Option<&str>,
    top: usize,
    title: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Analyzing: {}", input.display());

    let dataset = Dataset::with_options(input, reader_options(encoding))?;
    let metrics: Vec<Box<dyn Metric>> = vec![
        Box::new(DomainDistribution::new()),
        Box::new(TopCorrespondents::new(top)),
    ];

    let mut analysis = Analysis::with_metrics(dataset, metrics);
    analysis.analyze()?;

    let row_count = analysis.dataset().len()?;
    eprintln!("✅ Processed {} rows", row_count);

    let results = analysis.serialize()?;

    if json {
        let json_out = serde_json::to_string_pretty(&Value::Object(results))?;
        write_output(&json_out, output)?;
    } else {
        let outpath = output.unwrap_or_else(|| Path::new("report.html"));
        let title = title.unwrap_or("Email Metrics Report");
        let context = report_context(title, row_count, Value::Object(results));

        let report = Report::with_template(template);
        report.render_to_file(outpath, &context)?;
        eprintln!("💾 Report written to: {}", outpath.display());
    }

    Ok(())
}

fn cmd_parse(
    input: &Path,
    limit: Option<usize>,
    output: Option<&Path>,
    encoding: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let dataset = Dataset::with_options(input, reader_options(encoding))?;
    let mut records = Vec::new();
    for record in dataset.records()? {
        records.push(record?);
        if limit.is_some_and(|n| records.len() >= n) {
            break;
        }
    }
    eprintln!("✅ Parsed {} records", records.len());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_mbox(archive: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📬 Reading mbox: {}", archive.display());

    let mbox = GmailMbox::new(archive)?;
    let extraction = mbox.sender_timestamps()?;

    eprintln!("✅ Extracted {} timestamps", extraction.timestamps.len());
    if extraction.malformed > 0 {
        eprintln!("   ⚠️  {} malformed envelope lines skipped", extraction.malformed);
    }

    let mut per_day: BTreeMap<String, u64> = BTreeMap::new();
    for ts in &extraction.timestamps {
        *per_day.entry(ts.date().to_string()).or_insert(0) += 1;
    }

    let json = serde_json::to_string_pretty(&per_day)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_generate(
    names: &Path,
    domains: &Path,
    anonymize: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut generator = TestDataGenerator::from_files(names, domains)?;
    eprintln!(
        "🎲 Generator ready: {} names, {} domains",
        generator.names().len(),
        generator.domains().len()
    );

    if let Some(fixture) = anonymize {
        eprintln!("🕵️  Anonymizing fixture: {}", fixture.display());
        generator = generator.with_fixture(fixture);
    }

    generator.write(output)?;
    if let Some(path) = output {
        eprintln!("💾 Dataset written to: {}", path.display());
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
