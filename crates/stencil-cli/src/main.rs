//! stencil CLI - fill an XLSX template with records from a JSON file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use stencil::{
    locate_sheets, CellValue, ExportConfig, Exporter, HeaderList, StrategyKind, TemplateFile,
    TemplateSource, XlsxReader, DEFAULT_DATA_SHEET,
};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(author, version, about = "Fill an XLSX template with JSON records")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export records into a copy of the template
    Export {
        /// JSON array of records ("-" reads stdin)
        #[arg(short, long)]
        records: PathBuf,

        /// Export configuration (JSON); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Template override
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Strategy override (in-place or reconstruct)
        #[arg(short, long)]
        strategy: Option<StrategyKind>,

        /// Output file (default: the configured download filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the header labels records are matched against
    Headers {
        /// Template file
        template: PathBuf,

        /// Sheet holding the header row
        #[arg(short, long, default_value = DEFAULT_DATA_SHEET)]
        sheet: String,
    },

    /// List the sheets of a template
    Sheets {
        /// Template file
        template: PathBuf,
    },

    /// Validate a configuration against its template
    Check {
        /// Export configuration (JSON); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Template override
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Export {
            records,
            config,
            template,
            strategy,
            output,
        } => {
            let config = load_config(config.as_deref(), template, strategy)?;
            export(config, &records, output.as_deref())
        }
        Commands::Headers { template, sheet } => show_headers(&template, &sheet),
        Commands::Sheets { template } => list_sheets(&template),
        Commands::Check { config, template } => {
            let config = load_config(config.as_deref(), template, None)?;
            check(&config)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(
    path: Option<&Path>,
    template: Option<PathBuf>,
    strategy: Option<StrategyKind>,
) -> Result<ExportConfig> {
    let mut config = match path {
        Some(path) => ExportConfig::from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => ExportConfig::default(),
    };
    if let Some(template) = template {
        config.template_path = template;
    }
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    Ok(config)
}

fn read_records(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut body = Vec::new();
        io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read records from stdin")?;
        return Ok(body);
    }
    std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn export(config: ExportConfig, records: &Path, output: Option<&Path>) -> Result<()> {
    let body = read_records(records)?;
    let exporter = Exporter::new(config)?;
    let response = exporter.export_json(&body)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&response.filename));
    std::fs::write(&output, &response.body)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!(
        "Wrote {} bytes to '{}' ({} strategy)",
        response.len(),
        output.display(),
        exporter.strategy_name()
    );
    Ok(())
}

fn show_headers(template: &Path, sheet_name: &str) -> Result<()> {
    let workbook = XlsxReader::read_file(template)
        .with_context(|| format!("Failed to open '{}'", template.display()))?;
    let Some(sheet) = workbook.worksheet_by_name(sheet_name) else {
        bail!("Sheet '{}' not found in '{}'", sheet_name, template.display());
    };

    let headers = HeaderList::from_sheet(sheet);
    if headers.is_empty() {
        eprintln!("Warning: no header labels in row 1 of '{}'", sheet_name);
    }
    for (i, name) in headers.iter().enumerate() {
        println!("{}\t{}", i + 1, name);
    }
    Ok(())
}

fn list_sheets(template: &Path) -> Result<()> {
    let workbook = XlsxReader::read_file(template)
        .with_context(|| format!("Failed to open '{}'", template.display()))?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        let state = if sheet.is_visible() { "" } else { "\t(hidden)" };
        println!("{}\t{}{}", i, sheet.name(), state);
    }
    Ok(())
}

fn check(config: &ExportConfig) -> Result<()> {
    config.validate()?;
    let source = TemplateFile::open(&config.template_path)?;
    let workbook = source.load()?;
    let found = locate_sheets(&workbook, &config.required_sheets())?;

    let headers = found
        .first()
        .and_then(|&index| workbook.worksheet(index))
        .map(HeaderList::from_sheet)
        .unwrap_or_default();

    println!("Template: {}", source.describe());
    println!("Strategy: {}", config.strategy);
    println!("Data sheet: '{}' ({} headers)", config.data_sheet, headers.len());

    for (sheet, columns) in &config.styles {
        if workbook.worksheet_by_name(sheet).is_none() {
            eprintln!("Warning: style rules name missing sheet '{}'", sheet);
            continue;
        }
        for (&col, rule) in columns {
            let label = label_of(&workbook, sheet, col);
            println!("  style   {}!col {} {}: fill {}", sheet, col, label, rule.fill);
        }
    }
    for (&col, formula) in &config.validations {
        let label = label_of(&workbook, &config.data_sheet, col);
        println!("  list    col {} {}: {}", col, label, formula);
    }
    Ok(())
}

/// Header text above a 1-based column, for display
fn label_of(workbook: &stencil::Workbook, sheet: &str, col: u16) -> String {
    let value = col
        .checked_sub(1)
        .and_then(|c| Some(workbook.worksheet_by_name(sheet)?.get_value_at(0, c)))
        .unwrap_or(CellValue::Empty);
    match value {
        CellValue::Empty => "(no header)".to_string(),
        other => format!("'{}'", other.to_string().trim()),
    }
}
