use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use regmap_header::{
    ColumnRef, ColumnSelection, DEFAULT_SENSITIVITY, DEFAULT_STRIP_CHARS, DocumentLocator,
    ExtractOptions, GenerationReport, GeneratorConfig, HeaderMode, PageSelection, PdfTextExtractor,
    RegmapError, Sensitivity, StagingOptions, generate_header, prompt_for_columns,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "regmap2h",
    version,
    about = "Import the register map from a datasheet PDF and generate a C header"
)]
struct Cli {
    /// The datasheet PDF (local path or http(s) URL).
    #[arg(short, long)]
    pdf: String,

    /// Page number where the register map begins.
    #[arg(short, long)]
    beg: u32,

    /// Page number where the register map ends.
    #[arg(short, long)]
    end: u32,

    /// Peripheral the register map belongs to; prefixes every macro.
    #[arg(short = 'P', long)]
    peripheral: String,

    /// Custom name for the generated file (default: <peripheral>_reg.h).
    #[arg(short = 'f', long, alias = "generated_file_name")]
    generated_file_name: Option<PathBuf>,

    /// Table detection sensitivity, 1-100. Higher accepts more ragged tables.
    #[arg(long, default_value_t = DEFAULT_SENSITIVITY)]
    line_scale: u8,

    /// Characters stripped from every extracted cell.
    #[arg(long, default_value = DEFAULT_STRIP_CHARS)]
    strip_text: String,

    /// Register name column (index or header label). Prompts when omitted.
    #[arg(long)]
    name_col: Option<String>,

    /// Register address column (index or header label). Prompts when omitted.
    #[arg(long)]
    addr_col: Option<String>,

    /// Use the first extracted row as column labels instead of 0..n.
    #[arg(long)]
    has_header: bool,

    /// Stage extracted tables through this CSV file before cleaning.
    #[arg(long)]
    staging: Option<PathBuf>,

    /// Keep the staging file instead of deleting it.
    #[arg(long, requires = "staging")]
    keep_staging: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_column(flag: &str, value: &str) -> Result<ColumnRef> {
    value
        .parse::<ColumnRef>()
        .map_err(|error| anyhow!("invalid {flag}: {error}"))
}

fn parse_config(cli: &Cli) -> Result<GeneratorConfig> {
    let locator = cli
        .pdf
        .parse::<DocumentLocator>()
        .context("failed to parse --pdf")?;
    let pages = PageSelection::range(cli.beg, cli.end).context("invalid --beg/--end")?;
    let sensitivity = Sensitivity::new(cli.line_scale).context("invalid --line-scale")?;

    if cli.peripheral.trim().is_empty() {
        anyhow::bail!("--peripheral cannot be empty");
    }

    let mut config = GeneratorConfig::new(locator, cli.peripheral.trim())
        .with_extract_options(ExtractOptions {
            pages: Some(pages),
            sensitivity,
            strip_chars: cli.strip_text.clone(),
            ..ExtractOptions::default()
        })
        .with_header_mode(if cli.has_header {
            HeaderMode::HasHeader
        } else {
            HeaderMode::NoHeader
        });

    if let Some(output) = &cli.generated_file_name {
        config = config.with_output(output);
    }

    match (&cli.name_col, &cli.addr_col) {
        (Some(name), Some(address)) => {
            config = config.with_columns(ColumnSelection {
                name: parse_column("--name-col", name)?,
                address: parse_column("--addr-col", address)?,
            });
        }
        (None, None) => {}
        _ => anyhow::bail!("--name-col and --addr-col must be given together"),
    }

    if let Some(path) = &cli.staging {
        config = config.with_staging(StagingOptions {
            path: path.clone(),
            keep: cli.keep_staging,
        });
    }

    Ok(config)
}

fn ask_on_console(headers: &[String]) -> Result<ColumnSelection, RegmapError> {
    prompt_for_columns(headers, &mut io::stdin().lock(), &mut io::stdout().lock())
}

fn log_report(report: &GenerationReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} confidence={:?}: {}",
                warning.code, warning.page, warning.confidence, warning.message
            );
        }
    }
}

fn run(cli: &Cli) -> Result<GenerationReport> {
    let config = parse_config(cli)?;
    generate_header(&config, &PdfTextExtractor, ask_on_console)
        .with_context(|| format!("failed to generate a header from '{}'", config.locator))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "regmap_header=info"
    } else {
        "regmap_header=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(&cli) {
        Ok(report) => {
            log_report(&report, cli.verbose);
            if report.register_count == 0 {
                eprintln!(
                    "warning: no registers survived cleaning; '{}' only has include guards",
                    report.output_path.display()
                );
                return ExitCode::from(2);
            }
            println!(
                "\nHeader file successfully generated for your peripheral: {} ({} registers).\n",
                report.output_path.display(),
                report.register_count
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
