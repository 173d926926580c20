//! cbr2kepub - comic archive to Kobo KEPUB converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cbr2kepub::{ConvertConfig, Converter, Page};

#[derive(Parser)]
#[command(name = "cbr2kepub")]
#[command(version, about = "Convert comic archives to Kobo KEPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    cbr2kepub issue.cbr                   Write issue.kepub.epub
    cbr2kepub issue.cbz out.kepub.epub    Write to an explicit path
    cbr2kepub --list issue.cbr            Show page order without converting")]
struct Cli {
    /// Input archive (CBR or CBZ)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: <INPUT stem>.kepub.epub)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Deflate level for container entries
    #[arg(short = 'l', long, value_parser = clap::value_parser!(i64).range(0..=9))]
    compression_level: Option<i64>,

    /// Language code written to the package metadata
    #[arg(long, default_value = "en")]
    language: String,

    /// Skip image header validation
    #[arg(long)]
    no_validate: bool,

    /// Path to the unrar executable
    #[arg(long, value_name = "PATH")]
    unrar: Option<PathBuf>,

    /// List pages in reading order without converting
    #[arg(long)]
    list: bool,

    /// Print the page list as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// Only log errors (the output path is still printed)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log each page and container entry
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PageRow {
    index: usize,
    canonical_name: String,
    media_type: &'static str,
    original_path: String,
}

impl From<&Page> for PageRow {
    fn from(page: &Page) -> Self {
        Self {
            index: page.sequence_index,
            canonical_name: page.canonical_name.clone(),
            media_type: page.media_type.mime_type(),
            original_path: page.original_path.to_string_lossy().replace('\\', "/"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.list {
        list(&cli)
    } else {
        convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "cbr2kepub=error"
    } else if cli.verbose {
        "cbr2kepub=debug"
    } else {
        "cbr2kepub=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn converter(cli: &Cli) -> Converter {
    let mut config = ConvertConfig::default()
        .with_language(&cli.language)
        .with_validation(!cli.no_validate);
    if let Some(output) = &cli.output {
        config = config.with_output(output);
    }
    if let Some(level) = cli.compression_level {
        config = config.with_compression_level(level);
    }
    if let Some(unrar) = &cli.unrar {
        config = config.with_unrar_program(unrar);
    }
    Converter::new().with_config(config)
}

fn convert(cli: &Cli) -> Result<(), cbr2kepub::Error> {
    let output = converter(cli).convert(&cli.input)?;
    println!("{}", output.display());
    Ok(())
}

fn list(cli: &Cli) -> Result<(), cbr2kepub::Error> {
    let pages = converter(cli).plan(&cli.input)?;
    let rows: Vec<PageRow> = pages.iter().map(PageRow::from).collect();

    if cli.json {
        let json = serde_json::to_string_pretty(&rows).map_err(std::io::Error::other)?;
        println!("{json}");
    } else {
        let width = rows.last().map_or(1, |r| r.index.to_string().len());
        for row in &rows {
            println!(
                "{:>width$}  {}  {}",
                row.index, row.canonical_name, row.original_path
            );
        }
    }
    Ok(())
}
