//! pdftriage CLI - scanned/digital PDF triage and text extraction

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdftriage::{
    classify_bytes, document_info, extract_page_bytes, render, BatchReport, ExtractOptions,
    ExtractionParameters, InputFile, JsonFormat, OcrConfig, OcrMyPdf, PageSelection, Pipeline,
    Session,
};

#[derive(Parser)]
#[command(name = "pdftriage")]
#[command(version)]
#[command(about = "Classify PDFs as scanned or digital and extract their text", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and extract text from one or more PDFs
    Extract {
        /// Input PDF files
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        ocr: OcrArgs,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print whether each PDF is scanned or digital
    Classify {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Extract a single page
    Page {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-indexed)
        #[arg(value_name = "N")]
        number: u32,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Browse a PDF page by page, adjusting layout parameters as you go
    Browse {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Layout parameters shared by the extracting commands.
#[derive(Args, Clone, Copy)]
struct LayoutArgs {
    /// Horizontal tolerance in points
    #[arg(long, env = "PDFTRIAGE_X_TOLERANCE", allow_negative_numbers = true,
          default_value_t = ExtractionParameters::DEFAULT_X_TOLERANCE)]
    x_tolerance: f32,

    /// Vertical tolerance in points
    #[arg(long, env = "PDFTRIAGE_Y_TOLERANCE", allow_negative_numbers = true,
          default_value_t = ExtractionParameters::DEFAULT_Y_TOLERANCE)]
    y_tolerance: f32,

    /// Points per output column
    #[arg(long, env = "PDFTRIAGE_X_DENSITY", allow_negative_numbers = true,
          default_value_t = ExtractionParameters::DEFAULT_X_DENSITY)]
    x_density: f32,

    /// Points per output row
    #[arg(long, env = "PDFTRIAGE_Y_DENSITY", allow_negative_numbers = true,
          default_value_t = ExtractionParameters::DEFAULT_Y_DENSITY)]
    y_density: f32,
}

impl From<LayoutArgs> for ExtractionParameters {
    fn from(args: LayoutArgs) -> Self {
        ExtractionParameters::new()
            .with_x_tolerance(args.x_tolerance)
            .with_y_tolerance(args.y_tolerance)
            .with_x_density(args.x_density)
            .with_y_density(args.y_density)
    }
}

#[derive(Args)]
struct OcrArgs {
    /// Skip scanned PDFs instead of running OCR
    #[arg(long)]
    no_ocr: bool,

    /// OCR program
    #[arg(long, value_name = "PROGRAM", env = "PDFTRIAGE_OCR_PROGRAM", default_value = "ocrmypdf")]
    ocr_program: PathBuf,

    /// OCR language (repeatable, e.g. --ocr-lang eng --ocr-lang deu)
    #[arg(long = "ocr-lang", value_name = "LANG")]
    ocr_lang: Vec<String>,

    /// OCR timeout in seconds (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    ocr_timeout: u64,
}

impl OcrArgs {
    fn pipeline(&self) -> Pipeline {
        if self.no_ocr {
            return Pipeline::without_ocr();
        }

        let mut config = OcrConfig::new().with_program(&self.ocr_program);
        for lang in &self.ocr_lang {
            config = config.with_language(lang);
        }
        config = match self.ocr_timeout {
            0 => config.without_timeout(),
            secs => config.with_timeout(Duration::from_secs(secs)),
        };
        let engine = OcrMyPdf::new(config);
        if !engine.is_available() {
            log::warn!(
                "OCR program '{}' is not available, scanned files will report an OCR error",
                engine.config().program.display()
            );
        }
        Pipeline::with_ocr_engine(engine)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain text
    Text,
    /// JSON
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Some(Commands::Extract {
            files,
            layout,
            ocr,
            pages,
            format,
            compact,
            output,
        }) => cmd_extract(
            &files,
            layout,
            &ocr,
            pages.as_deref(),
            format,
            compact,
            output.as_deref(),
        ),
        Some(Commands::Classify { files, format }) => cmd_classify(&files, format),
        Some(Commands::Page {
            input,
            number,
            layout,
        }) => cmd_page(&input, number, layout),
        Some(Commands::Browse { input, layout }) => cmd_browse(&input, layout),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pdftriage <COMMAND> [FILES]...".yellow());
            println!("       pdftriage --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log filter scoped to this process: `warn` by default, lopdf's own
/// diagnostics limited to errors. `PDFTRIAGE_LOG` overrides both.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };

    env_logger::Builder::new()
        .parse_filters(&format!("{},lopdf=error", level))
        .parse_env("PDFTRIAGE_LOG")
        .format_timestamp(None)
        .init();
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_extract(
    files: &[PathBuf],
    layout: LayoutArgs,
    ocr: &OcrArgs,
    pages: Option<&str>,
    format: OutputFormat,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };
    let options = ExtractOptions::new()
        .with_params(layout.into())
        .with_pages(page_selection);
    let pipeline = ocr.pipeline().with_options(options);

    let inputs = files
        .iter()
        .map(|path| {
            fs::read(path)
                .map(|data| InputFile::new(display_name(path), data))
                .map_err(|e| format!("{}: {}", path.display(), e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "Processing {} files with {:?} (OCR {})",
        inputs.len(),
        pipeline.options(),
        if pipeline.ocr_enabled() { "on" } else { "off" }
    );

    let batch = if inputs.is_empty() {
        pipeline.process_batch(&inputs)
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));

        let mut batch = BatchReport::default();
        for input in &inputs {
            pb.set_message(format!("Processing {}...", input.name));
            batch.documents.push(pipeline.process(&input.name, &input.data));
        }
        pb.finish_and_clear();
        batch
    };

    let rendered = match format {
        OutputFormat::Text => render::render_batch(&batch),
        OutputFormat::Json => {
            let json_format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            render::to_json(&batch, json_format)?
        }
    };

    write_output(output, &rendered)
}

fn cmd_classify(files: &[PathBuf], format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = Vec::new();

    for path in files {
        let result = fs::read(path)
            .map_err(pdftriage::Error::from)
            .and_then(|data| classify_bytes(&data));

        match format {
            OutputFormat::Text => match &result {
                Ok(classification) if classification.is_scanned() => {
                    println!("{}\t{}", path.display(), classification.to_string().yellow())
                }
                Ok(classification) => {
                    println!("{}\t{}", path.display(), classification.to_string().green())
                }
                Err(e) => println!("{}\t{}: {}", path.display(), "error".red(), e),
            },
            OutputFormat::Json => rows.push(match result {
                Ok(classification) => serde_json::json!({
                    "file": path.display().to_string(),
                    "classification": classification,
                }),
                Err(e) => serde_json::json!({
                    "file": path.display().to_string(),
                    "error": e.to_string(),
                }),
            }),
        }
    }

    if format == OutputFormat::Json {
        println!("{}", render::to_json(&rows, JsonFormat::Pretty)?);
    }
    Ok(())
}

fn cmd_page(input: &Path, number: u32, layout: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let text = extract_page_bytes(&data, number, &layout.into())?;
    print!("{}", render::render_page(number, text.as_deref()));
    Ok(())
}

fn cmd_browse(input: &Path, layout: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let session = Session::open(&data)?;

    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {} ({} pages)",
        "Type".bold(),
        session.classification(),
        session.page_count()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    browse(&session, layout.into(), stdin.lock(), stdout.lock())?;
    Ok(())
}

const BROWSE_HELP: &str = "Commands: n (next), p (previous), g N (go to page), \
set <x_tolerance|y_tolerance|x_density|y_density> <value>, params, q (quit)";

/// Line-driven page browser over a cached parse.
fn browse<R: BufRead, W: Write>(
    session: &Session,
    mut params: ExtractionParameters,
    input: R,
    mut out: W,
) -> io::Result<()> {
    let page_count = session.page_count();
    if page_count == 0 {
        writeln!(out, "Document has no pages.")?;
        return Ok(());
    }

    writeln!(out, "{}", BROWSE_HELP)?;
    let mut page = 1u32;
    show_page(session, page, &params, &mut out)?;

    for line in input.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["q"] | ["quit"] => break,
            ["n"] | ["next"] => {
                page = (page + 1).min(page_count);
                show_page(session, page, &params, &mut out)?;
            }
            ["p"] | ["prev"] => {
                page = page.saturating_sub(1).max(1);
                show_page(session, page, &params, &mut out)?;
            }
            ["g", n] | ["goto", n] => match n.parse::<u32>() {
                Ok(n) if (1..=page_count).contains(&n) => {
                    page = n;
                    show_page(session, page, &params, &mut out)?;
                }
                _ => writeln!(out, "Page must be between 1 and {}.", page_count)?,
            },
            ["set", name, value] => match value.parse::<f32>() {
                Ok(value) if params.set(name, value) => {
                    show_page(session, page, &params, &mut out)?;
                }
                Ok(_) => writeln!(out, "Unknown parameter '{}'.", name)?,
                Err(_) => writeln!(out, "'{}' is not a number.", value)?,
            },
            ["params"] => writeln!(
                out,
                "x_tolerance={} y_tolerance={} x_density={} y_density={}",
                params.x_tolerance, params.y_tolerance, params.x_density, params.y_density
            )?,
            _ => writeln!(out, "{}", BROWSE_HELP)?,
        }
    }
    Ok(())
}

fn show_page<W: Write>(
    session: &Session,
    page: u32,
    params: &ExtractionParameters,
    out: &mut W,
) -> io::Result<()> {
    let text = session.extract_page(page, params);
    write!(out, "{}", render::render_page(page, text.as_deref()))?;
    writeln!(out, "-- page {}/{} --", page, session.page_count())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let info = document_info(&data)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );
    println!("{}: {}", "Type".bold(), info.classification);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdftriage".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Scanned/digital PDF triage and text extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_layout_flags() {
        let cli = Cli::try_parse_from([
            "pdftriage",
            "page",
            "doc.pdf",
            "3",
            "--x-density",
            "7.5",
            "--y-tolerance",
            "-1",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Page { number, layout, .. }) => {
                assert_eq!(number, 3);
                let params: ExtractionParameters = layout.into();
                assert_eq!(params.x_density, 7.5);
                assert_eq!(params.y_tolerance, -1.0);
                assert_eq!(params.x_tolerance, 2.0);
            }
            _ => panic!("expected page command"),
        }
    }

    #[test]
    fn test_cli_extract_defaults() {
        let cli = Cli::try_parse_from(["pdftriage", "extract", "--no-ocr"]).unwrap();
        match cli.command {
            Some(Commands::Extract {
                files, ocr, format, ..
            }) => {
                assert!(files.is_empty());
                assert!(ocr.no_ocr);
                assert_eq!(ocr.ocr_timeout, 300);
                assert!(format == OutputFormat::Text);
                assert!(!ocr.pipeline().ocr_enabled());
            }
            _ => panic!("expected extract command"),
        }
    }

    #[test]
    fn test_classify_requires_files() {
        assert!(Cli::try_parse_from(["pdftriage", "classify"]).is_err());
    }

    struct TwoPages;

    impl pdftriage::PdfBackend for TwoPages {
        fn page_count(&self) -> u32 {
            2
        }

        fn page_chars(&self, page: u32) -> pdftriage::Result<pdftriage::parser::PageChars> {
            let mut chars = pdftriage::parser::PageChars::new(page, 612.0, 792.0);
            let label = if page == 1 { "one" } else { "two" };
            for (i, c) in label.chars().enumerate() {
                chars.chars.push(pdftriage::parser::TextChar::new(
                    c.to_string(),
                    i as f32 * 5.0,
                    0.0,
                    5.0,
                    10.0,
                ));
            }
            Ok(chars)
        }
    }

    fn run_browse(script: &str) -> String {
        let session = Session::from_backend(&TwoPages);
        let mut out = Vec::new();
        browse(
            &session,
            ExtractionParameters::default(),
            script.as_bytes(),
            &mut out,
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_browse_navigation() {
        let out = run_browse("n\nn\np\ng 9\nq\nn\n");
        assert_eq!(out.matches("#### Page 2").count(), 2);
        assert_eq!(out.matches("-- page 2/2 --").count(), 2);
        assert!(out.contains("Page must be between 1 and 2."));
        // Input after "q" is ignored.
        assert_eq!(out.matches("-- page").count(), 4);
    }

    #[test]
    fn test_browse_set_params() {
        let out = run_browse("set x_density 2.5\nset zoom 2\nset y_density abc\nparams\n");
        assert!(out.contains("Unknown parameter 'zoom'."));
        assert!(out.contains("'abc' is not a number."));
        assert!(out.contains("x_tolerance=2 y_tolerance=4 x_density=2.5 y_density=10"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/scans/a.pdf")), "a.pdf");
    }
}
