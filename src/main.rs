use anyhow::Context;
use clap::Parser;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use textqr::{ensure_not_blank, Config, Converter, ErrorCorrection, TextSource};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "textqr",
    version,
    about = "Convert text into QR code images",
    long_about = "Convert text into one or more QR code images.\n\n\
    Text that does not fit in a single code is split into parts labelled \
    [i/n]; scan every part in order to recover the full text.\n\n\
    USAGE EXAMPLES:\n  \
      # Convert a literal text\n  \
      textqr -t \"Hello World\"\n\n  \
      # Read from a file\n  \
      textqr -f input.txt\n\n  \
      # Read from standard input\n  \
      textqr < input.txt\n\n  \
      # Choose output prefix and error correction\n  \
      textqr -f input.txt -o myqr -e H\n\n  \
      # Tune module size and border\n  \
      textqr -t \"test\" -o test -e M -b 8 -s 2"
)]
struct Cli {
    /// Text to convert
    #[arg(short, long, value_name = "TEXT", conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a UTF-8 file
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output filename prefix
    #[arg(short, long, default_value = "qrcode", value_name = "PREFIX")]
    output: PathBuf,

    /// Error-correction level
    #[arg(short, long, value_enum, ignore_case = true, default_value = "M")]
    error_correction: CliLevel,

    /// Pixel size of each module
    #[arg(short, long, default_value_t = 10, value_name = "PIXELS")]
    box_size: u32,

    /// Quiet-zone width in modules
    #[arg(short = 's', long, default_value_t = 4, value_name = "MODULES")]
    border: u32,

    /// Only show text information, do not generate codes
    #[arg(short, long)]
    info: bool,

    /// Print text information as JSON (with --info)
    #[arg(long, requires = "info")]
    json: bool,

    /// Print the codes to the terminal instead of writing images
    #[arg(short, long, conflicts_with = "info")]
    preview: bool,

    /// Back up existing images before overwriting them
    #[arg(long)]
    backup: bool,

    /// Write a JSON manifest next to the images
    #[arg(long)]
    manifest: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn source(&self) -> TextSource {
        match (&self.text, &self.file) {
            (Some(text), _) => TextSource::Literal(text.clone()),
            (None, Some(path)) => TextSource::File(path.clone()),
            (None, None) => TextSource::Stdin,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliLevel {
    /// Low: ~7% recovery
    #[value(name = "L")]
    Low,
    /// Medium: ~15% recovery
    #[value(name = "M")]
    Medium,
    /// Quartile: ~25% recovery
    #[value(name = "Q")]
    Quartile,
    /// High: ~30% recovery
    #[value(name = "H")]
    High,
}

impl From<CliLevel> for ErrorCorrection {
    fn from(level: CliLevel) -> Self {
        match level {
            CliLevel::Low => Self::Low,
            CliLevel::Medium => Self::Medium,
            CliLevel::Quartile => Self::Quartile,
            CliLevel::High => Self::High,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let source = cli.source();
    if source == TextSource::Stdin && std::io::stdin().is_terminal() {
        eprintln!("Enter text, then press Ctrl+D (Ctrl+Z then Enter on Windows) to finish:");
    }

    let text = source.read().context("Could not load input text")?;
    ensure_not_blank(&text).context("Nothing to convert")?;

    let config = Config::builder()
        .error_correction(cli.error_correction.into())
        .module_size(cli.box_size)
        .border(cli.border)
        .output_prefix(cli.output)
        .backup_existing(cli.backup)
        .write_manifest(cli.manifest)
        .build()
        .context("Failed to build configuration")?;

    let converter = Converter::new(config).context("Failed to create converter")?;
    let info = converter.describe(&text)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    info.print_summary();

    if cli.info {
        return Ok(());
    }

    if cli.preview {
        let previews = converter
            .preview(&text)
            .context("Failed to generate QR codes")?;
        for (i, preview) in previews.iter().enumerate() {
            println!("\n[{}/{}]", i + 1, previews.len());
            println!("{preview}");
        }
        return Ok(());
    }

    println!("\nGenerating QR codes...");

    let paths = converter
        .render_and_persist(&text)
        .context("Failed to generate QR codes")?;

    print_report(&paths, info.is_split())?;

    Ok(())
}

fn print_report(paths: &[PathBuf], split: bool) -> anyhow::Result<()> {
    println!("\n✓ Generated {} QR code(s):", paths.len());

    for (i, path) in paths.iter().enumerate() {
        println!("  [{}] {} ({} bytes)", i + 1, path.display(), file_size(path)?);
    }

    if split {
        println!("\nScan all codes in order to recover the full text.");
    } else {
        println!("\nScan the code with a phone to read the text.");
    }

    Ok(())
}

fn file_size(path: &Path) -> anyhow::Result<u64> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat '{}'", path.display()))?;
    Ok(metadata.len())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("textqr=warn"),
        1 => EnvFilter::new("textqr=info"),
        2 => EnvFilter::new("textqr=debug"),
        _ => EnvFilter::new("textqr=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
