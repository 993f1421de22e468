/// `unimgc`: inspect and extract IMGC disk images.
///
/// # Command overview
///
/// ```text
/// unimgc [-v]... <COMMAND>
///
/// Commands:
///   info       Print the image header (volume, software, geometry)
///   extract    Decode the image to a raw disk file
///   inspect    List every block with its offset, kind and sizes
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Raise log level; repeat for more (warn → info → debug → trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, corrupt image, etc.)  |
///
/// Errors and logs go to stderr so extracted data can be piped from stdout.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;

mod cmd_extract;
mod cmd_info;
mod cmd_inspect;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decoder for IMGC disk images written by HDD Raw Copy Tool.
#[derive(Parser)]
#[command(name = "unimgc", version, about = "IMGC disk image extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity. `-v` shows progress, `-vv` per-block details.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the image header.
    Info(InfoArgs),
    /// Decode the image to a raw disk file.
    Extract(ExtractArgs),
    /// List the blocks of an image.
    Inspect(InspectArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `unimgc info`.
#[derive(clap::Args)]
pub struct InfoArgs {
    /// Path to the `.imgc` file.
    pub file: PathBuf,
}

/// Arguments for `unimgc extract`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ Argument     │ Default                                  │
/// ├──────────────┼──────────────────────────────────────────┤
/// │ IN           │ standard input (also when "-")           │
/// │ OUT          │ standard output (also when "-")          │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Input image; standard input when absent or `-`.
    pub input: Option<PathBuf>,

    /// Output file; standard output when absent or `-`.
    pub output: Option<PathBuf>,

    /// Verbosity level, copied from the global flag.
    #[arg(skip)]
    pub verbose: u8,
}

/// Arguments for `unimgc inspect`.
///
/// Decodes every block without writing the output, so it doubles as a
/// full integrity check of the image.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the `.imgc` file.
    pub file: PathBuf,

    /// Show only the block at this zero-based index.
    #[arg(long)]
    pub block: Option<usize>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Info(args) => cmd_info::run(&args),
        Commands::Extract(mut args) => {
            args.verbose = cli.verbose;
            cmd_extract::run(&args)
        }
        Commands::Inspect(args) => cmd_inspect::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
