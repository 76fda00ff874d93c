//! VaultArc CLI - Fallout DAT archive utility
//!
//! Lists and extracts DAT1/DAT2 archives and decodes ACM audio to WAVE.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{AcmArgs, ExtractOptions, ListOptions, cmd_acm, cmd_extract, cmd_info, cmd_list};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vaultarc")]
#[command(author, version, about = "Fallout DAT archive utility")]
#[command(long_about = "
VaultArc reads Fallout 1 (DAT1) and Fallout 2 (DAT2) archives.
Several archives can be given; later ones override earlier ones,
the way patch000.dat overrides master.dat.

Examples:
  vaultarc list master.dat
  vaultarc list master.dat patch000.dat --suffix .msg --contains dialog
  vaultarc extract critter.dat -o out --suffix .frm
  vaultarc extract master.dat --decode -- sound/music/07desert.acm
  vaultarc info master.dat
  vaultarc acm 07desert.acm -o desert.wav
")]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the merged contents of one or more archives
    #[command(alias = "l")]
    List {
        /// Archives, in override order
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Only paths ending with this suffix
        #[arg(short, long)]
        suffix: Option<String>,

        /// Only paths containing this text
        #[arg(short, long)]
        contains: Option<String>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Show sizes and compression
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract files from one or more archives
    #[command(alias = "x")]
    Extract {
        /// Archives, in override order
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Only paths ending with this suffix
        #[arg(short, long)]
        suffix: Option<String>,

        /// Only paths containing this text
        #[arg(short, long)]
        contains: Option<String>,

        /// Decode known assets (ACM to WAVE, LST and MSG to text)
        #[arg(short, long)]
        decode: bool,

        /// Paths to extract after `--` (all matching entries if empty)
        #[arg(last = true)]
        paths: Vec<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about an archive
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Decode an ACM file to WAVE
    Acm {
        /// ACM input file
        input: PathBuf,

        /// Output file (input name with .wav or .raw by default)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Channel count to report instead of the default of 2
        #[arg(long)]
        channels: Option<u16>,

        /// Report the channel count stored in the file
        #[arg(long, conflicts_with = "channels")]
        stored_channels: bool,

        /// Write bare PCM without a WAVE header
        #[arg(long)]
        raw: bool,

        /// Accept files behind a WAVC wrapper
        #[arg(long)]
        wavc: bool,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::List {
            archives,
            suffix,
            contains,
            json,
            verbose,
        } => cmd_list(
            &archives,
            &ListOptions {
                suffix: suffix.as_deref(),
                contains: contains.as_deref(),
                json,
                verbose,
            },
        ),
        Commands::Extract {
            archives,
            output,
            suffix,
            contains,
            decode,
            paths,
            verbose,
        } => cmd_extract(
            &archives,
            &output,
            &ExtractOptions {
                suffix: suffix.as_deref(),
                contains: contains.as_deref(),
                paths: &paths,
                decode,
                verbose,
            },
        ),
        Commands::Info { archive } => cmd_info(&archive),
        Commands::Acm {
            input,
            output,
            channels,
            stored_channels,
            raw,
            wavc,
        } => cmd_acm(&AcmArgs {
            input: &input,
            output: output.as_deref(),
            channels,
            stored_channels,
            raw,
            wavc,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
