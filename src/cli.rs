use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apng2webp")]
#[command(about = "Convert animated PNG to animated WebP", long_about = None)]
pub struct Cli {
    /// Input APNG file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output WebP file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quality (0-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Frame size in WxH format (defaults to source dimensions)
    #[arg(short, long)]
    pub size: Option<String>,

    /// Number of times to loop the animation (0 = infinite)
    #[arg(short = 'l', long = "loop")]
    pub loop_count: Option<u32>,

    /// Fail when computed delays don't match extracted frames instead of
    /// truncating or padding
    #[arg(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that ffmpeg, ffprobe, cwebp, and webpmux are installed
    CheckTools,

    /// Probe a source animation and print its dimensions and frame rate
    Probe {
        /// Path to the source file
        file: PathBuf,
    },

    /// Print the computed per-frame delays without converting
    Plan {
        /// Path to the source file
        file: PathBuf,
    },

    /// Convert every APNG under a directory
    Batch {
        /// Directory to scan (defaults to current directory)
        directory: Option<PathBuf>,

        /// Re-convert files whose output already exists
        #[arg(long)]
        overwrite: bool,

        /// List jobs and commands without converting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
