use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "clipcrop",
    version,
    about = "Download video segments with yt-dlp, crop them to 9:16 and join them with ffmpeg"
)]
pub struct Cli {
    /// Log tool invocations and pipeline steps.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the video-only resolutions available for a URL.
    Formats { url: String },
    /// Download, optionally crop, and concatenate.
    Run(RunArgs),
    /// Interactive form (default).
    Tui,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    pub url: String,

    /// Base file name of the final `<name>.mp4`.
    #[arg(short, long)]
    pub name: String,

    /// Defaults to the last used directory, then the current directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Time range as START-END, e.g. 00:01:00-00:01:10. Repeatable.
    #[arg(short, long = "segment", value_name = "START-END")]
    pub segments: Vec<String>,

    /// Resolution label such as 1080p. Defaults to the highest available.
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Download the whole video instead of segments.
    #[arg(long)]
    pub no_trim: bool,

    /// Keep the source aspect ratio.
    #[arg(long)]
    pub no_crop: bool,

    /// Directory for the temporary download.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}
