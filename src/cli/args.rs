use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "phonautograph")]
#[command(about = "Record, play back, and transcribe microphone audio", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Transcribe an audio file and print language, text, and sentiment
    Transcribe(TranscribeCliArgs),
    /// List recordings in the recordings directory
    Recordings,
}

#[derive(ClapArgs, Debug)]
pub struct TranscribeCliArgs {
    /// WAV file to transcribe
    pub file: PathBuf,
    /// Emit the result as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}
