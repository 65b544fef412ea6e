use anyhow::Result;
use serde_json::json;

use crate::config::Config;
use crate::library::RecordingLibrary;
use crate::transcription::TranscriptionService;

pub mod args;

pub use args::{Cli, CliCommand, TranscribeCliArgs};

/// One-shot transcription of a file, bypassing the service.
pub async fn handle_transcribe_command(args: TranscribeCliArgs) -> Result<()> {
    let config = Config::load()?;
    let service = TranscriptionService::from_config(&config.whisper)?;

    let analysis = service.analyze(&args.file).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "file": args.file,
                "language": analysis.language,
                "text": analysis.text,
                "sentiment": analysis.sentiment.as_str(),
            }))?
        );
    } else {
        println!("Detected Language: {}", analysis.language);
        println!();
        println!("Transcribed Text:");
        println!("{}", analysis.text);
        println!();
        println!("Sentiment: {}", analysis.sentiment.as_str());
    }

    Ok(())
}

pub fn handle_recordings_command() -> Result<()> {
    let config = Config::load()?;
    let library = RecordingLibrary::open(config.recordings_dir())?;

    let recordings = library.list();
    if recordings.is_empty() {
        println!("No recordings found in {:?}", library.dir());
        return Ok(());
    }
    for name in recordings {
        println!("{name}");
    }

    Ok(())
}
