use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use voice_translator::config::Config;
use voice_translator::languages;
use voice_translator::pipeline::{PipelineCoordinator, TranslationJob};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("voice_translator=info,warn")
        .init();

    let matches = Command::new("Voice Translator")
        .version("0.1.0")
        .about("Translates speech in audio/video files into another language")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Audio or video file to translate")
                .required(true),
        )
        .arg(
            Arg::new("target-lang")
                .short('t')
                .long("target-lang")
                .value_name("CODE")
                .help("Target language code (e.g. hi, ta, bn)")
                .required(true),
        )
        .arg(
            Arg::new("source-lang")
                .short('s')
                .long("source-lang")
                .value_name("CODE")
                .help("Source language code")
                .default_value("en"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for synthesized audio")
                .default_value("./output"),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("Print the supported target languages and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-languages") {
        for (code, name) in languages::SUPPORTED_TARGETS {
            println!("{}  {}", code, name);
        }
        return Ok(());
    }

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let target_lang = matches.get_one::<String>("target-lang").unwrap().clone();
    let source_lang = matches.get_one::<String>("source-lang").unwrap().clone();
    let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_env();
    config.synthesis.output_dir = output_dir;
    config.validate()?;

    info!("🚀 Voice Translator starting...");
    info!("📁 Input: {}", input.display());
    info!(
        "🌐 Languages: {} -> {} ({})",
        source_lang,
        target_lang,
        languages::display_name(&target_lang).unwrap_or("unknown")
    );

    let coordinator = PipelineCoordinator::new(config)?;
    let job = TranslationJob::new(input, target_lang).with_source_lang(source_lang);

    let start_time = std::time::Instant::now();
    let result = coordinator.run_pipeline(job).await?;
    let duration = start_time.elapsed();

    info!("🎉 Pipeline finished in {:.2}s", duration.as_secs_f64());
    info!("📝 Original: {}", result.original_text);
    info!("🔤 Translated: {}", result.translated_text);
    match &result.audio_path {
        Some(path) => info!("🔊 Audio artifact: {}", path.display()),
        None => info!("🔇 No audio artifact produced"),
    }

    // Emit the result record for the caller (persistence is its concern)
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
