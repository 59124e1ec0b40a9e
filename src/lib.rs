pub mod audio;
pub mod call_log;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod intent;
pub mod language;
pub mod phrases;
pub mod record;
pub mod speech;
pub mod system;
pub mod tts;

use anyhow::Context;
use cli::{Cli, Commands, SttChoice};
use config::{Config, SttBackendKind};
use language::Language;
use phrases::{phrase, PhraseKey};
use serde::Serialize;
use speech::{ConsoleRecognizer, Echo, GoogleRecognizer, ScriptedRecognizer, SpeechRecognizer};
use std::path::Path;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    setup_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Call(args) => call(args, &config),
        Commands::Stats(args) => stats(args, &config),
        Commands::Classify(args) => classify(args, &config),
        Commands::Phrases(args) => phrases_cmd(args),
        Commands::Prerender(args) => prerender(args, &config),
        Commands::TestTts(args) => test_tts(args, &config),
        Commands::Backends(args) => backends(args, &config),
        Commands::SystemInfo(args) => system_info(args, &config),
        Commands::Config(args) => config_cmd(args, &config),
    }
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load().context("load config"),
    }
}

fn call(args: cli::CallArgs, config: &Config) -> anyhow::Result<()> {
    config.validate().context("invalid config")?;
    if let Some(backend) = args.backend.as_deref() {
        tts::provider::select_backend(backend)?;
    }

    let script = args.script.unwrap_or(config.call.script);
    // with --json, stdout carries only the record
    let echo = if args.json { Echo::Stderr } else { Echo::Stdout };
    let ctx = dialogue::CallContext::from_config(config, args.client_id);
    let mut voice = tts::TtsVoice::new(config, args.backend.as_deref()).with_echo(echo);
    let mut recognizer = build_recognizer(&args, config, echo)?;

    let record = dialogue::run_call(script, &ctx, &mut voice, recognizer.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!();
        print!("{}", call_log::render_table(&record));
    }

    match args.format.unwrap_or(config.log.format) {
        call_log::LogFormat::Csv => {
            let path = args.log.as_deref().unwrap_or(config.log.path.as_path());
            call_log::append_csv(path, &record)?;
            tracing::info!(path = %path.display(), "call logged");
        }
        call_log::LogFormat::Table => {}
    }

    Ok(())
}

fn build_recognizer(
    args: &cli::CallArgs,
    config: &Config,
    echo: Echo,
) -> anyhow::Result<Box<dyn SpeechRecognizer>> {
    let choice = match (args.stt, &args.transcript) {
        (Some(choice), _) => choice,
        (None, Some(_)) => SttChoice::Scripted,
        (None, None) => match config.stt.backend {
            SttBackendKind::Google => SttChoice::Google,
            SttBackendKind::Console => SttChoice::Console,
        },
    };

    Ok(match choice {
        SttChoice::Google => Box::new(GoogleRecognizer::from_config(config)?.with_echo(echo)),
        SttChoice::Console => Box::new(ConsoleRecognizer::stdin().with_echo(echo)),
        SttChoice::Scripted => {
            let path = args
                .transcript
                .as_deref()
                .context("--stt scripted requires --transcript")?;
            Box::new(ScriptedRecognizer::from_file(path)?)
        }
    })
}

fn stats(args: cli::StatsArgs, config: &Config) -> anyhow::Result<()> {
    let path = args.log.as_deref().unwrap_or(config.log.path.as_path());
    let stats = match call_log::read_stats(path)? {
        Some(stats) => stats,
        None => {
            println!("No call logs at {}", path.display());
            return Ok(());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", call_log::render_stats(&stats));
    }

    if let Some(svg_path) = args.svg {
        std::fs::write(&svg_path, call_log::render_pie_svg(&stats))
            .with_context(|| format!("write chart {}", svg_path.display()))?;
        println!("Chart written to {}", svg_path.display());
    }

    Ok(())
}

fn classify(args: cli::ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let classifier = intent::IntentClassifier::for_set(args.set, args.language)
        .with_extra_keywords(&config.intents.extra_keywords);
    println!("{}", classifier.classify(&speech::normalize(&args.text)));
    Ok(())
}

#[derive(Serialize)]
struct PhraseEntry {
    language: Language,
    key: PhraseKey,
    text: &'static str,
}

fn phrases_cmd(args: cli::PhrasesArgs) -> anyhow::Result<()> {
    let languages = match args.language {
        Some(language) => vec![language],
        None => Language::ALL.to_vec(),
    };
    let entries: Vec<PhraseEntry> = languages
        .iter()
        .flat_map(|language| {
            PhraseKey::all().iter().map(move |key| PhraseEntry {
                language: *language,
                key: *key,
                text: phrase(*language, *key),
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in entries {
        println!("[{}] {:?}: {}", entry.language, entry.key, entry.text);
    }
    Ok(())
}

fn prerender(args: cli::PrerenderArgs, config: &Config) -> anyhow::Result<()> {
    let languages = if args.language.is_empty() {
        Language::ALL.to_vec()
    } else {
        args.language
    };
    let (rendered, cached) = tts::prerender(config, &languages, args.backend.as_deref())?;
    println!("Rendered {rendered} prompts ({cached} already cached)");
    Ok(())
}

fn test_tts(args: cli::TestTtsArgs, config: &Config) -> anyhow::Result<()> {
    let text = args
        .text
        .unwrap_or_else(|| phrase(args.language, PhraseKey::Greet).to_string());

    let rendered = tts::synthesize(&text, args.language, config, args.backend.as_deref())
        .context("tts synthesis")?;

    if let Some(path) = args.output {
        std::fs::write(path, &rendered.audio).context("write output")?;
    }

    tts::play_audio(&rendered, config)
}

fn backends(args: cli::BackendsArgs, config: &Config) -> anyhow::Result<()> {
    let info = tts::backends_info(config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("TTS backends:");
    for backend in info.backends {
        let status = if backend.available { "available" } else { "unavailable" };
        let kind = if backend.network { ", network" } else { "" };
        println!("- {} ({status}{kind})", backend.name);
    }

    if let Some(cache_dir) = info.cache_dir {
        println!("Cache dir: {}", cache_dir.display());
    }

    Ok(())
}

fn system_info(args: cli::SystemInfoArgs, config: &Config) -> anyhow::Result<()> {
    let info = system::detect(config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("OS: {}", info.os);
    println!("Arch: {}", info.arch);
    if let Some(cores) = info.cpu_cores {
        println!("CPU cores: {}", cores);
    }
    for (label, tools) in [
        ("Speech engines", &info.speech_engines),
        ("Players", &info.players),
        ("Recorders", &info.recorders),
    ] {
        let found: Vec<_> = tools
            .iter()
            .filter(|t| t.path.is_some())
            .map(|t| t.name.as_str())
            .collect();
        let found = if found.is_empty() {
            "none".to_string()
        } else {
            found.join(", ")
        };
        println!("{label}: {found}");
    }
    println!(
        "Speech API key: {}",
        if info.stt_key_configured { "configured" } else { "missing" }
    );

    Ok(())
}

fn config_cmd(args: cli::ConfigArgs, config: &Config) -> anyhow::Result<()> {
    if args.init {
        let path = Config::init_default()?;
        println!("Initialized config at {}", path.display());
        return Ok(());
    }

    if args.show {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    if args.validate {
        config.validate()?;
        println!("Config OK");
        return Ok(());
    }

    let path = Config::default_path()?;
    println!("{}", path.display());
    Ok(())
}
