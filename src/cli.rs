use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::call_log::LogFormat;
use crate::dialogue::Script;
use crate::intent::RuleSet;
use crate::language::Language;

#[derive(Parser, Debug)]
#[command(name = "collections-bot", version, about = "Scripted outbound collections voice bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, value_name = "PATH", help = "Config file to use instead of the default lookup")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Call(CallArgs),
    Stats(StatsArgs),
    Classify(ClassifyArgs),
    Phrases(PhrasesArgs),
    Prerender(PrerenderArgs),
    TestTts(TestTtsArgs),
    Backends(BackendsArgs),
    SystemInfo(SystemInfoArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SttChoice {
    Google,
    Console,
    Scripted,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    #[arg(long, help = "Client identifier recorded in the log")]
    pub client_id: Option<u64>,

    #[arg(long, value_enum, help = "Call script")]
    pub script: Option<Script>,

    #[arg(long, help = "Override TTS backend (system, gtts, coqui, silent)")]
    pub backend: Option<String>,

    #[arg(long, value_enum, help = "Speech recognizer")]
    pub stt: Option<SttChoice>,

    #[arg(long, value_name = "PATH", help = "Replies to replay, one per line (implies --stt scripted)")]
    pub transcript: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Call log file")]
    pub log: Option<PathBuf>,

    #[arg(long, value_enum, help = "Log format")]
    pub format: Option<LogFormat>,

    #[arg(long, help = "Print the call record as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[arg(long, value_name = "PATH", help = "Call log file")]
    pub log: Option<PathBuf>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, value_name = "PATH", help = "Write a pie chart as SVG")]
    pub svg: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[arg(long, value_enum, default_value = "payment", help = "Keyword rule set")]
    pub set: RuleSet,

    #[arg(long, value_enum, default_value = "en", help = "Reply language")]
    pub language: Language,

    #[arg(value_name = "TEXT", help = "Reply text")]
    pub text: String,
}

#[derive(Args, Debug)]
pub struct PhrasesArgs {
    #[arg(long, value_enum, help = "Only this language")]
    pub language: Option<Language>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PrerenderArgs {
    #[arg(long, value_enum, help = "Languages to render (default: all)")]
    pub language: Vec<Language>,

    #[arg(long, help = "TTS backend")]
    pub backend: Option<String>,
}

#[derive(Args, Debug)]
pub struct TestTtsArgs {
    #[arg(long, help = "Text to synthesize")]
    pub text: Option<String>,

    #[arg(long, value_enum, default_value = "en", help = "Language")]
    pub language: Language,

    #[arg(long, help = "TTS backend")]
    pub backend: Option<String>,

    #[arg(long, value_name = "PATH", help = "Save audio to file")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BackendsArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SystemInfoArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, help = "Show current config as JSON")]
    pub show: bool,

    #[arg(long, help = "Create default config file")]
    pub init: bool,

    #[arg(long, help = "Validate configuration")]
    pub validate: bool,
}
