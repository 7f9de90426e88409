use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use captran::app_config::{self, Config, TranslationProvider};
use captran::translation::{ChunkEvent, ChunkOutcome, LogObserver, PipelineReport, TranslationObserver};
use captran::{Controller, JsonReport};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and translate the captions of a video (default command)
    #[command(alias = "translate")]
    Captions {
        /// Video URL or 11-character video id
        #[arg(value_name = "URL_OR_ID")]
        input: String,
    },

    /// Translate plain text from a file or stdin
    Text {
        /// Text file to translate; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate shell completions for captran
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command
#[derive(Args, Debug)]
struct CommonArgs {
    /// Target language code (e.g., 'ko', 'en', 'pt-BR')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliTranslationProvider>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Fetch captions without translating them
    #[arg(long, global = true)]
    no_translate: bool,
}

/// captran - caption translator
///
/// Fetches the captions of a YouTube video and translates them chunk by chunk.
#[derive(Parser, Debug)]
#[command(name = "captran")]
#[command(version)]
#[command(about = "Fetch and translate YouTube captions")]
#[command(long_about = "captran fetches the captions of a YouTube video and translates them into a target language.

EXAMPLES:
    captran https://youtu.be/dQw4w9WgXcQ           # Translate into the configured language
    captran -t en dQw4w9WgXcQ                      # Translate into English
    captran --no-translate dQw4w9WgXcQ             # Print the cleaned captions only
    captran --json dQw4w9WgXcQ                     # Machine-readable output
    captran text notes.txt -t ja                   # Translate a text file
    echo 'Hello world.' | captran text -p mock     # Translate stdin with the offline provider
    captran completions bash > captran.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google - Public Google web translate endpoint (default)
    mock   - Offline provider that uppercases text")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video URL or 11-character video id
    #[arg(value_name = "URL_OR_ID")]
    input: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// @struct: Chunk observer driving the progress bar
struct ProgressObserver {
    bar: ProgressBar,
    log: LogObserver,
}

impl ProgressObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self {
            bar,
            log: LogObserver,
        }
    }
}

impl TranslationObserver for ProgressObserver {
    fn on_event(&self, event: &ChunkEvent) {
        self.bar.suspend(|| self.log.on_event(event));
        if let ChunkEvent::Completed { outcome, .. } = event {
            if *outcome == ChunkOutcome::Fallback {
                self.bar.set_message(format!("chunk {} kept untranslated", event.index() + 1));
            }
            self.bar.inc(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    let common = cli.common;

    let outcome = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "captran", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Text { file }) => run_text(&common, file).await,
        Some(Commands::Captions { input }) => run_captions(&common, &input).await,
        None => match cli.input {
            Some(input) => run_captions(&common, &input).await,
            None => Err(anyhow!("URL_OR_ID is required when no subcommand is specified")),
        },
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) if common.json => {
            let report = JsonReport::<()>::failure(&e);
            println!("{}", serde_json::to_string_pretty(&report)?);
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

/// Load the config file and apply command line overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&level).into());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level((&config.log_level).into());
    Ok(config)
}

async fn run_captions(options: &CommonArgs, input: &str) -> Result<()> {
    let config = load_config(options)?;
    let observer = Arc::new(ProgressObserver::new());
    let controller = Controller::with_config(config)?.with_observer(observer.clone());

    info!(
        "captran: {} -> '{}'",
        controller.config().translation.provider.display_name(),
        controller.config().target_language
    );

    let transcript = controller.fetch_transcript(input).await?;
    observer.bar.set_length(controller.planned_chunks(&transcript.text) as u64);

    let result = controller.translate_transcript(transcript, !options.no_translate).await;
    observer.bar.finish_and_clear();
    let result = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::success(&result))?);
    } else if result.was_translated {
        println!("{}", result.translated);
    } else {
        println!("{}", result.original);
    }
    Ok(())
}

async fn run_text(options: &CommonArgs, file: Option<PathBuf>) -> Result<()> {
    let config = load_config(options)?;

    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    if options.no_translate {
        let report = PipelineReport {
            text: text.trim_end().to_string(),
            chunks: Vec::new(),
        };
        print_text_report(options, &report)?;
        return Ok(());
    }

    let observer = Arc::new(ProgressObserver::new());
    let controller = Controller::with_config(config)?.with_observer(observer.clone());
    observer.bar.set_length(controller.planned_chunks(&text) as u64);

    let report = controller.translate_text(&text).await;
    observer.bar.finish_and_clear();
    let report = report?;

    if report.is_degraded() {
        error!("Some chunks could not be translated and were kept as-is");
    }

    print_text_report(options, &report)
}

fn print_text_report(options: &CommonArgs, report: &PipelineReport) -> Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::success(report))?);
    } else {
        println!("{}", report.text);
    }
    Ok(())
}
