// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use hola::app_config::{self, Config};
use hola::errors::AppError;
use hola::Controller;

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
    /// Translate a text, from the store when it is already known
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,

        /// Story or document title the text belongs to
        #[arg(long)]
        title: Option<String>,
    },

    /// Translate every paragraph of a text file
    File {
        /// UTF-8 text file, paragraphs separated by blank lines
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Title to group the paragraphs under
        #[arg(long)]
        title: String,

        /// Write the bilingual transcript to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look a text up in the store without fetching
    Lookup {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Print the bilingual transcript of a stored title
    Transcript {
        #[arg(value_name = "TITLE")]
        title: String,
    },

    /// Show store statistics
    Stats,

    /// Generate shell completions for hola
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Keep translations in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Source language code (e.g., 'es')
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// SQLite database path
    #[arg(long, global = true, env = "HOLA_DB")]
    db: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, global = true, env = "HOLA_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Seconds to wait for the translated text
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// Hola - cached translation lookup
///
/// Answers translation lookups from a local store and fetches unknown texts
/// from a translation web page through a headless browser.
#[derive(Parser, Debug)]
#[command(name = "hola")]
#[command(version)]
#[command(about = "Cached Spanish to English translation lookup")]
#[command(long_about = "Hola answers translation lookups from a local store and fetches unknown
texts from a translation web page through a headless browser driven over WebDriver.

EXAMPLES:
    hola translate \"Hola\"                        # Translate one text
    hola file cuento.txt --title \"El cuento\"     # Translate a story, paragraph by paragraph
    hola file cuento.txt --title t -o out.txt    # Also write the bilingual transcript
    hola lookup \"Hola\"                           # Store only, never fetches
    hola transcript \"El cuento\"                  # Print a stored story
    hola stats                                   # Store statistics
    hola completions bash > hola.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

    Fetching needs a running WebDriver server (e.g. chromedriver --port=9515).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "hola", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.global.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level((&level).into());
    }

    let config = load_config(&cli.global)?;
    if cli.global.log_level.is_none() {
        log::set_max_level((&config.log_level).into());
    }

    let controller = if cli.global.ephemeral {
        info!("Ephemeral mode: translations are kept in memory only");
        Controller::ephemeral(config)?
    } else {
        Controller::with_config(config)?
    };

    if let Err(e) = run_command(&controller, cli.command).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
    Ok(())
}

async fn run_command(controller: &Controller, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Translate { text, title } => {
            let translated = controller.translate(&text, title.as_deref()).await?;
            println!("{}", translated);
        }
        Commands::File {
            path,
            title,
            output,
        } => {
            let report = controller.translate_file(&path, &title).await?;
            if let Some(output) = output {
                controller.write_transcript(&report, &output)?;
            }
            println!(
                "Translated: {}, failed: {}",
                report.translated(),
                report.failed
            );
            println!("{}", controller.service_stats());
            if report.failed > 0 {
                warn!("{} paragraphs were not translated", report.failed);
            }
        }
        Commands::Lookup { text } => match controller.lookup(&text).await? {
            Some(translated) => println!("{}", translated),
            None => {
                warn!("'{}' is not in the store", text);
                std::process::exit(1);
            }
        },
        Commands::Transcript { title } => {
            print!("{}", controller.transcript(&title).await?);
        }
        Commands::Stats => {
            println!("{}", controller.store_stats().await?);
        }
        Commands::Completions { .. } => {}
    }
    Ok(())
}

/// Load the config file, creating a default one when missing, then apply CLI overrides
fn load_config(options: &GlobalOptions) -> Result<Config, AppError> {
    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse config file {}: {}",
                options.config_path, e
            ))
        })?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            options.config_path
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)?;
        config
    };

    if let Some(source) = &options.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &options.target_language {
        config.target_language = target.clone();
    }
    if let Some(db) = &options.db {
        config.store.path = Some(db.clone());
    }
    if let Some(url) = &options.webdriver_url {
        config.browser.webdriver_url = url.clone();
    }
    if let Some(timeout) = options.timeout_secs {
        config.extractor.timeout_secs = timeout;
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    Ok(config)
}
