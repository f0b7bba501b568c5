// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use subctx::app_config::{Config, LogLevel, default_config_path};
use subctx::file_utils::FileManager;
use subctx::providers::{CacheMode, RetryMode};
use subctx::translation::TruncationMode;
use subctx::Controller;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update the stored configuration
    Configure(ConfigureArgs),

    /// Print the current configuration as sorted key=value lines
    ShowConfig,

    /// Translate an SRT subtitle file
    Translate(TranslateArgs),

    /// Generate shell completions for subctx
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConfigureArgs {
    /// Shorthand: model|api_url|nullkey|delay=N|retryN|cache=auto|off
    #[arg(long, default_value = "")]
    login_string: String,

    /// Bearer API key
    #[arg(long)]
    api_key: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Chat completions URL
    #[arg(long)]
    api_url: Option<String>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// 0 no retry, 1 retry once, 2 retry forever, 3 retry forever with delay before every attempt
    #[arg(long, value_parser = parse_retry_mode)]
    retry_mode: Option<RetryMode>,

    /// Token budget for prior dialogue
    #[arg(long)]
    context_budget: Option<usize>,

    /// drop_oldest or smart_trim
    #[arg(long)]
    truncation_mode: Option<TruncationMode>,

    /// auto or off
    #[arg(long)]
    cache_mode: Option<CacheMode>,

    /// Source language code, or "auto"
    #[arg(long)]
    source_language: Option<String>,

    /// Target language code
    #[arg(long)]
    target_language: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Path to the subtitle file (SRT)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the translated SRT (default: <input>.<target>.srt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the original lines under each translation
    #[arg(long)]
    include_original: bool,

    /// Override the API key for this run
    #[arg(long, env = "SUBCTX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the configured source language
    #[arg(short, long)]
    source_language: Option<String>,

    /// Override the configured target language
    #[arg(short, long)]
    target_language: Option<String>,

    /// Fail if no API key is configured
    #[arg(long)]
    require_key: bool,
}

/// subctx - contextual subtitle translation
///
/// Translates SRT subtitles line by line through an OpenAI-compatible API,
/// sending recent dialogue as context.
#[derive(Parser, Debug)]
#[command(name = "subctx")]
#[command(version)]
#[command(about = "Contextual subtitle translation over chat-completion APIs")]
#[command(long_about = "subctx translates SRT subtitles line by line, sending a token-budgeted window of recent dialogue as context.

EXAMPLES:
    subctx configure --login-string 'gpt-4o-mini|retry1|cache=auto'
    subctx configure --login-string 'llama3|http://localhost:11434/v1/chat/completions|nullkey'
    subctx show-config
    subctx translate -i movie.en.srt -o movie.fr.srt -t fr
    subctx translate -i movie.en.srt -t ar --include-original
    subctx completions bash > subctx.bash")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SUBCTX_CONFIG")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

fn parse_retry_mode(value: &str) -> Result<RetryMode, String> {
    let number: u8 = value.parse().map_err(|_| format!("'{}' is not a number between 0 and 3", value))?;
    RetryMode::try_from(number)
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

    // @returns: ANSI colour for log level
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
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
    if let Some(level) = cli.log_level {
        log::set_max_level(level.to_level_filter());
    }

    let config_path = cli.config_path.clone().unwrap_or_else(default_config_path);
    let config_path = FileManager::expand_home(config_path);

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subctx", &mut std::io::stdout());
            Ok(())
        }
        Commands::Configure(args) => run_configure(args, &config_path),
        Commands::ShowConfig => run_show_config(&config_path),
        Commands::Translate(args) => run_translate(args, &config_path, cli.log_level).await,
    }
}

fn run_configure(args: ConfigureArgs, config_path: &Path) -> Result<()> {
    let mut config = Config::load(config_path)?;

    if !args.login_string.trim().is_empty() {
        config.update_from_login_string(&args.login_string);
    }
    if let Some(api_key) = args.api_key {
        config.api_key = api_key;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.delay_ms = delay_ms;
    }
    if let Some(retry_mode) = args.retry_mode {
        config.retry_mode = retry_mode;
    }
    if let Some(budget) = args.context_budget {
        config.context_token_budget = budget;
    }
    if let Some(mode) = args.truncation_mode {
        config.context_truncation_mode = mode;
    }
    if let Some(mode) = args.cache_mode {
        config.context_cache_mode = mode;
    }
    if let Some(source) = args.source_language {
        config.source_language = source;
    }
    if let Some(target) = args.target_language {
        config.target_language = target;
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }

    config.normalise_languages();
    config.validate().context("Configuration validation failed")?;
    config.save(config_path)?;
    info!("Configuration updated: {}", config_path.display());
    Ok(())
}

fn run_show_config(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let mut stdout = std::io::stdout();
    for line in config.to_key_value_lines()? {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}

async fn run_translate(args: TranslateArgs, config_path: &Path, cli_log_level: Option<LogLevel>) -> Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("Failed to load config file: {}", config_path.display()))?;

    if cli_log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if let Some(api_key) = args.api_key.filter(|key| !key.is_empty()) {
        config.api_key = api_key;
    }
    if config.api_key.is_empty() && args.require_key {
        return Err(anyhow!("API key not configured. Use the configure command or pass --api-key."));
    }
    if let Some(source) = args.source_language.filter(|s| !s.is_empty()) {
        config.source_language = source;
    }
    if let Some(target) = args.target_language.filter(|t| !t.is_empty()) {
        config.target_language = target;
    }

    let controller = Controller::with_config(config).context("Configuration validation failed")?;

    let input = FileManager::expand_home(&args.input);
    let output = match args.output {
        Some(path) => FileManager::expand_home(path),
        None => FileManager::generate_output_path(&input, &controller.config().target_language, "srt"),
    };

    let report = controller.translate_file(&input, &output, args.include_original).await?;
    println!("Translated subtitles written to {}", report.output_path.display());
    Ok(())
}
