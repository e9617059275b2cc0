use clap::Parser;
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::PathBuf;

mod app;
mod config;
mod input;
mod match_controller;
mod store;

use app::ScoreboardApp;
use config::Config;
use input::Bindings;
use match_controller::MatchController;
use store::{FileStore, KeyValueStore, MemoryStore};

const APP_NAME: &str = "scoreboard";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Directory for stored settings and results, overrides the config file
    data_dir: Option<PathBuf>,

    #[clap(long, short)]
    /// Keep settings and results in memory only
    ephemeral: bool,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn platform_dir(name: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut path = directories::BaseDirs::new()
        .ok_or("Could not find a directory to store data")?
        .data_local_dir()
        .to_path_buf();
    path.push(name);
    Ok(path)
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match args.log_location {
        Some(ref path) => path.clone(),
        None => platform_dir("beach-scoreboard-logs")?,
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path;
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    println!("Log path: {}", log_path.display());

    // Only log to the console in debug mode
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("Log location is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Dependencies only log errors
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level))
        .logger(Logger::builder().build("beach_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    Ok(())
}

fn load_config() -> Config {
    match confy::get_configuration_file_path(APP_NAME, None) {
        Ok(path) => info!("Reading config file from {path:?}"),
        Err(e) => warn!("Can't locate config file: {e}"),
    }

    match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            if let Err(e) = confy::store(APP_NAME, None, &config) {
                error!("Failed to write default config: {e}");
            }
            config
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logging(&args)?;
    info!("Starting scoreboard");

    let config = load_config();

    let defaults = config.defaults.clone().validated().unwrap_or_else(|e| {
        warn!("Ignoring default settings from the config file: {e}");
        Default::default()
    });

    let store: Box<dyn KeyValueStore> = if args.ephemeral {
        info!("Keeping settings and results in memory only");
        Box::new(MemoryStore::new())
    } else {
        let dir = match args.data_dir.or(config.storage.data_dir) {
            Some(dir) => dir,
            None => platform_dir("beach-scoreboard")?,
        };
        Box::new(FileStore::new(dir)?)
    };

    info!("Touch undo binding: {}", config.touch_undo);
    let tm = MatchController::new(store, defaults);
    ScoreboardApp::new(tm, Bindings::new(config.touch_undo))
        .run()
        .await;

    info!("Scoreboard stopped");
    Ok(())
}
