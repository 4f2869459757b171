use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use villagemap::app::{ConsoleCommand, Dashboard, HELP};
use villagemap::kernel::services::adapters::{
    load_settings, load_settings_from, AsyncRuntime, HttpDataSource,
};
use villagemap::kernel::services::ports::Settings;
use villagemap::ui::backend::console::ConsoleBackend;

mod logging;

const TICK: Duration = Duration::from_millis(50);
const LOG_LINES_SHOWN: usize = 20;

/// County/village bivariate map dashboard, driven from the console.
#[derive(Debug, Parser)]
#[command(name = "villagemap", version)]
struct Cli {
    /// Base URL of the data service.
    #[arg(long)]
    api_url: Option<String>,

    /// Settings file to use instead of the one in the cache directory.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Quiet period after a weight change before colors are refetched.
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Log level for the villagemap target (overrides RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn settings_for(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path).map_err(|e| e.to_string())?,
        None => load_settings(),
    };
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(ms) = cli.debounce_ms {
        settings.debounce_ms = ms;
    }
    Ok(settings)
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut logging_guard = logging::init(cli.log_level.as_deref());
    let log_rx = logging_guard.as_mut().and_then(|g| g.take_log_rx());
    if let Some(guard) = &logging_guard {
        println!("logs: {}", guard.log_dir().display());
    }

    let settings = match settings_for(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(api = %settings.api_base_url, debounce_ms = settings.debounce_ms, "settings resolved");

    let source = match HttpDataSource::new(&settings.api_base_url, settings.request_timeout()) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "http client init failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel();
    let runtime = match AsyncRuntime::new(Arc::new(source), tx) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut dashboard = Dashboard::new(
        settings.map_config(),
        runtime,
        rx,
        ConsoleBackend::stdout(),
        log_rx,
    );
    if let Err(e) = dashboard.start() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    println!("type `help` for commands");

    let input = spawn_stdin_reader();
    loop {
        match input.recv_timeout(TICK) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<ConsoleCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match command {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Help => println!("{HELP}"),
                    ConsoleCommand::Status => print!("{}", dashboard.status()),
                    ConsoleCommand::Logs => {
                        let lines: Vec<&str> = dashboard.logs().collect();
                        let start = lines.len().saturating_sub(LOG_LINES_SHOWN);
                        for line in &lines[start..] {
                            println!("{line}");
                        }
                    }
                    command => {
                        if let Some(action) = command.into_action(dashboard.state(), Instant::now())
                        {
                            dashboard.dispatch(action);
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Input ended; let outstanding requests land before exiting.
                dashboard.wait_idle(settings.request_timeout());
                break;
            }
        }
        dashboard.tick(Instant::now());
    }

    tracing::info!("exiting");
    ExitCode::SUCCESS
}
