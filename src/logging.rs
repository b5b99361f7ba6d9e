//! Diagnostic output. Commands log to stderr; the chat widget owns the
//! terminal, so it logs to `<config_dir>/shopwhisper/chat.log` instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, ShopError};

fn level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

pub fn init_stderr(verbose: bool) {
    let directive = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn chat_log_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ShopError::Config("Could not determine config directory".into()))?;
    Ok(config_dir.join("shopwhisper").join("chat.log"))
}

/// Open a log file for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Plain-text subscriber writing to `file`.
pub fn file_subscriber(file: File, verbose: bool) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level(verbose))
        .finish()
}

/// Route diagnostics for the chat widget to the chat log.
pub fn init_chat_log(verbose: bool) -> Result<PathBuf> {
    let path = chat_log_path()?;
    let file = open_log_file(&path)?;
    tracing::subscriber::set_global_default(file_subscriber(file, verbose))
        .map_err(|e| ShopError::Config(format!("Failed to install chat logger: {}", e)))?;
    Ok(path)
}
