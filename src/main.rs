// src/main.rs

use chat_client::{
    client::{ChatClient, UserIntent},
    config::ClientConfig,
    error::ClientError,
    terminal::{TerminalView, forward_stdin},
};
use clap::Parser;
use std::{io, process::ExitCode};
use tokio::sync::mpsc;

/// The main entry point for the client.
/// Everything runs on one thread; callbacks never overlap.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ClientConfig::parse();
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let (tx, rx) = mpsc::unbounded_channel();
    forward_stdin(tx.clone());

    // Ctrl-C counts as leaving the page.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(UserIntent::Unload);
            }
            Err(e) => log::warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    let client = ChatClient::initialize(&config, TerminalView::new(io::stdout(), io::stderr())).await;
    let mut view = client.run(rx).await;
    view.flush()?;
    Ok(())
}
