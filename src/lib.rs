pub mod agent;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result};
use reqwest::Client;
use std::io;
use tracing::{debug, info};

use agent::Agent;
use agent::dispatch::FunctionDispatcher;
use config::Config;
use model_gateway::HttpModelGateway;
use repl::run_repl;

pub async fn run() -> Result<()> {
    let cfg = Config::from_env();
    info!(
        model = %cfg.model,
        api_url = %cfg.model_api_url,
        api_key_var = %cfg.api_key_var,
        max_turns = cfg.max_turns,
        timeout_secs = ?cfg.model_timeout_secs,
        max_attempts = cfg.retry.max_attempts,
        "loaded runtime configuration"
    );

    let mut builder = Client::builder();
    if let Some(timeout) = cfg.model_timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder
        .build()
        .context("Failed to initialize HTTP client")?;

    let gateway = HttpModelGateway::new(&client, &cfg);
    let mut agent = Agent::new(&gateway, &cfg, FunctionDispatcher::default());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let exit = run_repl(&mut agent, &mut input, &mut output).await?;
    debug!(?exit, turns = agent.turns(), "conversation ended");
    Ok(())
}
