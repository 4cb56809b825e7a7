use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_risk_app::commands::parse_command;
use health_risk_app::intake::{Flow, IntakeSession};
use health_risk_app::render;
use health_risk_client::{AssessmentController, ClientConfig, HttpPredictionClient};

/// Entry point for the terminal intake
///
/// This function:
/// 1. Loads environment variables from a .env file
/// 2. Sets up tracing on stderr so logs do not mix with rendered output
/// 3. Builds the prediction client from the environment
/// 4. Reads commands from stdin until `quit` or end of input
#[tokio::main]
async fn main() -> Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    let config = ClientConfig::from_env().context("Invalid prediction service configuration")?;
    info!("Using prediction service at {}", config.base_url);

    let client = HttpPredictionClient::new(config).context("Failed to create prediction client")?;
    let controller = Arc::new(AssessmentController::new(client));

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session = IntakeSession::new(controller, tx);

    println!("Health Risk Intake - Early Risk Prediction");
    println!("{}", render::help_text());
    println!();
    println!("{}", render::render_form(&session.controller().form()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(text) = rx.recv() => {
                println!("{}", text);
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if session.execute(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    // Let an outstanding submission report before exiting
    if session.controller().is_loading() {
        info!("Waiting for the outstanding assessment to finish");
    }
    session.wait_for_submission().await;
    while let Ok(text) = rx.try_recv() {
        println!("{}", text);
    }

    info!("Intake session closed");
    Ok(())
}
