//! Power Skills terminal player entry point.

use std::time::Duration;

use powerskills_cli::app::{App, Reply};
use powerskills_cli::config::{Config, LogFormat};
use powerskills_cli::error::AppError;
use powerskills_content::{default_journey, load_from_path};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.compact().init(),
    }
}

async fn write_block(stdout: &mut Stdout, text: &str) -> Result<(), AppError> {
    if text.is_empty() {
        return Ok(());
    }
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n\n").await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        tick_ms = config.tick_ms,
        autoplay = config.autoplay,
        "Starting Power Skills terminal player"
    );

    let loaded = match &config.journey_path {
        Some(path) => load_from_path(path)?,
        None => default_journey()?,
    };

    let mut app = App::new(loaded, &config);
    let mut stdout = tokio::io::stdout();
    let opening = app.start().await?;
    write_block(&mut stdout, &opening).await?;
    write_block(&mut stdout, "Escribe `help` para ver los comandos.").await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match app.handle_line(&line).await? {
                    Reply::Output(text) => write_block(&mut stdout, &text).await?,
                    Reply::Quit => break,
                }
            }
            _ = ticker.tick() => {
                if let Some(text) = app.tick().await? {
                    write_block(&mut stdout, &text).await?;
                }
            }
        }
    }

    tracing::info!(
        journey_id = %app.sequencer().journey_id(),
        scene = %app.sequencer().current_scene(),
        "Power Skills terminal player stopped"
    );
    Ok(())
}
