//! Headless runner (default binary).
//!
//! Plays one game through the async session with a placement bot and prints the
//! final summary as JSON. Configured from `BLOCKFALL_*` environment variables.

use anyhow::{Context, Result};

use blockfall::engine::{best_plan, session, EngineConfig, SessionHandle};
use blockfall::types::{GameCommand, GameStatus};

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::from_env().context("invalid configuration")?;
    let mut session = session::spawn(&config).await?;

    let result = run(&mut session, config.max_pieces).await;

    // Always try to close the session (and flush the event log).
    let summary = session.shutdown().await?;
    result?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run(session: &mut SessionHandle, max_pieces: u32) -> Result<()> {
    session.send(GameCommand::Start).await?;

    loop {
        // Commands are handled in order, so this sees every earlier command applied.
        let state = session.inspect().await?;
        if state.status() != GameStatus::Running || state.piece_id() >= max_pieces {
            return Ok(());
        }

        let piece_before = state.piece_id();
        let commands = match best_plan(&state) {
            Some(plan) => plan.commands,
            None => vec![GameCommand::HardDrop],
        };
        for command in commands {
            session.send(command).await?;
        }

        session
            .wait_for(|s| s.piece_id != piece_before || s.hud.status != GameStatus::Running)
            .await?;
    }
}
