use anyhow::Result;
use pomoclock::components::LineMode;
use pomoclock::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load the configuration (file + environment).
    let config = PomodoroConfig::load()?;

    // 2. Initialize structured logging. Logs go to stderr so the clock owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 3. Wire the terminal collaborators and create the engine.
    let collaborators = pomoclock::default_collaborators(&config, LineMode::Inline);
    let engine = PomodoroEngine::new(config, collaborators);
    let handle = engine.handle();

    // 4. Log phase changes as they happen.
    spawn_event_listeners(&handle);

    // 5. Start the first work interval right away and run until Ctrl+C.
    handle.toggle().await?;
    engine.run().await?;

    Ok(())
}

/// Spawns tasks that log the engine's low-frequency event streams.
fn spawn_event_listeners(handle: &EngineHandle) {
    let mut system_rx = handle.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });

    let mut timer_rx = handle.subscribe_timer_events();
    tokio::spawn(async move {
        loop {
            match timer_rx.recv().await {
                Ok(TimerEvent::PhaseCompleted { phase, completed_count, at }) => {
                    info!("[PHASE] {} finished at {} ({} done)", phase, at.format("%H:%M:%S"), completed_count);
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    });
}
