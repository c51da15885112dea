use std::sync::Arc;

use common::api::TurntableStartRequest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::internals::core::dashboard::Dashboard;

use super::command::ConsoleCommand;

/// Blocking stdin reads run on a plain thread; the runtime never waits on it.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx_line, rx_line) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let failed = line.is_err();
            if tx_line.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx_line
}

/// Task: Read button presses from stdin.
/// Each line is one command. `quit` cancels `token`; the end of input only
/// ends this task.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_console_commands(token: CancellationToken, dashboard: Arc<Dashboard>) {
    info!("Started.");
    let mut rx_line = spawn_stdin_reader();

    loop {
        let line = tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            line = rx_line.recv() => line,
        };

        let line = match line {
            Some(Ok(line)) => line,
            None => {
                info!("Console closed, running headless.");
                break;
            }
            Some(Err(e)) => {
                error!("Failed to read console. Error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => {
                token.cancel();
                break;
            }
            Ok(command) => run_command(&dashboard, command).await,
            Err(e) => warn!("{}", e),
        }
    }
}

async fn run_command(dashboard: &Dashboard, command: ConsoleCommand) {
    debug!("Console command: {:?}", command);
    match command {
        ConsoleCommand::Toggle => {
            info!("Toggle: {:?}", dashboard.toggle_playback().await);
        }
        ConsoleCommand::PlayMedium => {
            info!("Play medium: {:?}", dashboard.play_this_medium().await);
        }
        ConsoleCommand::Stop => {
            info!("Stop: {:?}", dashboard.stop_playback().await);
        }
        ConsoleCommand::Hold(direction) => {
            info!("Hold {}: {:?}", direction, dashboard.hold_jog(direction));
        }
        ConsoleCommand::Release => {
            dashboard.release_jog();
        }
        ConsoleCommand::Jog(direction) => {
            let _ = dashboard.jog_once(direction).await;
        }
        ConsoleCommand::Angle(angle_deg) => {
            let _ = dashboard.move_tone_arm_to(angle_deg).await;
        }
        ConsoleCommand::Home => {
            let _ = dashboard.home_tone_arm().await;
        }
        ConsoleCommand::Position => match dashboard.tone_arm_position().await {
            Ok(position) => info!(
                "Tone-arm at {:.1} deg ({} steps from home).",
                position.angle_deg, position.steps_from_home
            ),
            Err(e) => warn!("Failed to read tone-arm position. Error: {}", e),
        },
        ConsoleCommand::Spin { reverse } => {
            let request = TurntableStartRequest {
                direction: if reverse { -1 } else { 1 },
                speed_rpm: None,
            };
            let _ = dashboard.start_turntable(request).await;
        }
        ConsoleCommand::Halt => {
            let _ = dashboard.stop_turntable().await;
        }
        ConsoleCommand::Turntable => {
            if let Ok(state) = dashboard.turntable_state().await {
                info!(
                    "Turntable spinning: {}, direction: {}, speed: {:.1} rpm",
                    state.is_spinning, state.direction, state.speed_rpm
                );
            }
        }
        ConsoleCommand::Status => {
            let state = dashboard.state();
            match &state.snapshot {
                Some(snapshot) => info!(
                    "{} | this medium playing: {} | busy: {}",
                    snapshot,
                    state.is_this_medium_playing(),
                    dashboard.is_command_in_flight()
                ),
                None => info!("No snapshot yet."),
            }
            if let Some(e) = &state.error {
                warn!("Last refresh failed: {}", e);
            }
        }
        ConsoleCommand::Quit => {}
    }
}
