//! Background loops and shutdown for the lift server.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::commands::LiftCommand;
use crate::traits::RelayOutput;

use super::shared::{blocking, SharedLiftState};

/// Spawn the controller update loop.
///
/// Every `interval_ms` the presence feed is polled and its events are
/// applied on the blocking pool. Failures are logged and the loop keeps
/// running.
pub fn spawn_update_loop<R>(state: Arc<SharedLiftState<R>>, interval_ms: u32) -> JoinHandle<()>
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(u64::from(interval_ms.max(1))));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match blocking(&state, |s| s.update()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(error = %err, "controller update failed"),
                Err(err) => tracing::error!(error = %err, "controller update task failed"),
            }
        }
    })
}

/// Spawn the heartbeat watchdog loop.
pub fn spawn_watchdog_loop<R>(state: Arc<SharedLiftState<R>>, interval_ms: u32) -> JoinHandle<()>
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(u64::from(interval_ms.max(1))));
        loop {
            interval.tick().await;
            match blocking(&state, |s| s.watchdog_tick()).await {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "watchdog stop failed, retrying next check")
                }
                Err(err) => tracing::error!(error = %err, "watchdog task failed"),
            }
        }
    })
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Release both relays before exit.
pub async fn stop_for_shutdown<R>(state: &Arc<SharedLiftState<R>>)
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    match blocking(state, |s| s.apply_command(LiftCommand::Stop)).await {
        Ok(Ok(_)) => tracing::info!("lift stopped for shutdown"),
        Ok(Err(err)) => tracing::error!(error = %err, "failed to stop lift on shutdown"),
        Err(err) => tracing::error!(error = %err, "shutdown stop task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SafetyConfig;
    use crate::hal::{MockFeed, MockRelay};
    use crate::level::{Level, Position};
    use crate::sensor::LevelPresence;
    use crate::traits::Direction;
    use crate::LiftController;

    #[tokio::test]
    async fn update_loop_applies_feed_events() {
        let feed = MockFeed::new();
        let lift = LiftController::new(MockRelay::new(), feed.clone());
        let state = Arc::new(SharedLiftState::new(lift, &SafetyConfig::default()));

        let handle = spawn_update_loop(Arc::clone(&state), 5);
        feed.push(LevelPresence::new(Level::First, true));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(state.status().position, Some(Position::At(Level::First)));
    }

    #[tokio::test]
    async fn shutdown_releases_relays() {
        let lift = LiftController::new(MockRelay::new(), MockFeed::new());
        let state = Arc::new(SharedLiftState::new(lift, &SafetyConfig::default()));
        state
            .apply_command(LiftCommand::Manual {
                direction: Direction::Down,
                engage: true,
            })
            .unwrap();

        stop_for_shutdown(&state).await;
        let status = state.status();
        assert!(!status.relay_up && !status.relay_down);
    }
}
