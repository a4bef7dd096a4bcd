//! Simulation host - owns the world on one tokio task
//!
//! Commands, queries and interval-driven ticks are all handled by the same
//! task, so a tick never interleaves with command application. The core
//! itself has no timers; this is the only place ticks are scheduled.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::command::{Command, CommandExecutor, CommandOutcome};
use crate::core::error::{ColonyError, Result};
use crate::ecs::world::World;
use crate::simulation::tick::{run_tick, TickEvent};

const REQUEST_BUFFER: usize = 64;

type Inspector = Box<dyn FnOnce(&World) + Send>;

/// Requests accepted by the host task
pub enum HostRequest {
    Apply {
        command: Command,
        reply: oneshot::Sender<Result<CommandOutcome>>,
    },
    /// Run a read-only closure against the world
    Inspect(Inspector),
    Shutdown,
}

/// Cloneable sender side of a running host
#[derive(Clone)]
pub struct HostHandle {
    sender: mpsc::Sender<HostRequest>,
}

impl HostHandle {
    /// Apply a command and wait for its outcome
    pub async fn send(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(HostRequest::Apply { command, reply })
            .await
            .map_err(|_| ColonyError::HostClosed)?;
        rx.await.map_err(|_| ColonyError::HostClosed)?
    }

    /// Read something out of the world between ticks
    pub async fn inspect<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&World) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let inspector: Inspector = Box::new(move |world| {
            let _ = tx.send(f(world));
        });
        self.sender
            .send(HostRequest::Inspect(inspector))
            .await
            .map_err(|_| ColonyError::HostClosed)?;
        rx.await.map_err(|_| ColonyError::HostClosed)
    }

    /// JSON state tree for renderers
    pub async fn snapshot(&self) -> Result<String> {
        self.inspect(|world| world.snapshot_json()).await?
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(HostRequest::Shutdown)
            .await
            .map_err(|_| ColonyError::HostClosed)
    }
}

pub struct SimulationHost {
    world: World,
    requests: mpsc::Receiver<HostRequest>,
}

impl SimulationHost {
    pub fn new(world: World) -> (Self, HostHandle) {
        let (sender, requests) = mpsc::channel(REQUEST_BUFFER);
        (Self { world, requests }, HostHandle { sender })
    }

    /// Spawn the host on the current runtime. The join handle yields the
    /// world back after shutdown.
    pub fn spawn(world: World) -> (HostHandle, JoinHandle<World>) {
        let (host, handle) = Self::new(world);
        (handle, tokio::spawn(host.run()))
    }

    pub async fn run(mut self) -> World {
        let period = Duration::from_millis(self.world.config.ms_per_tick.max(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Simulation host running ({}ms per tick)", period.as_millis());

        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(request) = request else { break };
                    let was_ticking = self.world.ticking;
                    if !self.handle(request) {
                        break;
                    }
                    if self.world.ticking && !was_ticking {
                        ticker.reset();
                    }
                }
                _ = ticker.tick(), if self.world.ticking => {
                    let events = run_tick(&mut self.world);
                    log_events(&events);
                }
            }
        }

        tracing::info!("Simulation host stopped at tick {}", self.world.time);
        self.world
    }

    /// Returns false once the host should stop
    fn handle(&mut self, request: HostRequest) -> bool {
        match request {
            HostRequest::Apply { command, reply } => {
                let name = command.name();
                let result = CommandExecutor::execute(&mut self.world, command);
                match &result {
                    Ok(CommandOutcome::Ticked { events }) => log_events(events),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Rejected {}: {}", name, e),
                }
                let _ = reply.send(result);
                true
            }
            HostRequest::Inspect(inspector) => {
                inspector(&self.world);
                true
            }
            HostRequest::Shutdown => false,
        }
    }
}

fn log_events(events: &[TickEvent]) {
    for event in events {
        tracing::debug!(?event, "tick event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ColonyConfig;
    use crate::core::types::{EntityId, GridPos};
    use crate::entity::factory::make_food;

    #[tokio::test]
    async fn test_commands_are_applied_in_order() {
        let (handle, join) = SimulationHost::spawn(World::new(ColonyConfig::with_world_size(10, 10)));
        let outcome = handle
            .send(Command::CreateEntity {
                entity: make_food(GridPos::new(1, 1), 10, "Crumb"),
            })
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::EntityCreated { id: EntityId(1) });
        handle.send(Command::Tick).await.unwrap();

        let (time, count) = handle.inspect(|w| (w.time, w.store.len())).await.unwrap();
        assert_eq!((time, count), (1, 1));

        handle.shutdown().await.unwrap();
        let world = join.await.unwrap();
        assert_eq!(world.time, 1);
    }

    #[tokio::test]
    async fn test_rejected_command_reports_error() {
        let (handle, join) = SimulationHost::spawn(World::default());
        let result = handle.send(Command::DestroyEntity { id: EntityId(5) }).await;
        assert!(matches!(result, Err(ColonyError::EntityNotFound(_))));
        handle.shutdown().await.unwrap();
        join.await.unwrap();
        assert!(matches!(handle.send(Command::Tick).await, Err(ColonyError::HostClosed)));
    }

    #[tokio::test]
    async fn test_interval_ticks_only_while_started() {
        let mut config = ColonyConfig::with_world_size(10, 10);
        config.ms_per_tick = 1;
        let (handle, join) = SimulationHost::spawn(World::new(config));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.inspect(|w| w.time).await.unwrap(), 0);

        handle.send(Command::StartTick).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.send(Command::StopTick).await.unwrap();
        let stopped_at = handle.inspect(|w| w.time).await.unwrap();
        assert!(stopped_at > 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.inspect(|w| w.time).await.unwrap(), stopped_at);

        let json = handle.snapshot().await.unwrap();
        assert!(json.contains("\"time\""));
        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }
}
