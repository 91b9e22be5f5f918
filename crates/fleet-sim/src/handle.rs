//! Real-time host: a driver thread ticking a shared [`Sim`].
//!
//! ```text
//!  control thread(s)                      driver thread
//!  ─────────────────                      ─────────────
//!  send(Command) ──► crossbeam channel ──► drained into Sim at tick boundary
//!  start/pause/stop ──► Mutex<Sim> ◄────── tick() while Running
//!  snapshot() ◄──── RwLock<Arc<Snapshot>> ◄── published after every tick
//! ```
//!
//! Readers clone the `Arc` and never hold a lock across a tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use fleet_dispatch::AssignmentPolicy;
use fleet_grid::Router;

use crate::{Command, NoopObserver, RunState, Sim, SimError, SimObserver, SimResult, Snapshot};

pub struct SimHandle<R, P>
where
    R: Router + 'static,
    P: AssignmentPolicy + 'static,
{
    sim:      Arc<Mutex<Sim<R, P>>>,
    latest:   Arc<RwLock<Arc<Snapshot>>>,
    commands: Sender<Command>,
    shutdown: Sender<()>,
    driver:   Option<JoinHandle<()>>,
}

impl<R, P> SimHandle<R, P>
where
    R: Router + 'static,
    P: AssignmentPolicy + 'static,
{
    /// Move `sim` onto a driver thread.  It stays in its current run state;
    /// call [`SimHandle::start`] to begin ticking.
    pub fn spawn(sim: Sim<R, P>) -> Self {
        Self::spawn_with(sim, NoopObserver)
    }

    pub fn spawn_with<O: SimObserver + Send + 'static>(sim: Sim<R, P>, observer: O) -> Self {
        let latest = Arc::new(RwLock::new(Arc::new(sim.snapshot())));
        let sim = Arc::new(Mutex::new(sim));
        let (commands, command_rx) = unbounded::<Command>();
        let (shutdown, shutdown_rx) = unbounded::<()>();

        let driver = {
            let sim = Arc::clone(&sim);
            let latest = Arc::clone(&latest);
            thread::spawn(move || drive(sim, latest, command_rx, shutdown_rx, observer))
        };

        Self { sim, latest, commands, shutdown, driver: Some(driver) }
    }

    /// Queue a command for the next tick boundary.
    pub fn send(&self, command: Command) -> SimResult<()> {
        self.commands.send(command).map_err(|_| SimError::Disconnected)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn start(&self) {
        self.control(|sim| sim.start());
    }

    pub fn pause(&self) {
        self.control(|sim| sim.pause());
    }

    pub fn stop(&self) {
        self.control(|sim| sim.stop());
    }

    pub fn set_speed(&self, speed: f32) -> f32 {
        let mut sim = lock(&self.sim);
        sim.set_speed(speed)
    }

    pub fn state(&self) -> RunState {
        lock(&self.sim).state
    }

    /// Run `f` with exclusive access, between ticks.
    pub fn with_sim<T>(&self, f: impl FnOnce(&mut Sim<R, P>) -> T) -> T {
        let mut sim = lock(&self.sim);
        f(&mut sim)
    }

    /// Stop the driver thread and hand the simulation back.
    pub fn shutdown(mut self) -> Option<Sim<R, P>> {
        self.join();
        let sim = Arc::clone(&self.sim);
        drop(self);
        Arc::into_inner(sim).map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn control(&self, f: impl FnOnce(&mut Sim<R, P>)) {
        let mut sim = lock(&self.sim);
        f(&mut sim);
        publish(&self.latest, sim.snapshot());
    }

    fn join(&mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = self.shutdown.send(());
            if driver.join().is_err() {
                tracing::error!(target: "fleet_sim::handle", "driver thread panicked");
            }
        }
    }
}

impl<R, P> Drop for SimHandle<R, P>
where
    R: Router + 'static,
    P: AssignmentPolicy + 'static,
{
    fn drop(&mut self) {
        self.join();
    }
}

// ── Driver loop ───────────────────────────────────────────────────────────────

fn drive<R, P, O>(
    sim: Arc<Mutex<Sim<R, P>>>,
    latest: Arc<RwLock<Arc<Snapshot>>>,
    commands: Receiver<Command>,
    shutdown: Receiver<()>,
    mut observer: O,
) where
    R: Router,
    P: AssignmentPolicy,
    O: SimObserver,
{
    tracing::debug!(target: "fleet_sim::handle", "driver started");
    loop {
        let interval = lock(&sim).tick_interval();
        match shutdown.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let mut guard = lock(&sim);
        for command in commands.try_iter() {
            guard.submit(command);
        }
        if guard.state != RunState::Running {
            continue;
        }
        if let Err(e) = guard.tick(&mut observer) {
            tracing::error!(target: "fleet_sim::handle", error = %e, "tick failed; pausing");
            guard.pause();
        }
        publish(&latest, guard.snapshot());
    }
    observer.on_sim_end(lock(&sim).clock.current_tick);
    tracing::debug!(target: "fleet_sim::handle", "driver stopped");
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn publish(latest: &RwLock<Arc<Snapshot>>, snapshot: Snapshot) {
    *latest.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
}
