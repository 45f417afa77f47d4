use crate::Simulation;
use log::{debug, error};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Sleeps for `interval`, returning early once `flag` is cleared
fn pause(flag: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    while flag.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        // woken early by `Runner::stop`; spurious wakeups loop around
        thread::park_timeout(deadline - now);
    }
}

/// Steps a shared [`Simulation`] on a dedicated thread
///
/// Each iteration checks the running flag, waits for the simulation's current
/// interval, checks the flag again, then computes and installs one generation
/// while holding the lock. `on_step` is called with the lock still held and the
/// new generation number, so it must not lock the simulation itself.
///
/// Stopping is best-effort: a step already in progress finishes first.
pub struct Runner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Runner {
    pub fn start<F>(sim: Arc<Mutex<Simulation>>, mut on_step: F) -> Self
    where
        F: FnMut(&Simulation) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            debug!("runner started");
            while flag.load(Ordering::Acquire) {
                let interval = match sim.lock() {
                    Ok(sim) => sim.settings().interval,
                    Err(_) => {
                        error!("simulation lock poisoned, stopping runner");
                        break;
                    }
                };
                pause(&flag, interval);
                if !flag.load(Ordering::Acquire) {
                    break;
                }

                let Ok(mut sim) = sim.lock() else {
                    error!("simulation lock poisoned, stopping runner");
                    break;
                };
                sim.step();
                on_step(&sim);
            }
            flag.store(false, Ordering::Release);
            debug!("runner stopped");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the running flag and waits for the thread to exit
    ///
    /// A pending delay is cut short.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                error!("runner thread panicked");
            }
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.stop();
    }
}
