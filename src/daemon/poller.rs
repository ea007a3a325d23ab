use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::daemon::controller::WorkerEvent;

const STOP_CHECK: Duration = Duration::from_millis(50);

/// Sends a `Tick` to the control thread every `interval` until stopped.
pub struct Poller {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start(tx: Sender<WorkerEvent>, interval: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let r2 = running.clone();
        let handle = thread::spawn(move || {
            while r2.load(Ordering::SeqCst) {
                let deadline = Instant::now() + interval;
                loop {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    if !r2.load(Ordering::SeqCst) {
                        return;
                    }
                    thread::sleep(STOP_CHECK.min(deadline - now));
                }
                if tx.send(WorkerEvent::Tick).is_err() {
                    return;
                }
            }
        });
        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
