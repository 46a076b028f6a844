use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative shutdown flag. `ctrlc` registers a handler that flips this
/// on SIGINT/SIGTERM; the ingest loop polls it between sections so a
/// checkpoint can be written before the process actually exits
/// (spec.md §4.7, exit code 3).
#[derive(Clone)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Installs the process-wide SIGINT/SIGTERM handler. Returns an error
    /// if a handler is already registered (`ctrlc::set_handler` may only
    /// be called once per process).
    pub fn install() -> Result<Self, ctrlc::Error> {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = flag.clone();
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })?;
        Ok(Self { flag })
    }

    /// A signal-free instance for callers that don't want to touch global
    /// process state, e.g. unit tests exercising the checkpoint loop.
    pub fn inert() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}
