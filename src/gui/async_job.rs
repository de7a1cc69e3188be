//! Background jobs polled from the UI thread.
//!
//! Each job runs on its own thread with a current-thread tokio runtime and
//! hands its result back over a std channel, so `update` never blocks.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tokio::runtime::Builder;

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T: Send + 'static> AsyncJob<T> {
    /// Run the future built by `builder` on a worker thread.
    pub fn spawn<FutBuilder, Fut>(builder: FutBuilder) -> Self
    where
        FutBuilder: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(builder()),
                Err(e) => Err(anyhow!("Failed to create async runtime: {}", e)),
            };
            let _ = tx.send(result);
        });
        Self::new(rx)
    }
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// `Some` once the job has finished, `None` while it is still running.
    pub fn poll(&mut self) -> Option<Result<T>> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(res) => {
                self.receiver = None;
                Some(res)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(anyhow!("Worker task disconnected")))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Whether an optional job slot holds a job that has not finished.
pub fn is_busy<T>(slot: &Option<AsyncJob<T>>) -> bool {
    slot.as_ref().map(|job| job.is_running()).unwrap_or(false)
}
