//! Background request worker.
//!
//! Backend calls block for as long as the network takes. They run on a
//! worker thread so the UI keeps drawing; the main loop polls the handle
//! every tick for step updates and the final outcome.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::application::{LoginOutcome, LoginStep, ScanOutcome};
use crate::domain::{ClassItem, UserInfo, WarehouseItem};
use crate::IwmError;

/// Final result of a background job, tagged by what was requested.
#[derive(Debug)]
pub enum WorkerOutcome {
    Classes(Result<Vec<ClassItem>, IwmError>),
    UserChecked(Result<UserInfo, IwmError>),
    Warehouses(Result<Vec<WarehouseItem>, IwmError>),
    LoggedIn(Result<LoginOutcome, IwmError>),
    Scanned(Result<ScanOutcome, IwmError>),
}

/// Messages sent from the worker thread.
#[derive(Debug)]
pub enum WorkerMessage {
    /// A login request is about to be issued
    Step(LoginStep),
    /// Job finished
    Done(WorkerOutcome),
}

/// Result of polling a worker.
#[derive(Debug)]
pub enum WorkerPoll {
    Message(WorkerMessage),
    Pending,
    /// The thread ended without reporting (it panicked).
    Gone,
}

/// Handle to a running worker.
pub struct ApiWorkerHandle {
    progress_rx: Receiver<WorkerMessage>,
    _handle: JoinHandle<()>,
}

impl ApiWorkerHandle {
    /// Check for the next message without blocking.
    #[must_use]
    pub fn poll(&self) -> WorkerPoll {
        match self.progress_rx.try_recv() {
            Ok(message) => WorkerPoll::Message(message),
            Err(TryRecvError::Empty) => WorkerPoll::Pending,
            Err(TryRecvError::Disconnected) => WorkerPoll::Gone,
        }
    }
}

/// Runs one backend job on its own thread.
pub struct ApiWorker;

impl ApiWorker {
    /// Spawn a job. The job may report progress through the sender it is
    /// given; its return value is delivered as `WorkerMessage::Done`.
    pub fn spawn<F>(job: F) -> ApiWorkerHandle
    where
        F: FnOnce(&Sender<WorkerMessage>) -> WorkerOutcome + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let outcome = job(&tx);
            // The UI may have quit already; nothing left to tell.
            let _ = tx.send(WorkerMessage::Done(outcome));
        });

        ApiWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn next(handle: &ApiWorkerHandle) -> WorkerPoll {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match handle.poll() {
                WorkerPoll::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5));
                }
                other => return other,
            }
        }
    }

    #[test]
    fn test_steps_then_done() {
        let handle = ApiWorker::spawn(|tx| {
            let _ = tx.send(WorkerMessage::Step(LoginStep::License));
            WorkerOutcome::Classes(Ok(vec![ClassItem::new("A", "Day")]))
        });

        assert!(matches!(
            next(&handle),
            WorkerPoll::Message(WorkerMessage::Step(LoginStep::License))
        ));
        match next(&handle) {
            WorkerPoll::Message(WorkerMessage::Done(WorkerOutcome::Classes(Ok(classes)))) => {
                assert_eq!(classes.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(next(&handle), WorkerPoll::Gone));
    }

    #[test]
    fn test_panicking_job_is_reported_gone() {
        let handle = ApiWorker::spawn(|_| panic!("boom"));
        assert!(matches!(next(&handle), WorkerPoll::Gone));
    }
}
