use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Timer commands sent from the UI thread
#[derive(Debug)]
enum DebounceCommand<T> {
    /// Re-arm the timer with a newer value
    Reset(T),
    /// Drop the pending value without firing
    Cancel,
}

/// Single-shot deferred trigger.
///
/// Each [`Debouncer::trigger`] replaces the pending value and restarts the
/// quiet period. When the period elapses without another trigger, the
/// callback runs once on the timer thread with the latest value.
pub struct Debouncer<T: Send + 'static> {
    tx: Option<Sender<DebounceCommand<T>>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, mut on_fire: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<DebounceCommand<T>>();

        let handle = thread::Builder::new()
            .name("debounce-timer".into())
            .spawn(move || {
                let mut pending: Option<(Instant, T)> = None;
                loop {
                    let next = match &pending {
                        Some((deadline, _)) => {
                            let wait = deadline.saturating_duration_since(Instant::now());
                            rx.recv_timeout(wait)
                        }
                        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    };
                    match next {
                        Ok(DebounceCommand::Reset(value)) => {
                            pending = Some((Instant::now() + delay, value));
                        }
                        Ok(DebounceCommand::Cancel) => {
                            pending = None;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            if let Some((_, value)) = pending.take() {
                                on_fire(value);
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            tracing::debug!("debounce timer thread exiting");
                            break;
                        }
                    }
                }
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!("failed to spawn debounce timer: {}", e);
                None
            }
        };

        Self {
            tx: Some(tx),
            handle,
        }
    }

    /// Restart the quiet period with `value` as the pending payload.
    pub fn trigger(&self, value: T) {
        self.send(DebounceCommand::Reset(value));
    }

    /// Forget the pending payload, if any.
    pub fn cancel(&self) {
        self.send(DebounceCommand::Cancel);
    }

    fn send(&self, cmd: DebounceCommand<T>) {
        if let Some(tx) = &self.tx {
            if tx.send(cmd).is_err() {
                tracing::warn!("debounce timer is not running");
            }
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        // Closing the channel stops the timer thread
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
