//! Process-wide cooperative stop signal.

use tokio::sync::watch;

/// Creates a connected stop handle and signal.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Owner side: raises the stop flag for every subscribed agent.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Raises the flag. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns a new subscriber.
    pub fn subscribe(&self) -> StopSignal {
        StopSignal { rx: self.tx.subscribe() }
    }
}

/// Agent side. Cloned once per agent.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the flag is raised or the handle is dropped.
    pub async fn stopped(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_wakes_waiter() {
        let (handle, mut signal) = stop_channel();
        assert!(!signal.is_stopped());

        let waiter = tokio::spawn(async move {
            signal.stopped().await;
            signal.is_stopped()
        });
        handle.stop();

        let stopped = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter not woken")
            .unwrap();
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_dropped_handle_counts_as_stop() {
        let (handle, mut signal) = stop_channel();
        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), signal.stopped())
            .await
            .expect("dropped handle should release waiters");
    }

    #[test]
    fn test_subscribe_after_stop_sees_flag() {
        let (handle, _signal) = stop_channel();
        handle.stop();
        assert!(handle.is_stopped());
        assert!(handle.subscribe().is_stopped());
    }
}
