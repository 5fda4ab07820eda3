//! Debouncing of rapidly changing inputs.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Settle window used by the filter panel.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Forwards a value only after no newer value arrived for `delay`.
///
/// Dropping the debouncer flushes the pending value without waiting.
///
/// ```rust,ignore
/// let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, move |filters| {
///     controller.set_filters(filters);
/// });
/// debouncer.push(FilterSet::new().with_region("Volta"));
/// ```
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
    task: JoinHandle<()>,
}

enum Message<T> {
    Value(T),
    Flush(oneshot::Sender<()>),
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debouncer on the current Tokio runtime.
    pub fn new<F>(delay: Duration, on_settled: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, delay, on_settled));
        Self { tx, task }
    }

    /// Replace the pending value and restart the window.
    pub fn push(&self, value: T) {
        if self.tx.send(Message::Value(value)).is_err() {
            tracing::warn!("debouncer task has stopped; dropping value");
        }
    }

    /// Forward the pending value now, if any, and wait for the callback.
    ///
    /// Anything ordered after the settled value should call this first.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Message::Flush(ack)).is_err() {
            tracing::warn!("debouncer task has stopped; nothing to flush");
            return;
        }
        let _ = done.await;
    }

    /// Flush the pending value and wait for the callback to run.
    pub async fn close(self) {
        let Debouncer { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "debouncer task failed");
        }
    }
}

async fn run<T, F>(
    mut rx: mpsc::UnboundedReceiver<Message<T>>,
    delay: Duration,
    mut on_settled: F,
) where
    F: FnMut(T),
{
    let mut pending: Option<T> = None;
    loop {
        let message = match pending.take() {
            None => match rx.recv().await {
                Some(message) => message,
                None => break,
            },
            Some(value) => match tokio::time::timeout(delay, rx.recv()).await {
                Ok(Some(message)) => {
                    pending = Some(value);
                    message
                }
                Ok(None) => {
                    on_settled(value);
                    break;
                }
                Err(_) => {
                    on_settled(value);
                    continue;
                }
            },
        };

        match message {
            Message::Value(newer) => pending = Some(newer),
            Message::Flush(ack) => {
                if let Some(value) = pending.take() {
                    on_settled(value);
                }
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector<T: Send + 'static>() -> (impl FnMut(T) + Send + 'static, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            move |value| {
                let _ = tx.send(value);
            },
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_settled_value_forwarded() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, callback);

        debouncer.push("z");
        debouncer.push("ze");
        debouncer.push("zebu");

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(out.try_recv().is_err());

        assert_eq!(out.recv().await, Some("zebu"));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(out.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_forward_each_value() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(Duration::from_millis(100), callback);

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(out.try_recv().ok(), Some(1));
        assert_eq!(out.try_recv().ok(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_value_restarts_window() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(Duration::from_millis(100), callback);

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(out.try_recv().is_err());

        assert_eq!(out.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_forwards_pending_immediately() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, callback);
        let start = tokio::time::Instant::now();

        debouncer.push("z");
        debouncer.push("zebu");
        debouncer.flush().await;
        assert_eq!(out.try_recv().ok(), Some("zebu"));
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);

        // Nothing pending: flush returns without forwarding.
        debouncer.flush().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(out.try_recv().is_err());

        debouncer.push("sanga");
        assert_eq!(out.recv().await, Some("sanga"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, callback);
        let start = tokio::time::Instant::now();

        debouncer.push("volta");
        debouncer.close().await;

        assert_eq!(out.try_recv().ok(), Some("volta"));
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_flushes_pending() {
        let (callback, mut out) = collector();
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, callback);

        debouncer.push("volta");
        drop(debouncer);

        assert_eq!(out.recv().await, Some("volta"));
        assert_eq!(out.recv().await, None);
    }
}
