//! The lifecycle of one asynchronous read, and the runners that produce it.
//!
//! Every screen observes its data as a sequence of `GenericState` values. A runner emits `Loading`
//! before the operation starts, then one `Success` per value the operation yields, or a single
//! `Error` after which the stream ends. Consumers replace what they hold with each emission; they
//! never merge.

use crate::Result;
use serde::Serialize;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Buffer between a runner task and its consumer.
const STREAM_BUFFER: usize = 8;

/// The state of one asynchronous read.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "data")]
pub enum GenericState<T> {
    /// Nothing has been requested yet.
    Initial,
    /// A request is in flight.
    Loading,
    Success(T),
    /// The request failed. Holds a human readable reason.
    Error(String),
}

impl<T> Default for GenericState<T> {
    fn default() -> Self {
        GenericState::Initial
    }
}

impl<T> GenericState<T> {
    pub fn is_initial(&self) -> bool {
        matches!(self, GenericState::Initial)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GenericState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenericState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, GenericState::Error(_))
    }

    /// True once a request has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_error()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            GenericState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            GenericState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenericState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> GenericState<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            GenericState::Initial => GenericState::Initial,
            GenericState::Loading => GenericState::Loading,
            GenericState::Success(data) => GenericState::Success(f(data)),
            GenericState::Error(reason) => GenericState::Error(reason),
        }
    }
}

impl<T> From<Result<T>> for GenericState<T> {
    /// Captures a collaborator failure as an `Error` state, including the whole context chain.
    fn from(value: Result<T>) -> Self {
        match value {
            Ok(data) => GenericState::Success(data),
            Err(e) => GenericState::Error(format!("{e:#}")),
        }
    }
}

/// A stream of `GenericState` values produced by [`run_once`] or [`run_stream`].
///
/// Dropping the stream cancels the operation behind it.
#[derive(Debug)]
pub struct StateStream<T> {
    rx: mpsc::Receiver<GenericState<T>>,
}

impl<T> StateStream<T> {
    /// Waits for the next state. Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<GenericState<T>> {
        self.rx.recv().await
    }

    /// Returns a stream and the sender feeding it, for collaborators that produce states directly.
    pub fn channel() -> (mpsc::Sender<GenericState<T>>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (tx, Self { rx })
    }

    /// Drains the stream until it ends and returns every emitted state.
    pub async fn collect(mut self) -> Vec<GenericState<T>> {
        let mut states = Vec::new();
        while let Some(state) = self.next().await {
            states.push(state);
        }
        states
    }
}

/// Runs a one-shot `operation`, emitting `Loading` and then exactly one `Success` or `Error`.
///
/// Must be called from within a tokio runtime.
pub fn run_once<T, F>(operation: F) -> StateStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let (tx, stream) = StateStream::channel();
    tokio::spawn(async move {
        if tx.send(GenericState::Loading).await.is_err() {
            return;
        }
        let result = tokio::select! {
            _ = tx.closed() => {
                trace!("One-shot load cancelled by its consumer");
                return;
            }
            result = operation => result,
        };
        if let Err(e) = &result {
            debug!("One-shot load failed: {e:#}");
        }
        let _ = tx.send(GenericState::from(result)).await;
    });
    stream
}

/// Runs a continuous `upstream`, emitting `Loading` and then `Success(transform(value))` for every
/// value it yields. The first upstream error is emitted as `Error` and ends the stream.
///
/// Must be called from within a tokio runtime.
pub fn run_stream<S, T, F>(mut upstream: mpsc::Receiver<Result<S>>, transform: F) -> StateStream<T>
where
    S: Send + 'static,
    T: Send + 'static,
    F: Fn(S) -> T + Send + 'static,
{
    let (tx, stream) = StateStream::channel();
    tokio::spawn(async move {
        if tx.send(GenericState::Loading).await.is_err() {
            return;
        }
        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    trace!("Subscription cancelled by its consumer");
                    return;
                }
                next = upstream.recv() => next,
            };
            let state = match next {
                Some(Ok(value)) => GenericState::Success(transform(value)),
                Some(Err(e)) => {
                    debug!("Subscription failed: {e:#}");
                    let _ = tx.send(GenericState::Error(format!("{e:#}"))).await;
                    return;
                }
                None => {
                    trace!("Upstream completed");
                    return;
                }
            };
            if tx.send(state).await.is_err() {
                return;
            }
        }
    });
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_once_success() {
        let states = run_once(async { Ok(5) }).collect().await;
        assert_eq!(states, vec![GenericState::Loading, GenericState::Success(5)]);
    }

    #[tokio::test]
    async fn test_run_once_error() {
        let states = run_once::<i32, _>(async { Err(anyhow!("disk on fire")) })
            .collect()
            .await;
        assert_eq!(
            states,
            vec![
                GenericState::Loading,
                GenericState::Error("disk on fire".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_run_once_loading_precedes_operation() {
        let (gate_tx, gate_rx) = tokio::sync::oneshot::channel::<()>();
        let mut stream = run_once(async move {
            gate_rx.await.ok();
            Ok("done")
        });
        assert_eq!(stream.next().await, Some(GenericState::Loading));
        gate_tx.send(()).unwrap();
        assert_eq!(stream.next().await, Some(GenericState::Success("done")));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_run_once_cancelled_when_dropped() {
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        let mut stream = run_once(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = done_tx.send(()).await;
            Ok(())
        });
        assert_eq!(stream.next().await, Some(GenericState::Loading));
        drop(stream);
        // the operation future is dropped with its sender, so the channel closes without a value
        assert_eq!(done_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_run_stream_repeats_success() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok(1)).await.unwrap();
        tx.send(Ok(2)).await.unwrap();
        drop(tx);
        let states = run_stream(rx, |v: i32| v * 10).collect().await;
        assert_eq!(
            states,
            vec![
                GenericState::Loading,
                GenericState::Success(10),
                GenericState::Success(20)
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stream_error_terminates() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok(1)).await.unwrap();
        tx.send(Err(anyhow!("gone"))).await.unwrap();
        tx.send(Ok(3)).await.unwrap();
        let states = run_stream(rx, |v: i32| v).collect().await;
        assert_eq!(
            states,
            vec![
                GenericState::Loading,
                GenericState::Success(1),
                GenericState::Error("gone".to_string())
            ]
        );
    }

    #[test]
    fn test_from_result_keeps_context() {
        use anyhow::Context;
        let result: Result<()> = Err(anyhow!("inner")).context("outer");
        let state = GenericState::from(result);
        assert_eq!(state.error(), Some("outer: inner"));
    }

    #[test]
    fn test_accessors() {
        let state = GenericState::Success(3);
        assert!(state.is_success());
        assert!(state.is_terminal());
        assert_eq!(state.data(), Some(&3));
        assert_eq!(state.clone().map(|v| v + 1), GenericState::Success(4));
        assert!(GenericState::<()>::default().is_initial());
        assert!(!GenericState::<()>::Loading.is_terminal());
        assert_eq!(GenericState::<i32>::Loading.into_data(), None);
    }
}
