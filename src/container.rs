//! A small runtime for intent driven screens.
//!
//! A screen is a [`Reducer`]: a pure function from `(state, intent)` to a [`Reduction`] that lists
//! the side effects to post and the async commands to start. A [`Container`] owns the state and one
//! worker task that reduces intents strictly one at a time. Commands run as separate tasks; the
//! intents they produce re-enter the same queue, so a slow repository call never blocks field
//! edits and never races them.
//!
//! Dropping a container aborts its worker together with every command it started.

use crate::state::{GenericState, StateStream};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tracing::{debug, trace, warn};

/// The behavior of one screen.
pub trait Reducer: Send + 'static {
    type State: Clone + Debug + Send + Sync + 'static;
    type Intent: Debug + Send + 'static;
    type SideEffect: Debug + Send + 'static;

    /// Applies `intent` to `state`. Must not block; anything asynchronous goes into the returned
    /// reduction as a command.
    fn reduce(
        &self,
        state: &mut Self::State,
        intent: Self::Intent,
    ) -> Reduction<Self::Intent, Self::SideEffect>;
}

enum Message<I> {
    Intent(I),
    /// Answered once every intent queued before it, and every one-shot command those intents
    /// started, has been reduced.
    Barrier(oneshot::Sender<()>),
}

type Sink<I> = mpsc::UnboundedSender<Message<I>>;
type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Task<I> = Box<dyn FnOnce(Sink<I>) -> BoxFuture + Send>;

struct Command<I> {
    /// Keyed commands are subscriptions. Starting one aborts the running one with the same key.
    key: Option<&'static str>,
    task: Task<I>,
}

/// What a single reduction asks the container to do after the state has been updated.
pub struct Reduction<I, E> {
    effects: Vec<E>,
    /// Subscription keys to abort before any command below starts.
    cancels: Vec<&'static str>,
    commands: Vec<Command<I>>,
}

impl<I, E> Default for Reduction<I, E> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            cancels: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl<I, E> Reduction<I, E>
where
    I: Send + 'static,
{
    /// Nothing beyond the state change.
    pub fn none() -> Self {
        Self::default()
    }

    /// Posts a one-shot side effect.
    pub fn effect(effect: E) -> Self {
        Self::none().and_effect(effect)
    }

    /// Runs `future` and reduces the intent it resolves to.
    pub fn run<F>(future: F) -> Self
    where
        F: Future<Output = I> + Send + 'static,
    {
        let task: Task<I> = Box::new(move |sink: Sink<I>| -> BoxFuture {
            Box::pin(async move {
                let intent = future.await;
                let _ = sink.send(Message::Intent(intent));
            })
        });
        Self {
            commands: vec![Command { key: None, task }],
            ..Self::default()
        }
    }

    /// Feeds every state of `stream` back in as an intent, until the stream ends, the container
    /// is dropped, or another subscription is started under the same `key`.
    pub fn subscribe<T, F>(key: &'static str, mut stream: StateStream<T>, map: F) -> Self
    where
        T: Send + 'static,
        F: Fn(GenericState<T>) -> I + Send + 'static,
    {
        let task: Task<I> = Box::new(move |sink: Sink<I>| -> BoxFuture {
            Box::pin(async move {
                while let Some(state) = stream.next().await {
                    if sink.send(Message::Intent(map(state))).is_err() {
                        break;
                    }
                }
            })
        });
        Self {
            commands: vec![Command {
                key: Some(key),
                task,
            }],
            ..Self::default()
        }
    }

    /// Stops the subscription running under `key`, if any.
    pub fn cancel(key: &'static str) -> Self {
        Self {
            cancels: vec![key],
            ..Self::default()
        }
    }

    pub fn and_effect(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    /// Appends everything `other` asks for after what `self` asks for.
    pub fn merge(mut self, other: Self) -> Self {
        self.effects.extend(other.effects);
        self.cancels.extend(other.cancels);
        self.commands.extend(other.commands);
        self
    }

    pub fn effects(&self) -> &[E] {
        &self.effects
    }

    /// The number of commands this reduction starts.
    pub fn commands(&self) -> usize {
        self.commands.len()
    }
}

impl<I, E: Debug> Debug for Reduction<I, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reduction")
            .field("effects", &self.effects)
            .field("cancels", &self.cancels)
            .field("commands", &self.commands.len())
            .finish()
    }
}

/// Owns the state of one screen and the worker that reduces its intents.
///
/// Must be created from within a tokio runtime.
pub struct Container<R: Reducer> {
    intents: Sink<R::Intent>,
    state: watch::Receiver<R::State>,
    effects: mpsc::UnboundedReceiver<R::SideEffect>,
    worker: JoinHandle<()>,
}

impl<R: Reducer> Container<R> {
    pub fn new(reducer: R, initial: R::State) -> Self {
        let (intents, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(initial);
        let (effects_tx, effects) = mpsc::unbounded_channel();
        let worker = Worker {
            reducer,
            state: state_tx,
            effects: effects_tx,
            sink: intents.clone(),
            commands: JoinSet::new(),
            subscriptions: JoinSet::new(),
            keyed: HashMap::new(),
            barriers: Vec::new(),
        };
        let worker = tokio::spawn(worker.run(rx));
        Self {
            intents,
            state,
            effects,
            worker,
        }
    }

    /// Queues an intent. Intents are reduced in the order they are queued.
    pub fn intent(&self, intent: R::Intent) {
        if self.intents.send(Message::Intent(intent)).is_err() {
            warn!("Intent dropped, the container is no longer running");
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> R::State {
        self.state.borrow().clone()
    }

    /// A receiver that is notified after every reduction.
    pub fn subscribe_state(&self) -> watch::Receiver<R::State> {
        self.state.clone()
    }

    /// Waits until the state satisfies `predicate` and returns it.
    pub async fn wait_for<F>(&self, predicate: F) -> R::State
    where
        F: FnMut(&R::State) -> bool,
    {
        let mut rx = self.state.clone();
        let state = match rx.wait_for(predicate).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// Waits for the next side effect. Each effect is delivered once.
    pub async fn next_effect(&mut self) -> Option<R::SideEffect> {
        self.effects.recv().await
    }

    pub fn try_next_effect(&mut self) -> Option<R::SideEffect> {
        self.effects.try_recv().ok()
    }

    /// Waits until every intent queued so far has been reduced and every one-shot command started
    /// along the way has finished and been reduced too. Subscriptions are not waited on.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.intents.send(Message::Barrier(tx)).is_err() {
            return;
        }
        let _ = rx.await;
    }
}

impl<R: Reducer> Drop for Container<R> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct Worker<R: Reducer> {
    reducer: R,
    state: watch::Sender<R::State>,
    effects: mpsc::UnboundedSender<R::SideEffect>,
    /// Handed to commands so their results come back through the queue.
    sink: Sink<R::Intent>,
    commands: JoinSet<()>,
    subscriptions: JoinSet<()>,
    keyed: HashMap<&'static str, AbortHandle>,
    barriers: Vec<oneshot::Sender<()>>,
}

impl<R: Reducer> Worker<R> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message<R::Intent>>) {
        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(Message::Intent(intent)) => self.reduce(intent),
                    Some(Message::Barrier(barrier)) => {
                        if self.commands.is_empty() {
                            let _ = barrier.send(());
                        } else {
                            self.barriers.push(barrier);
                        }
                    }
                    None => return,
                },
                Some(joined) = self.commands.join_next(), if !self.commands.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!("A command panicked: {e}");
                        }
                    }
                    if self.commands.is_empty() {
                        // the finished command queued its intent before it ended, so requeueing the
                        // barriers puts them behind it
                        for barrier in self.barriers.drain(..) {
                            let _ = self.sink.send(Message::Barrier(barrier));
                        }
                    }
                }
                Some(joined) = self.subscriptions.join_next(),
                    if !self.subscriptions.is_empty() =>
                {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!("A subscription panicked: {e}");
                        }
                    }
                }
            }
        }
    }

    fn reduce(&mut self, intent: R::Intent) {
        trace!("Reducing {intent:?}");
        let reducer = &self.reducer;
        let mut reduction = Reduction::none();
        // publishes the new state before any effect below is posted
        self.state
            .send_modify(|state| reduction = reducer.reduce(state, intent));

        for effect in reduction.effects {
            debug!("Posting {effect:?}");
            let _ = self.effects.send(effect);
        }
        for key in reduction.cancels {
            if let Some(previous) = self.keyed.remove(key) {
                trace!("Cancelling subscription {key}");
                previous.abort();
            }
        }
        for command in reduction.commands {
            let future = (command.task)(self.sink.clone());
            match command.key {
                None => {
                    self.commands.spawn(future);
                }
                Some(key) => {
                    if let Some(previous) = self.keyed.remove(key) {
                        trace!("Replacing subscription {key}");
                        previous.abort();
                    }
                    let handle = self.subscriptions.spawn(future);
                    self.keyed.insert(key, handle);
                }
            }
        }
    }
}
