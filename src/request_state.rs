//! Lifecycle of repeated asynchronous fetches.
//!
//! [`RequestState`] is the bare state machine: requests are begun, each one
//! gets a [`Ticket`], and completions are settled against it. [`AsyncRequest`]
//! drives it with a [`tower::Service`], spawning each call on the tokio
//! runtime and funnelling completions back through a channel so all state
//! changes happen on the owner's task.

use std::fmt;
use std::marker::PhantomData;

use async_channel::{Receiver, Sender};
use clap::ValueEnum;
use log::{debug, info, warn};
use tower::{Service, ServiceExt};

/// Identifies one triggered request. Later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which completion is applied when requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StalePolicy {
    /// Only the most recently triggered request may change the state.
    /// Completions of older ones are dropped.
    #[default]
    #[value(name = "last-issued")]
    LastIssuedWins,
    /// Every completion is applied in arrival order, so a slow older request
    /// can overwrite the result of a newer one.
    #[value(name = "last-resolved")]
    LastResolvedWins,
}

/// Observable phase of a [`RequestState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// What [`RequestState::settle`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Success,
    Failure,
    /// Ignored, the ticket was superseded or unknown.
    Stale,
}

#[derive(Debug)]
pub struct RequestState<T, E> {
    policy: StalePolicy,
    issued: u64,
    // Ascending, tickets are pushed as they are issued.
    pending: Vec<Ticket>,
    settled: Phase,
    result: Option<T>,
    error: Option<E>,
}

impl<T, E> Default for RequestState<T, E> {
    fn default() -> Self {
        RequestState::new(StalePolicy::default())
    }
}

impl<T, E> RequestState<T, E> {
    pub fn new(policy: StalePolicy) -> Self {
        RequestState {
            policy,
            issued: 0,
            pending: Vec::new(),
            settled: Phase::Idle,
            result: None,
            error: None,
        }
    }

    /// Marks a new request as in flight.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.pending.push(ticket);
        ticket
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// `Ok(None)` is a success without a payload and clears the result. A
    /// failure keeps the previous result.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<Option<T>, E>) -> Settled {
        let Some(position) = self.pending.iter().position(|&pending| pending == ticket) else {
            return Settled::Stale;
        };
        self.pending.remove(position);

        if self.policy == StalePolicy::LastIssuedWins && ticket != Ticket(self.issued) {
            return Settled::Stale;
        }

        match outcome {
            Ok(result) => {
                self.result = result;
                self.error = None;
                self.settled = Phase::Succeeded;
                Settled::Success
            }
            Err(error) => {
                self.error = Some(error);
                self.settled = Phase::Failed;
                Settled::Failure
            }
        }
    }

    /// Whether a request that may still change the state is in flight.
    pub fn is_loading(&self) -> bool {
        match self.policy {
            StalePolicy::LastIssuedWins => self.pending.last() == Some(&Ticket(self.issued)),
            StalePolicy::LastResolvedWins => !self.pending.is_empty(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading() {
            Phase::Loading
        } else {
            self.settled
        }
    }

    /// Last successful payload, or a local override of it.
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Error of the last failed request. Cleared by the next success.
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Overwrites the result without issuing a request.
    ///
    /// Requests already in flight are not affected and still replace the
    /// result when they succeed.
    pub fn set_result(&mut self, result: Option<T>) {
        self.result = result;
    }

    /// Edits the result in place without issuing a request.
    pub fn update_result<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Option<T>),
    {
        update(&mut self.result);
    }
}

/// Outcome of one request, delivered back to the [`AsyncRequest`] owner.
#[derive(Debug)]
pub struct Completion<T, E> {
    pub ticket: Ticket,
    pub outcome: Result<Option<T>, E>,
}

/// A fetch operation wrapped into an observable [`RequestState`].
///
/// Requests are never de-duplicated or cancelled. Overlapping requests are
/// resolved by the [`StalePolicy`].
pub struct AsyncRequest<S, A, T>
where
    S: Service<A, Response = Option<T>>,
{
    service: S,
    state: RequestState<T, S::Error>,
    sender: Sender<Completion<T, S::Error>>,
    receiver: Receiver<Completion<T, S::Error>>,
    _args: PhantomData<fn(A)>,
}

impl<S, A, T> AsyncRequest<S, A, T>
where
    S: Service<A, Response = Option<T>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: fmt::Display + Send + 'static,
    A: fmt::Debug + Send + 'static,
    T: Send + 'static,
{
    pub fn new(service: S, policy: StalePolicy) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        AsyncRequest {
            service,
            state: RequestState::new(policy),
            sender,
            receiver,
            _args: PhantomData,
        }
    }

    /// Starts a request with `args`. Must be called within a tokio runtime.
    ///
    /// The state is loading as soon as this returns. The outcome arrives on
    /// [`Self::completions`] and takes effect once passed to [`Self::settle`].
    pub fn trigger(&mut self, args: A) -> Ticket {
        let ticket = self.state.begin();
        info!("Request {} started with {:?}", ticket, args);

        let service = self.service.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = service.oneshot(args).await;
            if sender.send(Completion { ticket, outcome }).await.is_err() {
                debug!("Request {} finished after the receiver was dropped", ticket);
            }
        });
        ticket
    }

    /// Receiving end of the completion channel.
    pub fn completions(&self) -> Receiver<Completion<T, S::Error>> {
        self.receiver.clone()
    }

    /// Waits for the next completion of any request.
    pub async fn next_completion(&self) -> Option<Completion<T, S::Error>> {
        self.receiver.recv().await.ok()
    }

    pub fn settle(&mut self, completion: Completion<T, S::Error>) -> Settled {
        let Completion { ticket, outcome } = completion;
        let settled = self.state.settle(ticket, outcome);
        match settled {
            Settled::Success => info!("Request {} succeeded", ticket),
            Settled::Failure => {
                if let Some(error) = self.state.error() {
                    warn!("Request {} failed: {}", ticket, error);
                }
            }
            Settled::Stale => debug!("Request {} is stale, ignoring its outcome", ticket),
        }
        settled
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn result(&self) -> Option<&T> {
        self.state.result()
    }

    pub fn error(&self) -> Option<&S::Error> {
        self.state.error()
    }

    pub fn set_result(&mut self, result: Option<T>) {
        self.state.set_result(result);
    }

    pub fn update_result<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Option<T>),
    {
        self.state.update_result(update);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;
    use tower::service_fn;

    use super::*;
    use crate::error::ClientError;

    type State = RequestState<Vec<f64>, &'static str>;

    #[test]
    fn test_lifecycle() {
        let mut state = State::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.is_loading());
        assert!(state.result().is_none());

        let ticket = state.begin();
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.is_loading());

        assert_eq!(state.settle(ticket, Ok(Some(vec![1.0]))), Settled::Success);
        assert_eq!(state.phase(), Phase::Succeeded);
        assert_eq!(state.result(), Some(&vec![1.0]));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_keeps_result() {
        let mut state = State::default();
        let first = state.begin();
        state.settle(first, Ok(Some(vec![1.0, 2.0])));

        let second = state.begin();
        assert_eq!(state.settle(second, Err("boom")), Settled::Failure);
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.error(), Some(&"boom"));
        assert_eq!(state.result(), Some(&vec![1.0, 2.0]));

        // The next success clears the error.
        let third = state.begin();
        state.settle(third, Ok(Some(vec![3.0])));
        assert!(state.error().is_none());
        assert_eq!(state.result(), Some(&vec![3.0]));
    }

    #[test]
    fn test_empty_payload_clears_result() {
        let mut state = State::default();
        let first = state.begin();
        state.settle(first, Ok(Some(vec![1.0])));

        let second = state.begin();
        assert_eq!(state.settle(second, Ok(None)), Settled::Success);
        assert!(state.result().is_none());
    }

    #[test]
    fn test_last_issued_wins() {
        let mut state = State::new(StalePolicy::LastIssuedWins);
        let older = state.begin();
        let newer = state.begin();

        assert_eq!(state.settle(newer, Ok(Some(vec![2.0]))), Settled::Success);
        assert!(!state.is_loading());
        assert_eq!(state.phase(), Phase::Succeeded);

        assert_eq!(state.settle(older, Ok(Some(vec![1.0]))), Settled::Stale);
        assert_eq!(state.result(), Some(&vec![2.0]));
    }

    #[test]
    fn test_last_issued_older_first() {
        let mut state = State::new(StalePolicy::LastIssuedWins);
        let older = state.begin();
        let newer = state.begin();

        assert_eq!(state.settle(older, Err("late")), Settled::Stale);
        assert!(state.is_loading());
        assert!(state.error().is_none());

        assert_eq!(state.settle(newer, Ok(Some(vec![2.0]))), Settled::Success);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_last_resolved_wins() {
        let mut state = State::new(StalePolicy::LastResolvedWins);
        let older = state.begin();
        let newer = state.begin();

        assert_eq!(state.settle(newer, Ok(Some(vec![2.0]))), Settled::Success);
        assert!(state.is_loading());

        assert_eq!(state.settle(older, Ok(Some(vec![1.0]))), Settled::Success);
        assert!(!state.is_loading());
        assert_eq!(state.result(), Some(&vec![1.0]));
    }

    #[test]
    fn test_unknown_and_repeated_tickets() {
        let mut state = State::default();
        let ticket = state.begin();
        assert_eq!(state.settle(ticket, Ok(Some(vec![1.0]))), Settled::Success);
        assert_eq!(state.settle(ticket, Ok(Some(vec![9.0]))), Settled::Stale);
        assert_eq!(state.settle(Ticket(42), Err("nope")), Settled::Stale);
        assert_eq!(state.result(), Some(&vec![1.0]));
    }

    #[test]
    fn test_local_override() {
        let mut state = State::default();
        state.update_result(|result| result.get_or_insert_with(Vec::new).push(42.0));
        assert_eq!(state.result(), Some(&vec![42.0]));
        assert_eq!(state.phase(), Phase::Idle);

        // An in-flight request still replaces the local edit.
        let ticket = state.begin();
        state.set_result(Some(vec![1.0, 2.0]));
        assert!(state.is_loading());
        state.settle(ticket, Ok(Some(vec![5.0])));
        assert_eq!(state.result(), Some(&vec![5.0]));
    }

    #[tokio::test]
    async fn test_trigger_and_settle() {
        let service = service_fn(|count: usize| async move {
            Ok::<_, ClientError>(Some(vec![1.0; count]))
        });
        let mut request = AsyncRequest::new(service, StalePolicy::default());

        request.trigger(3);
        assert!(request.is_loading());

        let completion = request.next_completion().await.unwrap();
        assert_eq!(request.settle(completion), Settled::Success);
        assert!(!request.is_loading());
        assert_eq!(request.result(), Some(&vec![1.0, 1.0, 1.0]));
    }

    #[tokio::test]
    async fn test_trigger_failure() {
        let service = service_fn(|status: u16| async move {
            Err::<Option<Vec<f64>>, _>(ClientError::StatusError(status))
        });
        let mut request = AsyncRequest::new(service, StalePolicy::default());
        request.set_result(Some(vec![4.0]));

        request.trigger(503);
        let completion = request.next_completion().await.unwrap();
        assert_eq!(request.settle(completion), Settled::Failure);
        assert_eq!(request.phase(), Phase::Failed);
        assert_eq!(
            request.error().map(ToString::to_string).as_deref(),
            Some("Request failed with status code 503.")
        );
        assert_eq!(request.result(), Some(&vec![4.0]));
    }

    macro_rules! gated {
        () => {
            service_fn(|(value, gate): (f64, oneshot::Receiver<()>)| async move {
                let _ = gate.await;
                Ok::<_, ClientError>(Some(vec![value]))
            })
        };
    }

    #[tokio::test]
    async fn test_overlapping_requests_last_issued() {
        let mut request = AsyncRequest::new(gated!(), StalePolicy::LastIssuedWins);
        let (open_older, older_gate) = oneshot::channel();
        let (open_newer, newer_gate) = oneshot::channel();
        request.trigger((1.0, older_gate));
        request.trigger((2.0, newer_gate));

        open_newer.send(()).unwrap();
        let completion = request.next_completion().await.unwrap();
        assert_eq!(request.settle(completion), Settled::Success);
        assert!(!request.is_loading());

        open_older.send(()).unwrap();
        let completion = request.next_completion().await.unwrap();
        assert_eq!(request.settle(completion), Settled::Stale);
        assert_eq!(request.result(), Some(&vec![2.0]));
    }

    #[tokio::test]
    async fn test_overlapping_requests_last_resolved() {
        let mut request = AsyncRequest::new(gated!(), StalePolicy::LastResolvedWins);
        let (open_older, older_gate) = oneshot::channel();
        let (open_newer, newer_gate) = oneshot::channel();
        request.trigger((1.0, older_gate));
        request.trigger((2.0, newer_gate));

        open_newer.send(()).unwrap();
        let completion = request.next_completion().await.unwrap();
        request.settle(completion);
        assert!(request.is_loading());

        open_older.send(()).unwrap();
        let completion = request.next_completion().await.unwrap();
        assert_eq!(request.settle(completion), Settled::Success);
        assert_eq!(request.result(), Some(&vec![1.0]));
    }
}
