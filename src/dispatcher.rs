use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, warn};

use crate::params::{self, MethodId, Params};
use crate::response::{self, CallResult};
use crate::{ClientError, Transport};

/// Completion callback invoked once with the outcome of a call.
///
/// The callback observes the same outcome that settles the returned
/// [`PendingCall`].
pub type CompletionCallback =
    Box<dyn FnOnce(Result<&CallResult, &ClientError>) + Send + 'static>;

/// Single choke point through which every facet issues remote calls.
///
/// Cloning is cheap; clones share the transport and in-flight bookkeeping.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    in_flight: Arc<AtomicUsize>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher owning the given transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Creates a dispatcher over a transport shared with other components.
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of calls started but not yet settled or cancelled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a remote call and returns a handle that settles with its outcome.
    ///
    /// `payload` and `options` are merged with payload keys taking precedence.
    /// An empty `method` fails with [`ClientError::InvalidArgument`] before any
    /// network activity. When `callback` is supplied it is invoked exactly once
    /// with the same outcome the returned [`PendingCall`] resolves to, unless the
    /// call is cancelled first.
    ///
    /// The call starts immediately on the current Tokio runtime; dropping the
    /// returned handle detaches it without cancelling. Calling outside a Tokio
    /// runtime fails with [`ClientError::InvalidArgument`].
    pub fn call(
        &self,
        method: &str,
        payload: Option<Params>,
        options: Option<Params>,
        callback: Option<CompletionCallback>,
    ) -> Result<PendingCall, ClientError> {
        let method = MethodId::new(method)?;
        let runtime = Handle::try_current().map_err(|_| {
            ClientError::InvalidArgument("no Tokio runtime is running".to_owned())
        })?;
        let params = params::merge(payload, options);
        let dispatched_at = Instant::now();
        let guard = InFlightGuard::enter(&self.in_flight);
        let transport = Arc::clone(&self.transport);
        let span = debug_span!("slack_call", method = %method);
        let task_method = method.clone();

        let handle = runtime.spawn(
            async move {
                let _guard = guard;
                let outcome = execute(transport.as_ref(), &task_method, &params).await;
                log_outcome(&outcome, dispatched_at);
                if let Some(callback) = callback {
                    callback(outcome.as_ref());
                }
                outcome
            }
            .instrument(span),
        );

        Ok(PendingCall {
            method,
            dispatched_at,
            handle,
        })
    }

    /// Starts a call without a callback and awaits its outcome.
    pub async fn call_async(
        &self,
        method: &str,
        payload: Option<Params>,
        options: Option<Params>,
    ) -> Result<CallResult, ClientError> {
        self.call(method, payload, options, None)?.await
    }
}

/// Handle to an in-flight call.
///
/// Awaiting it yields the call's outcome. The handle is `Unpin` and may be
/// dropped to detach the call.
#[derive(Debug)]
#[must_use = "dropping a PendingCall detaches it; await it or call `cancel`"]
pub struct PendingCall {
    method: MethodId,
    dispatched_at: Instant,
    handle: JoinHandle<Result<CallResult, ClientError>>,
}

impl PendingCall {
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// Instant at which the call was handed to the runtime.
    pub fn dispatched_at(&self) -> Instant {
        self.dispatched_at
    }

    /// Cancels the call.
    ///
    /// If the call has not settled yet its callback will never run and the
    /// handle resolves to [`ClientError::Cancelled`]. Cancelling a settled call
    /// has no effect.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingCall {
    type Output = Result<CallResult, ClientError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(error)) if error.is_cancelled() => {
                Poll::Ready(Err(ClientError::Cancelled))
            }
            Poll::Ready(Err(error)) => std::panic::resume_unwind(error.into_panic()),
        }
    }
}

async fn execute(
    transport: &dyn Transport,
    method: &MethodId,
    params: &Params,
) -> Result<CallResult, ClientError> {
    let encoded = params::encode(params);
    debug!(fields = encoded.len(), "dispatching call");

    let body = transport.send(method, &encoded).await?;
    let envelope = response::decode(&body);

    if let Some(warning) = &envelope.warning {
        warn!(%method, warning = %warning, "API returned a warning");
    }

    envelope.outcome
}

fn log_outcome(outcome: &Result<CallResult, ClientError>, dispatched_at: Instant) {
    let elapsed = dispatched_at.elapsed();
    match outcome {
        Ok(_) => debug!(?elapsed, "call succeeded"),
        Err(error) => debug!(?elapsed, kind = ?error.kind(), %error, "call failed"),
    }
}

/// Counts a call as in flight until dropped, including on abort.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
