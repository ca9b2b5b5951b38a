//! Approval Coordination
//!
//! Serializes signing and connection requests from an untrusted caller
//! through a single user-decision gate. Each request suspends its caller
//! on a oneshot channel until the registered decision handler produces a
//! response; the pending-list mutation and the channel resolution go
//! through one mutex, so a request is resolved exactly once.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

use crate::error::{WalletError, WalletResult};
use crate::rpc::{RequestMethod, RpcResult};

/// An approval request derived from a validated RPC request.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    /// Correlates to the RPC request id.
    pub id: u64,
    pub method: RequestMethod,
    pub origin: Url,
    pub params: ApprovalParams,
}

/// Decoded, method-specific payload of an approval request.
#[derive(Debug, Clone)]
pub enum ApprovalParams {
    Connect,
    SignTransaction(Vec<u8>),
    SignMessage(Vec<u8>),
    SendTransaction(String),
    SignTransactions(Vec<Vec<u8>>),
    SignMessages(Vec<Vec<u8>>),
    SignAllTransactions(Vec<Vec<u8>>),
    SignAllMessages(Vec<Vec<u8>>),
}

/// Terminal decision for an approval request.
#[derive(Debug, Clone)]
pub enum ApprovalResponse {
    Approved(RpcResult),
    Rejected,
}

/// The registered decision function. Called at most once per request.
pub type ApprovalHandler =
    Arc<dyn Fn(ApprovalRequest) -> BoxFuture<'static, WalletResult<ApprovalResponse>> + Send + Sync>;

struct PendingRequest {
    token: u64,
    request: ApprovalRequest,
    // Set under the coordinator mutex before the handler task is spawned,
    // so a handler swap mid-flight cannot dispatch the entry again.
    dispatched: bool,
    // Taken exactly once, under the coordinator mutex.
    responder: Option<oneshot::Sender<WalletResult<ApprovalResponse>>>,
}

#[derive(Default)]
struct Inner {
    pending: Vec<PendingRequest>,
    handler: Option<ApprovalHandler>,
    next_token: u64,
}

/// Queue-based matcher of inbound requests to asynchronous decisions.
#[derive(Clone, Default)]
pub struct ApprovalCoordinator {
    inner: Arc<Mutex<Inner>>,
}

impl ApprovalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the decision handler and drain any requests that were
    /// queued while no handler was available.
    pub fn set_handler(&self, handler: ApprovalHandler) {
        let queued: Vec<(u64, ApprovalRequest)> = {
            let mut inner = self.inner.lock().unwrap();
            inner.handler = Some(Arc::clone(&handler));
            inner
                .pending
                .iter_mut()
                .filter(|p| !p.dispatched)
                .map(|p| {
                    p.dispatched = true;
                    (p.token, p.request.clone())
                })
                .collect()
        };

        for (token, request) in queued {
            debug!(id = request.id, origin = %request.origin, "dispatching queued approval");
            self.dispatch(Arc::clone(&handler), token, request);
        }
    }

    /// Submit a request and suspend until a decision is produced.
    pub async fn request_approval(&self, request: ApprovalRequest) -> WalletResult<ApprovalResponse> {
        let (responder, decision) = oneshot::channel();

        let dispatch = {
            let mut inner = self.inner.lock().unwrap();
            let token = inner.next_token;
            inner.next_token += 1;
            let handler = inner.handler.clone();
            inner.pending.push(PendingRequest {
                token,
                request: request.clone(),
                dispatched: handler.is_some(),
                responder: Some(responder),
            });
            handler.map(|handler| (handler, token))
        };

        match dispatch {
            Some((handler, token)) => self.dispatch(handler, token, request),
            None => warn!(id = request.id, "no approval handler registered, request queued"),
        }

        decision
            .await
            .map_err(|_| WalletError::Internal("approval request abandoned".into()))?
    }

    fn dispatch(&self, handler: ApprovalHandler, token: u64, request: ApprovalRequest) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = handler(request).await;

            // Remove the entry and take its responder in one critical
            // section; a racing resolver finds the entry gone.
            let responder = {
                let mut guard = inner.lock().unwrap();
                match guard.pending.iter().position(|p| p.token == token) {
                    Some(index) => guard.pending.remove(index).responder,
                    None => None,
                }
            };

            if let Some(responder) = responder {
                // The caller may have gone away; nothing left to do then.
                let _ = responder.send(result);
            }
        });
    }

    /// Requests currently queued for `origin`. The argument is normalized
    /// through [`Url`] so `https://dapp.example` and `https://dapp.example/`
    /// name the same origin.
    pub fn pending_for_origin(&self, origin: &str) -> Vec<ApprovalRequest> {
        let normalized = Url::parse(origin).ok();
        let inner = self.inner.lock().unwrap();
        inner
            .pending
            .iter()
            .filter(|p| Some(&p.request.origin) == normalized.as_ref())
            .map(|p| p.request.clone())
            .collect()
    }

    /// Number of queued requests across all origins.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::SignResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(id: u64, origin: &str) -> ApprovalRequest {
        ApprovalRequest {
            id,
            method: RequestMethod::SignMessage,
            origin: Url::parse(origin).unwrap(),
            params: ApprovalParams::SignMessage(b"hi".to_vec()),
        }
    }

    fn approving_handler() -> ApprovalHandler {
        Arc::new(|req: ApprovalRequest| {
            Box::pin(async move {
                Ok(ApprovalResponse::Approved(RpcResult::Sign(SignResult {
                    signature: format!("sig-{}", req.id),
                })))
            })
        })
    }

    #[tokio::test]
    async fn approval_resolves_and_clears_pending() {
        let coordinator = ApprovalCoordinator::new();
        coordinator.set_handler(approving_handler());

        let response = coordinator
            .request_approval(request(1, "https://dapp.example"))
            .await
            .unwrap();
        assert!(matches!(response, ApprovalResponse::Approved(_)));
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn concurrent_requests_each_resolve_exactly_once() {
        let coordinator = ApprovalCoordinator::new();
        coordinator.set_handler(approving_handler());

        let a = coordinator.request_approval(request(1, "https://a.example"));
        let b = coordinator.request_approval(request(2, "https://b.example"));
        let (ra, rb) = tokio::join!(a, b);

        match (ra.unwrap(), rb.unwrap()) {
            (
                ApprovalResponse::Approved(RpcResult::Sign(sa)),
                ApprovalResponse::Approved(RpcResult::Sign(sb)),
            ) => {
                assert_eq!(sa.signature, "sig-1");
                assert_eq!(sb.signature, "sig-2");
            }
            other => panic!("unexpected responses: {other:?}"),
        }
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn handler_error_fails_the_caller_and_clears_pending() {
        let coordinator = ApprovalCoordinator::new();
        coordinator.set_handler(Arc::new(|_req| {
            Box::pin(async { Err(WalletError::Custody("store unavailable".into())) })
        }));

        let result = coordinator
            .request_approval(request(3, "https://dapp.example"))
            .await;
        assert!(matches!(result, Err(WalletError::Custody(_))));
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn reregistering_mid_flight_dispatches_each_request_once() {
        fn counting_handler(invocations: Arc<AtomicUsize>, delay: Duration) -> ApprovalHandler {
            Arc::new(move |req: ApprovalRequest| {
                let invocations = Arc::clone(&invocations);
                Box::pin(async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    Ok(ApprovalResponse::Approved(RpcResult::Sign(SignResult {
                        signature: format!("sig-{}", req.id),
                    })))
                })
            })
        }

        let invocations = Arc::new(AtomicUsize::new(0));
        let coordinator = ApprovalCoordinator::new();
        coordinator.set_handler(counting_handler(
            Arc::clone(&invocations),
            Duration::from_millis(50),
        ));

        let in_flight = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .request_approval(request(5, "https://dapp.example"))
                    .await
            })
        };

        // Let the first handler start, then swap handlers while the request
        // is still in flight. The entry must not be dispatched again.
        while invocations.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        coordinator.set_handler(counting_handler(Arc::clone(&invocations), Duration::ZERO));

        let response = in_flight.await.unwrap().unwrap();
        assert!(matches!(response, ApprovalResponse::Approved(_)));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn queued_requests_are_visible_by_origin_until_handled() {
        let coordinator = ApprovalCoordinator::new();

        let pending_call = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .request_approval(request(4, "https://dapp.example"))
                    .await
            })
        };

        // Wait until the request lands in the queue.
        while coordinator.pending_len() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(coordinator.pending_for_origin("https://dapp.example").len(), 1);
        assert!(coordinator.pending_for_origin("https://other.example").is_empty());

        // Late registration drains the queue.
        coordinator.set_handler(approving_handler());
        let response = pending_call.await.unwrap().unwrap();
        assert!(matches!(response, ApprovalResponse::Approved(_)));
        assert_eq!(coordinator.pending_len(), 0);
    }
}
