//! Wallet Adapter
//!
//! Composition root tying the key store, authenticator, session state and
//! approval coordinator together. All collaborators are explicitly
//! constructed instances; nothing here is process-global.
//!
//! Inbound RPC requests flow: envelope validation -> method-discriminated
//! param decoding -> [`ApprovalRequest`] -> coordinator -> the decision
//! handler registered at construction -> RPC response envelope.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::approval::{ApprovalCoordinator, ApprovalParams, ApprovalRequest, ApprovalResponse};
use crate::authenticator::Authenticator;
use crate::codec::base58;
use crate::config::WalletConfig;
use crate::error::{WalletError, WalletResult};
use crate::keystore::KeyStore;
use crate::rpc::{
    self, ConnectResult, RequestMethod, RequestParams, RpcError, RpcRequest, RpcResponse,
    RpcResult, SendTransactionResult, SignAllResult, SignResult, JSONRPC_VERSION,
};
use crate::session::{SessionLock, SessionRegistry};
use crate::tx::PublicKey;

/// The wallet account exposed to a connected origin.
#[derive(Debug, Clone)]
pub struct WalletAccount {
    pub public_key: PublicKey,
    pub label: Option<String>,
}

/// Shared state consumed by both the adapter surface and the decision
/// handler it registers.
struct WalletCore {
    keystore: Arc<dyn KeyStore>,
    authenticator: Arc<dyn Authenticator>,
    session_lock: SessionLock,
    registry: SessionRegistry,
    config: WalletConfig,
}

impl WalletCore {
    /// Authenticate if the session is locked (or per-request auth is
    /// configured), extending the unlock window on success.
    async fn ensure_unlocked(&self) -> WalletResult<()> {
        if self.config.require_auth_per_request || !self.session_lock.is_unlocked() {
            self.authenticator
                .authenticate()
                .await
                .map_err(|_| WalletError::Locked)?;
            self.session_lock.unlock_for(self.config.session_ttl);
        }
        self.session_lock.require_unlock()
    }

    /// The wallet public key, creating the keypair on first use.
    fn wallet_public_key(&self) -> WalletResult<PublicKey> {
        match self.keystore.public_key() {
            Ok(key) => Ok(key),
            Err(WalletError::KeyNotFound) => self.keystore.create_if_absent(),
            Err(err) => Err(err),
        }
    }

    fn sign_batch(&self, items: &[Vec<u8>]) -> WalletResult<SignAllResult> {
        if items.is_empty() {
            return Err(WalletError::InvalidParams("empty batch".into()));
        }
        let mut signatures = Vec::with_capacity(items.len());
        for item in items {
            let signature = self.keystore.sign(item)?;
            signatures.push(rpc::encode_payload(&signature));
        }
        Ok(SignAllResult { signatures })
    }

    /// The decision logic invoked by the coordinator for each request.
    async fn process(&self, request: ApprovalRequest) -> WalletResult<ApprovalResponse> {
        self.ensure_unlocked().await?;
        let origin = request.origin.as_str();

        let result = match &request.params {
            ApprovalParams::Connect => {
                self.registry.connect(origin);
                info!(origin, "origin connected");
                RpcResult::Connect(ConnectResult {
                    public_key: self.wallet_public_key()?.to_base58(),
                    account_label: self.config.account_label.clone(),
                })
            }
            ApprovalParams::SignTransaction(bytes) | ApprovalParams::SignMessage(bytes) => {
                self.registry.require_connected(origin)?;
                let signature = self.keystore.sign(bytes)?;
                RpcResult::Sign(SignResult {
                    signature: rpc::encode_payload(&signature),
                })
            }
            ApprovalParams::SendTransaction(tx_hash) => {
                // Already signed; network submission is the caller's job.
                self.registry.require_connected(origin)?;
                RpcResult::SendTransaction(SendTransactionResult {
                    signature: tx_hash.clone(),
                })
            }
            ApprovalParams::SignTransactions(items)
            | ApprovalParams::SignMessages(items)
            | ApprovalParams::SignAllTransactions(items)
            | ApprovalParams::SignAllMessages(items) => {
                self.registry.require_connected(origin)?;
                RpcResult::SignAll(self.sign_batch(items)?)
            }
        };

        Ok(ApprovalResponse::Approved(result))
    }
}

/// The wallet service: approval-gated account access, message signing and
/// transaction signing over a single Ed25519 keypair.
pub struct WalletAdapter {
    core: Arc<WalletCore>,
    coordinator: ApprovalCoordinator,
}

impl WalletAdapter {
    /// Build an adapter and register its decision handler with a fresh
    /// coordinator.
    pub fn new(
        keystore: Arc<dyn KeyStore>,
        authenticator: Arc<dyn Authenticator>,
        config: WalletConfig,
    ) -> Self {
        let core = Arc::new(WalletCore {
            keystore,
            authenticator,
            session_lock: SessionLock::new(),
            registry: SessionRegistry::new(),
            config,
        });

        let coordinator = ApprovalCoordinator::new();
        let handler_core = Arc::clone(&core);
        coordinator.set_handler(Arc::new(move |request: ApprovalRequest| {
            let core = Arc::clone(&handler_core);
            Box::pin(async move { core.process(request).await })
        }));

        Self { core, coordinator }
    }

    // -------------------------------------------------------------------------
    // RPC surface
    // -------------------------------------------------------------------------

    /// Handle one raw JSON-RPC request. Malformed JSON cannot carry an id,
    /// so such failures respond with id 0.
    pub async fn handle_raw(&self, raw: &str) -> RpcResponse {
        match serde_json::from_str::<RpcRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                warn!(error = %err, "unparsable request envelope");
                RpcResponse::failure(0, RpcError::invalid_params(err.to_string()))
            }
        }
    }

    /// Handle one parsed JSON-RPC request, producing exactly one response.
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id;
        match self.route(request).await {
            Ok(ApprovalResponse::Approved(result)) => RpcResponse::success(id, result),
            Ok(ApprovalResponse::Rejected) => {
                info!(id, "request rejected by decision handler");
                RpcResponse::failure(id, RpcError::user_rejected())
            }
            Err(err) => {
                debug!(id, error = %err, "request failed");
                RpcResponse::failure(id, RpcError::from(&err))
            }
        }
    }

    async fn route(&self, request: RpcRequest) -> WalletResult<ApprovalResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(WalletError::InvalidParams(format!(
                "unsupported protocol version {:?}",
                request.jsonrpc
            )));
        }

        let method = RequestMethod::parse(&request.method)
            .ok_or_else(|| WalletError::MethodNotFound(request.method.clone()))?;
        let params = RequestParams::decode(method, &request.params)?;
        let origin = Url::parse(params.origin())
            .map_err(|err| WalletError::InvalidParams(format!("invalid origin: {err}")))?;

        info!(id = request.id, method = method.as_str(), origin = %origin, "dispatching request");

        let approval = ApprovalRequest {
            id: request.id,
            method,
            origin,
            params: decode_approval_params(params)?,
        };
        self.coordinator.request_approval(approval).await
    }

    // -------------------------------------------------------------------------
    // Direct service surface
    // -------------------------------------------------------------------------

    /// The wallet public key, creating the keypair on first use.
    pub fn public_key(&self) -> WalletResult<PublicKey> {
        self.core.wallet_public_key()
    }

    /// Connect an origin. Already-connected origins skip the unlock gate.
    pub async fn connect(&self, origin: &Url) -> WalletResult<WalletAccount> {
        if !self.core.registry.is_connected(origin.as_str()) {
            self.core.ensure_unlocked().await?;
            self.core.registry.connect(origin.as_str());
            info!(origin = %origin, "origin connected");
        }
        Ok(WalletAccount {
            public_key: self.core.wallet_public_key()?,
            label: self.core.config.account_label.clone(),
        })
    }

    /// Sign raw message bytes for a connected origin.
    pub async fn sign_message(&self, message: &[u8], origin: &Url) -> WalletResult<[u8; 64]> {
        self.core.ensure_unlocked().await?;
        self.core.registry.require_connected(origin.as_str())?;
        self.core.keystore.sign(message)
    }

    /// Sign pre-serialized transaction bytes for a connected origin.
    pub async fn sign_transaction(&self, tx: &[u8], origin: &Url) -> WalletResult<[u8; 64]> {
        self.core.ensure_unlocked().await?;
        self.core.registry.require_connected(origin.as_str())?;
        self.core.keystore.sign(tx)
    }

    /// Sign transaction bytes and return the base58 signature string the
    /// caller submits to the network itself.
    pub async fn send_transaction(&self, tx: &[u8], origin: &Url) -> WalletResult<String> {
        let signature = self.sign_transaction(tx, origin).await?;
        Ok(base58::encode(&signature))
    }

    /// Disconnect an origin.
    pub fn disconnect(&self, origin: &Url) {
        self.core.registry.disconnect(origin.as_str());
    }

    /// Lock the session immediately.
    pub fn lock(&self) {
        self.core.session_lock.lock();
    }

    pub fn session_lock(&self) -> &SessionLock {
        &self.core.session_lock
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.core.registry
    }

    pub fn coordinator(&self) -> &ApprovalCoordinator {
        &self.coordinator
    }
}

/// Decode the wire params into approval payload bytes.
fn decode_approval_params(params: RequestParams) -> WalletResult<ApprovalParams> {
    fn decode_all(items: &[String]) -> WalletResult<Vec<Vec<u8>>> {
        items.iter().map(|item| rpc::decode_payload(item)).collect()
    }

    Ok(match params {
        RequestParams::Connect(_) => ApprovalParams::Connect,
        RequestParams::SignTransaction(p) => {
            ApprovalParams::SignTransaction(rpc::decode_payload(&p.tx)?)
        }
        RequestParams::SignMessage(p) => {
            ApprovalParams::SignMessage(rpc::decode_payload(&p.message)?)
        }
        RequestParams::SendTransaction(p) => ApprovalParams::SendTransaction(p.tx_hash),
        RequestParams::SignTransactions(p) => {
            ApprovalParams::SignTransactions(decode_all(&p.transactions)?)
        }
        RequestParams::SignMessages(p) => ApprovalParams::SignMessages(decode_all(&p.messages)?),
        RequestParams::SignAllTransactions(p) => {
            ApprovalParams::SignAllTransactions(decode_all(&p.transactions)?)
        }
        RequestParams::SignAllMessages(p) => {
            ApprovalParams::SignAllMessages(decode_all(&p.messages)?)
        }
    })
}
