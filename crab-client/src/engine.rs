//! Sync engine
//!
//! Keeps the local replica (snapshot store + cursor) in step with the
//! server's event log. Network calls never hold the state lock; a response
//! is only applied if its sync is still the newest one.

use backoff::ExponentialBackoff;
use crab_orders::OrderStore;
use shared::models::price_rule::RuleSet;
use shared::order::{
    CommandResponse, OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot, SyncRequest,
    SyncResponse, VoidType,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{PricingConfig, SyncConfig};
use crate::cursor::{ConnectionState, SyncCursor};
use crate::error::{SyncError, SyncResult};
use crate::storage::SyncStorage;
use crate::transport::{CommandTransport, RuleSource, SyncTransport};

const GHOST_VOID_NOTE: &str = "Ghost order voided by operator";

/// Requested sync flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Incremental when the cursor allows it, escalating to full on gaps,
    /// epoch changes and integrity failures
    Auto,
    /// Discard the cursor and rebuild from the server baseline
    Full,
}

/// Result of one completed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub full: bool,
    /// Events applied from the response
    pub applied: usize,
    pub last_sequence: u64,
}

struct EngineState {
    store: OrderStore,
    cursor: SyncCursor,
}

/// Replica synchronization over a [`SyncTransport`]
pub struct SyncEngine<T> {
    transport: T,
    storage: SyncStorage,
    config: SyncConfig,
    state: Mutex<EngineState>,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
    state_tx: watch::Sender<ConnectionState>,
}

impl<T: SyncTransport> SyncEngine<T> {
    /// Build the engine and restore the replica from `storage`.
    ///
    /// An unreadable replica is cleared; the next sync is then a full one.
    pub fn new(
        transport: T,
        storage: SyncStorage,
        config: SyncConfig,
        pricing: PricingConfig,
    ) -> Self {
        let restored = match storage.restore() {
            Ok(restored) => restored,
            Err(e) => {
                warn!(error = %e, "Local replica unreadable, next sync will be full");
                if let Err(e) = storage.clear() {
                    error!(error = %e, "Failed to clear local replica");
                }
                Default::default()
            }
        };

        let mut store = OrderStore::new(restored.rules.unwrap_or_default())
            .with_pricing(pricing.utc_offset_minutes, pricing.rounding);
        store.replace_all(restored.snapshots);

        let mut cursor = restored.cursor;
        cursor.connection_state = ConnectionState::Disconnected;
        info!(
            last_sequence = cursor.last_sequence,
            epoch = ?cursor.server_epoch,
            orders = store.len(),
            "Replica restored"
        );

        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            storage,
            config,
            state: Mutex::new(EngineState { store, cursor }),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            state_tx,
        }
    }

    // ========== Connection lifecycle ==========

    /// Connect and bring the replica up to date
    pub async fn connect(&self) -> SyncResult<SyncOutcome> {
        {
            let mut state = self.state.lock().await;
            self.transition(&mut state, ConnectionState::Connecting)?;
        }
        self.connect_once().await?;
        self.sync(SyncMode::Auto).await
    }

    /// Reconnect with capped exponential backoff.
    ///
    /// Gives up (and goes `DISCONNECTED`) after the configured attempt cap, on
    /// a non-transient error, or when [`disconnect`](Self::disconnect) is
    /// called meanwhile.
    pub async fn reconnect(&self) -> SyncResult<SyncOutcome> {
        {
            let mut state = self.state.lock().await;
            if state.cursor.connection_state != ConnectionState::Reconnecting {
                self.transition(&mut state, ConnectionState::Reconnecting)?;
            }
        }

        let policy = ExponentialBackoff {
            initial_interval: self.config.backoff_initial,
            current_interval: self.config.backoff_initial,
            max_interval: self.config.backoff_max,
            multiplier: self.config.backoff_multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };
        let attempts = AtomicU32::new(0);
        let cap = self.config.max_reconnect_attempts;

        let attempts_ref = &attempts;
        let result = backoff::future::retry_notify(
            policy,
            move || async move {
                if *self.state_tx.borrow() == ConnectionState::Disconnected {
                    return Err(backoff::Error::permanent(SyncError::Superseded));
                }
                let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(attempt, "Reconnect attempt");
                match self.try_reconnect().await {
                    Ok(outcome) => Ok(outcome),
                    Err(e) if e.is_transient() && cap.is_none_or(|c| attempt < c) => {
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            },
            |e: SyncError, wait| warn!(error = %e, retry_in = ?wait, "Reconnect failed"),
        )
        .await;

        if let Err(e) = &result {
            error!(
                error = %e,
                attempts = attempts.load(Ordering::SeqCst),
                "Giving up on reconnect"
            );
            self.set_disconnected().await;
        }
        result
    }

    async fn try_reconnect(&self) -> SyncResult<SyncOutcome> {
        self.connect_once().await?;
        self.sync(SyncMode::Auto).await
    }

    /// Drop the connection and discard any in-flight sync
    pub async fn disconnect(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.in_flight.lock().await.take() {
            token.cancel();
        }
        self.set_disconnected().await;
    }

    async fn set_disconnected(&self) {
        let mut state = self.state.lock().await;
        if state.cursor.connection_state != ConnectionState::Disconnected {
            // every state may fall back to DISCONNECTED
            let _ = self.transition(&mut state, ConnectionState::Disconnected);
        }
    }

    async fn connect_once(&self) -> SyncResult<()> {
        let result = match timeout(self.config.timeout, self.transport.connect()).await {
            Err(_) => Err(SyncError::Timeout),
            Ok(result) => result.map_err(SyncError::from),
        };
        if let Err(e) = &result {
            warn!(error = %e, "Connection attempt failed");
            let mut state = self.state.lock().await;
            if state.cursor.connection_state != ConnectionState::Disconnected {
                let _ = self.transition(&mut state, ConnectionState::Reconnecting);
            }
        }
        result
    }

    fn transition(&self, state: &mut EngineState, next: ConnectionState) -> SyncResult<()> {
        let from = state.cursor.connection_state;
        if !from.can_transition_to(next) {
            error!(from = %from, to = %next, "Invalid connection state transition");
            return Err(SyncError::InvalidTransition { from, to: next });
        }
        if from != next {
            info!(from = %from, to = %next, "Connection state changed");
        }
        state.cursor.connection_state = next;
        self.state_tx.send_replace(next);
        Ok(())
    }

    // ========== Sync ==========

    /// Run one sync, escalating an `Auto` sync to a full one when the
    /// incremental path cannot be trusted
    pub async fn sync(&self, mode: SyncMode) -> SyncResult<SyncOutcome> {
        match self.sync_once(mode).await {
            Err(e) if mode == SyncMode::Auto && e.requires_full_sync() => {
                warn!(error = %e, "Escalating to full sync");
                self.sync_once(SyncMode::Full).await
            }
            other => other,
        }
    }

    async fn begin_generation(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        if let Some(previous) = self.in_flight.lock().await.replace(token.clone()) {
            previous.cancel();
        }
        (generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn sync_once(&self, mode: SyncMode) -> SyncResult<SyncOutcome> {
        let (generation, token) = self.begin_generation().await;

        let request = {
            let mut state = self.state.lock().await;
            self.transition(&mut state, ConnectionState::Syncing)?;
            let since_sequence = match mode {
                SyncMode::Full => 0,
                SyncMode::Auto if !state.cursor.is_resumable() => 0,
                SyncMode::Auto => state.cursor.last_sequence,
            };
            SyncRequest { since_sequence }
        };
        debug!(generation, since = request.since_sequence, "Sync started");

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                debug!(generation, "Sync cancelled by a newer request");
                return Err(SyncError::Superseded);
            }
            result = timeout(self.config.timeout, self.transport.fetch(request)) => result,
        };

        let response = match fetched {
            Err(_) => {
                warn!(generation, timeout = ?self.config.timeout, "Sync request timed out");
                self.enter_reconnecting(generation).await;
                return Err(SyncError::Timeout);
            }
            Ok(Err(e)) => {
                warn!(generation, error = %e, "Sync request failed");
                self.enter_reconnecting(generation).await;
                return Err(e.into());
            }
            Ok(Ok(response)) => response,
        };

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            warn!(generation, "Stale sync response discarded");
            return Err(SyncError::Superseded);
        }

        let full = request.since_sequence == 0 || response.requires_full_sync;
        let result = if full {
            self.apply_full(&mut state, response)
        } else {
            self.apply_incremental(&mut state, response)
        };

        match result {
            Ok(outcome) => {
                self.transition(&mut state, ConnectionState::Connected)?;
                let ghosts = state.store.ghost_orders().len();
                if ghosts > 0 {
                    warn!(ghosts, "Ghost orders detected");
                }
                info!(
                    full = outcome.full,
                    applied = outcome.applied,
                    last_sequence = outcome.last_sequence,
                    "Sync completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                let escalates = mode == SyncMode::Auto && e.requires_full_sync();
                if !escalates {
                    let _ = self.transition(&mut state, ConnectionState::Reconnecting);
                }
                Err(e)
            }
        }
    }

    async fn enter_reconnecting(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if self.is_current(generation)
            && state.cursor.connection_state != ConnectionState::Disconnected
        {
            let _ = self.transition(&mut state, ConnectionState::Reconnecting);
        }
    }

    /// Replace the replica with the server baseline plus trailing events
    fn apply_full(
        &self,
        state: &mut EngineState,
        mut response: SyncResponse,
    ) -> SyncResult<SyncOutcome> {
        check_order_monotonic(&response.events)?;

        let mut staged = state.store.clone();
        staged.replace_all(std::mem::take(&mut response.active_orders));

        let mut poisoned = BTreeSet::new();
        let mut applied = 0;
        for event in &response.events {
            if poisoned.contains(event.order_id.as_str()) {
                continue;
            }
            match staged.apply_event(event) {
                Ok(_) => applied += 1,
                Err(e) => {
                    error!(
                        order_id = %event.order_id,
                        sequence = event.sequence,
                        error = %e,
                        "Baseline event failed verification, order dropped"
                    );
                    staged.remove(&event.order_id);
                    poisoned.insert(event.order_id.clone());
                }
            }
        }

        let last_sequence = response
            .last_event_sequence()
            .map_or(response.server_sequence, |s| s.max(response.server_sequence));
        let cursor = SyncCursor {
            last_sequence,
            server_epoch: Some(response.server_epoch),
            connection_state: state.cursor.connection_state,
        };

        self.storage.replace_all(&cursor, staged.snapshots())?;
        state.store = staged;
        state.cursor = cursor;

        Ok(SyncOutcome {
            full: true,
            applied,
            last_sequence,
        })
    }

    fn apply_incremental(
        &self,
        state: &mut EngineState,
        response: SyncResponse,
    ) -> SyncResult<SyncOutcome> {
        if let Some(local) = state.cursor.server_epoch.as_deref()
            && local != response.server_epoch
        {
            warn!(local, remote = %response.server_epoch, "Server epoch changed");
            return Err(SyncError::EpochMismatch {
                local: local.to_string(),
                remote: response.server_epoch,
            });
        }

        let last = state.cursor.last_sequence;
        let fresh = contiguous_tail(&response.events, last)?;
        let new_last = fresh.last().map_or(last, |e| e.sequence);

        if response.server_sequence > new_last {
            error!(
                expected = new_last + 1,
                received = response.server_sequence,
                "Server is ahead of the delivered events"
            );
            return Err(SyncError::SequenceGap {
                expected: new_last + 1,
                received: response.server_sequence,
            });
        }
        if response.server_sequence < last {
            error!(
                local = last,
                server = response.server_sequence,
                "Server sequence behind local cursor"
            );
            return Err(SyncError::SequenceGap {
                expected: last,
                received: response.server_sequence,
            });
        }

        self.commit_events(state, &fresh)?;
        Ok(SyncOutcome {
            full: false,
            applied: fresh.len(),
            last_sequence: new_last,
        })
    }

    /// Apply verified, contiguous events and persist them with the cursor
    fn commit_events(&self, state: &mut EngineState, events: &[OrderEvent]) -> SyncResult<()> {
        let Some(last) = events.last() else {
            return Ok(());
        };

        if let Err(e) = state.store.apply_batch(events) {
            if let Some(order_id) = e.order_id() {
                warn!(order_id, "Dropping compromised order view");
                state.store.remove(order_id);
                self.storage
                    .save_batch(&state.cursor, std::iter::empty(), &[order_id.to_string()])?;
            }
            return Err(e.into());
        }

        state.cursor.last_sequence = last.sequence;
        let touched: BTreeSet<&str> = events.iter().map(|e| e.order_id.as_str()).collect();
        let changed = touched.into_iter().filter_map(|id| state.store.get(id));
        self.storage.save_batch(&state.cursor, changed, &[])?;
        Ok(())
    }

    /// Apply one pushed event while connected.
    ///
    /// Returns whether the replica changed. A gap or a failed hash check
    /// triggers a full sync.
    pub async fn apply_live_event(&self, event: OrderEvent) -> SyncResult<bool> {
        let mut state = self.state.lock().await;
        if state.cursor.connection_state != ConnectionState::Connected {
            debug!(sequence = event.sequence, "Live event ignored while not connected");
            return Ok(false);
        }

        let expected = state.cursor.last_sequence + 1;
        if event.sequence < expected {
            debug!(sequence = event.sequence, "Live event already applied");
            return Ok(false);
        }

        let result = if event.sequence > expected {
            error!(expected, received = event.sequence, "Sequence gap in live events");
            Err(SyncError::SequenceGap {
                expected,
                received: event.sequence,
            })
        } else {
            self.commit_events(&mut state, std::slice::from_ref(&event))
        };

        match result {
            Ok(()) => Ok(true),
            Err(e) if e.requires_full_sync() => {
                drop(state);
                warn!(error = %e, "Live event rejected, resyncing");
                self.sync(SyncMode::Full).await.map(|_| true)
            }
            Err(e) => Err(e),
        }
    }

    // ========== Rules ==========

    /// Fetch and install the current price rules; returns whether they changed
    pub async fn refresh_rules<R: RuleSource>(&self, source: &R) -> SyncResult<bool> {
        let rules: RuleSet = match timeout(self.config.timeout, source.fetch_rules()).await {
            Err(_) => return Err(SyncError::Timeout),
            Ok(result) => result?,
        };
        let mut state = self.state.lock().await;
        if *state.store.rules() == rules {
            return Ok(false);
        }
        self.storage.save_rules(&rules)?;
        Ok(state.store.set_rules(rules))
    }

    // ========== Queries ==========

    pub async fn snapshot(&self, order_id: &str) -> Option<OrderSnapshot> {
        self.state.lock().await.store.get(order_id).cloned()
    }

    pub async fn active_orders(&self) -> Vec<OrderSnapshot> {
        let state = self.state.lock().await;
        state.store.active_orders().into_iter().cloned().collect()
    }

    /// Active orders with no table that are not retail; surfaced, never fixed
    pub async fn ghost_orders(&self) -> Vec<OrderSnapshot> {
        let state = self.state.lock().await;
        state.store.ghost_orders().into_iter().cloned().collect()
    }

    pub async fn cursor(&self) -> SyncCursor {
        self.state.lock().await.cursor.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    // ========== Remediation ==========

    /// Operator-triggered void of a ghost order.
    ///
    /// Only submits the command; the resulting event arrives through sync.
    pub async fn force_void_ghost<C: CommandTransport>(
        &self,
        commands: &C,
        order_id: &str,
        operator_id: &str,
        operator_name: &str,
    ) -> SyncResult<CommandResponse> {
        let is_ghost = self
            .state
            .lock()
            .await
            .store
            .get(order_id)
            .is_some_and(OrderSnapshot::is_ghost);
        if !is_ghost {
            return Err(SyncError::NotAGhost(order_id.to_string()));
        }

        let command = OrderCommand::new(
            operator_id,
            operator_name,
            OrderCommandPayload::VoidOrder {
                order_id: order_id.to_string(),
                void_type: VoidType::Cancelled,
                loss_reason: None,
                loss_amount: None,
                note: Some(GHOST_VOID_NOTE.to_string()),
            },
        );
        info!(order_id, operator_id, command_id = %command.command_id, "Voiding ghost order");

        let response = match timeout(self.config.timeout, commands.submit(command)).await {
            Err(_) => return Err(SyncError::Timeout),
            Ok(result) => result?,
        };
        if !response.success {
            let reason = response
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(order_id, reason = %reason, "Ghost void rejected");
            return Err(SyncError::CommandRejected(reason));
        }
        Ok(response)
    }
}

/// Per-order sequences must never decrease within a batch
fn check_order_monotonic(events: &[OrderEvent]) -> SyncResult<()> {
    let mut last_seen: HashMap<&str, u64> = HashMap::new();
    for event in events {
        if let Some(&previous) = last_seen.get(event.order_id.as_str())
            && event.sequence < previous
        {
            error!(
                order_id = %event.order_id,
                previous,
                received = event.sequence,
                "Out-of-order events in batch, rejecting"
            );
            return Err(SyncError::OrderingViolation {
                order_id: event.order_id.clone(),
                previous,
                received: event.sequence,
            });
        }
        last_seen.insert(event.order_id.as_str(), event.sequence);
    }
    Ok(())
}

/// Events after `last`, which must continue it without gaps
fn contiguous_tail(events: &[OrderEvent], last: u64) -> SyncResult<Vec<OrderEvent>> {
    check_order_monotonic(events)?;

    let mut expected = last + 1;
    let mut fresh = Vec::new();
    for event in events {
        if event.sequence < expected {
            debug!(sequence = event.sequence, "Already applied event dropped");
            continue;
        }
        if event.sequence > expected {
            error!(expected, received = event.sequence, "Sequence gap in sync batch");
            return Err(SyncError::SequenceGap {
                expected,
                received: event.sequence,
            });
        }
        fresh.push(event.clone());
        expected += 1;
    }
    Ok(fresh)
}
