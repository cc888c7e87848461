//! Connection creation with pair deduplication.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use meethub_core::AppError;
use meethub_core::AppResult;
use meethub_core::events::{ConnectionEvent, DomainEvent, EventPayload, QuotaEvent};
use meethub_core::traits::{EventSink, QuotaDecision, QuotaLedger};
use meethub_core::types::{ActionType, ActorId, ConnectionId};
use meethub_entity::{ActorPair, ConnectMethod, Connection};

use crate::store::Stores;

/// Result of a connect request.
///
/// `AlreadyExists` is an expected outcome, not a duplicate-key failure:
/// simultaneous mutual scans resolve to one `Created` and one
/// `AlreadyExists` referencing the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectOutcome {
    /// A new connection edge was created.
    Created(ConnectionId),
    /// An active connection already exists for this pair.
    AlreadyExists(ConnectionId),
}

impl ConnectOutcome {
    /// The connection id the outcome refers to.
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            Self::Created(id) | Self::AlreadyExists(id) => *id,
        }
    }
}

/// Ensures at most one active connection exists per unordered actor pair.
///
/// The pair key is canonical (ordered by id), so A-scans-B and B-scans-A
/// contend on the same guard; the loser of the race observes
/// `AlreadyExists`. Quota is consumed only on the path that actually
/// creates an edge, so a dedup hit or privacy rejection never charges
/// the initiator.
#[derive(Clone)]
pub struct ConnectionService {
    stores: Stores,
    ledger: Arc<dyn QuotaLedger>,
    sink: Arc<dyn EventSink>,
    guards: Arc<DashMap<ActorPair, Arc<Mutex<()>>>>,
}

impl ConnectionService {
    /// Creates a connection service over the given tables and ledger.
    pub fn new(stores: Stores, ledger: Arc<dyn QuotaLedger>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            stores,
            ledger,
            sink,
            guards: Arc::new(DashMap::new()),
        }
    }

    fn guard(&self, pair: ActorPair) -> Arc<Mutex<()>> {
        self.guards
            .entry(pair)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Attempts to connect the initiator to the target.
    pub async fn connect(
        &self,
        initiator_id: ActorId,
        target_id: ActorId,
        method: ConnectMethod,
    ) -> AppResult<ConnectOutcome> {
        let pair = ActorPair::new(initiator_id, target_id)
            .ok_or_else(|| AppError::validation("Cannot connect an actor to themselves"))?;

        let initiator = self.stores.actors.require(initiator_id).await?;
        if initiator.is_suspended() {
            return Err(AppError::forbidden("Actor is suspended"));
        }
        let target = self.stores.actors.require(target_id).await?;
        if !target.privacy.allows_method(method) {
            return Err(AppError::forbidden(format!(
                "Target does not accept connections via {method}"
            )));
        }

        let guard = self.guard(pair);
        let _held = guard.lock().await;

        if let Some(existing) = self.stores.connections.get(pair).await {
            return Ok(ConnectOutcome::AlreadyExists(existing.id));
        }

        match self
            .ledger
            .try_consume(initiator_id, initiator.role.as_str(), ActionType::Connection)
            .await?
        {
            QuotaDecision::Allowed { used, limit } => {
                self.sink
                    .publish(DomainEvent::new(
                        Some(initiator_id),
                        EventPayload::Quota(QuotaEvent::Consumed {
                            actor_id: initiator_id,
                            action: ActionType::Connection,
                            used,
                            limit,
                        }),
                    ))
                    .await;
            }
            QuotaDecision::Denied { retry_at } => {
                self.sink
                    .publish(DomainEvent::new(
                        Some(initiator_id),
                        EventPayload::Quota(QuotaEvent::Denied {
                            actor_id: initiator_id,
                            action: ActionType::Connection,
                            retry_at,
                        }),
                    ))
                    .await;
                return Err(AppError::rate_limited(
                    "Daily connection quota exhausted",
                    retry_at,
                ));
            }
        }

        // Unreachable only via a bug: the pair was validated above. Give
        // the quota unit back so a failure never charges the initiator.
        let Some(connection) = Connection::new(initiator_id, target_id, method) else {
            self.ledger
                .refund(initiator_id, ActionType::Connection)
                .await?;
            return Err(AppError::internal_consistency(
                "Validated pair produced a self-connection",
            ));
        };
        let connection_id = connection.id;
        self.stores.connections.insert(connection).await;

        info!(
            connection_id = %connection_id,
            initiator_id = %initiator_id,
            target_id = %target_id,
            method = %method,
            "Connection created"
        );
        self.sink
            .publish(DomainEvent::new(
                Some(initiator_id),
                EventPayload::Connection(ConnectionEvent::Created {
                    connection_id,
                    initiator_id,
                    target_id,
                    method: method.as_str().to_string(),
                }),
            ))
            .await;

        Ok(ConnectOutcome::Created(connection_id))
    }

    /// Removes the connection between two actors. Either side may remove
    /// it; removal does not prevent recreation (subject to quota).
    pub async fn disconnect(&self, caller_id: ActorId, other_id: ActorId) -> AppResult<()> {
        let pair = ActorPair::new(caller_id, other_id)
            .ok_or_else(|| AppError::validation("Cannot disconnect an actor from themselves"))?;

        let guard = self.guard(pair);
        let _held = guard.lock().await;

        let removed = self
            .stores
            .connections
            .remove(pair)
            .await
            .ok_or_else(|| AppError::not_found("No active connection for this pair"))?;

        info!(
            connection_id = %removed.id,
            caller_id = %caller_id,
            other_id = %other_id,
            "Connection removed"
        );
        self.sink
            .publish(DomainEvent::new(
                Some(caller_id),
                EventPayload::Connection(ConnectionEvent::Removed {
                    connection_id: removed.id,
                    removed_by: caller_id,
                    other_id,
                }),
            ))
            .await;

        Ok(())
    }

    /// Sets the caller's private note on their connection with `other_id`.
    /// Notes are per side; the other actor's note is untouched.
    pub async fn set_note(
        &self,
        caller_id: ActorId,
        other_id: ActorId,
        note: impl Into<String>,
    ) -> AppResult<()> {
        let pair = ActorPair::new(caller_id, other_id)
            .ok_or_else(|| AppError::validation("Cannot note a connection with oneself"))?;

        let guard = self.guard(pair);
        let _held = guard.lock().await;

        let note = note.into();
        self.stores
            .connections
            .update(pair, |connection| {
                connection.set_note(caller_id, note);
            })
            .await
            .ok_or_else(|| AppError::not_found("No active connection for this pair"))?;
        Ok(())
    }

    /// The active connection between two actors, if any.
    pub async fn between(&self, a: ActorId, b: ActorId) -> Option<Connection> {
        let pair = ActorPair::new(a, b)?;
        self.stores.connections.get(pair).await
    }
}
