use super::listener::MembershipListener;
use super::reconciler::Reconciler;
use super::types::{LocatorId, LocatorSnapshot, SiteId};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Messages exchanged between locators, within a site and across sites.
///
/// - `Join`: a local peer relays one newly learned locator.
/// - `ExchangeRequest/ExchangeResponse`: two locators swap full snapshots.
/// - `RemoteLocatorsRequest/RemoteLocatorsResponse`: lookup of a site's server locators.
/// - `Ping/Pong`: liveness check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LocatorMessage {
    Join {
        site_id: SiteId,
        locator: LocatorId,
        source: Option<LocatorId>,
    },

    ExchangeRequest {
        site_id: SiteId,
        locator: LocatorId,
        locators: LocatorSnapshot,
    },

    ExchangeResponse {
        locators: LocatorSnapshot,
    },

    RemoteLocatorsRequest {
        site_id: SiteId,
    },

    RemoteLocatorsResponse {
        locators: Vec<String>,
    },

    Ping,

    Pong,
}

pub fn encode(msg: &LocatorMessage) -> Result<Vec<u8>> {
    Ok(bincode::serialize(msg)?)
}

pub fn decode(bytes: &[u8]) -> Result<LocatorMessage> {
    Ok(bincode::deserialize(bytes)?)
}

/// Applies decoded messages to the local registries and builds replies.
pub struct ExchangeHandler<L> {
    reconciler: Reconciler<L>,
}

impl<L: MembershipListener> ExchangeHandler<L> {
    pub fn new(reconciler: Reconciler<L>) -> Self {
        Self { reconciler }
    }

    /// Handles one message, returning the reply to send back if the message expects one.
    pub fn handle(&self, msg: LocatorMessage) -> Option<LocatorMessage> {
        match msg {
            LocatorMessage::Join {
                site_id,
                locator,
                source,
            } => {
                self.reconciler
                    .add_locator(site_id, &locator, source.as_ref());
                None
            }

            LocatorMessage::ExchangeRequest {
                site_id,
                locator,
                locators,
            } => {
                tracing::debug!(
                    "Exchange request from {} (site {}) with {} site(s)",
                    locator,
                    site_id,
                    locators.len()
                );

                self.reconciler.add_locator(site_id, &locator, None);
                self.reconciler.add_exchanged_locators(&locators);

                Some(LocatorMessage::ExchangeResponse {
                    locators: self.reconciler.listener().all_locators().snapshot(),
                })
            }

            LocatorMessage::ExchangeResponse { locators } => {
                self.reconciler.add_exchanged_locators(&locators);
                None
            }

            LocatorMessage::RemoteLocatorsRequest { site_id } => {
                let locators = self
                    .reconciler
                    .listener()
                    .all_server_locators()
                    .sorted_items(site_id);

                Some(LocatorMessage::RemoteLocatorsResponse { locators })
            }

            LocatorMessage::Ping => Some(LocatorMessage::Pong),

            LocatorMessage::RemoteLocatorsResponse { .. } | LocatorMessage::Pong => None,
        }
    }

    /// Decodes a frame, handles it, and encodes the reply if there is one.
    pub fn handle_frame(&self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let msg = decode(bytes)?;

        match self.handle(msg) {
            Some(reply) => Ok(Some(encode(&reply)?)),
            None => Ok(None),
        }
    }
}
