use super::protocol::LocatorMessage;
use super::registry::{LocatorRegistry, ServerLocatorRegistry};
use super::types::{LocatorId, LocatorSnapshot, SiteId};

use std::sync::Arc;
use tokio::sync::mpsc;

/// Capability the reconciler drives.
///
/// The listener owns both registries for the life of the process and hands out
/// shared references; the reconciler mutates them only through their concurrent
/// APIs and calls `locator_joined` once per newly learned locator.
pub trait MembershipListener: Send + Sync {
    fn all_locators(&self) -> &LocatorRegistry;

    fn all_server_locators(&self) -> &ServerLocatorRegistry;

    /// Called synchronously, after the registries already contain `locator`.
    ///
    /// `source` is the peer that reported the fact, or `None` when it was
    /// discovered locally or merged from an exchanged snapshot.
    fn locator_joined(&self, site_id: SiteId, locator: &LocatorId, source: Option<&LocatorId>);
}

/// A join message addressed to one local peer, waiting for a transport.
#[derive(Debug, Clone)]
pub struct OutboundJoin {
    pub target: LocatorId,
    pub message: LocatorMessage,
}

/// Listener of a running locator process.
///
/// Every newly learned locator is relayed to the other locators of the local site,
/// skipping this locator, the joined locator and whoever reported it.
pub struct LocalMembershipListener {
    local_site: SiteId,
    local_locator: LocatorId,
    locators: LocatorRegistry,
    server_locators: ServerLocatorRegistry,
    outbound: mpsc::UnboundedSender<OutboundJoin>,
}

impl LocalMembershipListener {
    pub fn new(
        local_site: SiteId,
        local_locator: LocatorId,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundJoin>) {
        let (outbound, rx) = mpsc::unbounded_channel();

        let listener = Arc::new(Self {
            local_site,
            local_locator,
            locators: LocatorRegistry::new(),
            server_locators: ServerLocatorRegistry::new(),
            outbound,
        });

        (listener, rx)
    }

    pub fn local_site(&self) -> SiteId {
        self.local_site
    }

    pub fn local_locator(&self) -> &LocatorId {
        &self.local_locator
    }

    pub fn locators_snapshot(&self) -> LocatorSnapshot {
        self.locators.snapshot()
    }

    /// Client-serving locators of `site_id`, sorted.
    pub fn server_locators(&self, site_id: SiteId) -> Vec<String> {
        self.server_locators.sorted_items(site_id)
    }

    fn join_targets(&self, locator: &LocatorId, source: Option<&LocatorId>) -> Vec<LocatorId> {
        let Some(peers) = self.locators.get(self.local_site) else {
            return Vec::new();
        };

        peers
            .snapshot()
            .iter()
            .filter(|peer| {
                *peer != &self.local_locator && *peer != locator && Some(*peer) != source
            })
            .cloned()
            .collect()
    }
}

impl MembershipListener for LocalMembershipListener {
    fn all_locators(&self) -> &LocatorRegistry {
        &self.locators
    }

    fn all_server_locators(&self) -> &ServerLocatorRegistry {
        &self.server_locators
    }

    fn locator_joined(&self, site_id: SiteId, locator: &LocatorId, source: Option<&LocatorId>) {
        tracing::info!(
            "Locator {} joined site {} (reported by {})",
            locator,
            site_id,
            source.map_or_else(|| "local".to_string(), |s| s.to_string())
        );

        for target in self.join_targets(locator, source) {
            let message = LocatorMessage::Join {
                site_id,
                locator: locator.clone(),
                source: Some(self.local_locator.clone()),
            };

            if let Err(e) = self.outbound.send(OutboundJoin { target, message }) {
                tracing::warn!(
                    "Dropped join of {} for {}: outbound channel closed",
                    locator,
                    e.0.target
                );
            }
        }
    }
}
