//! Merges locator facts into the listener's registries.
//!
//! Every identity that becomes newly known produces exactly one
//! `locator_joined` call, whether it arrived as a single fact or as part of an
//! exchanged snapshot. Known identities are silently ignored and nothing is
//! ever removed.

use super::listener::MembershipListener;
use super::registry::CowSet;
use super::types::{LocatorId, LocatorSnapshot, SiteId};

use std::sync::Arc;

pub struct Reconciler<L> {
    listener: Arc<L>,
}

impl<L> Clone for Reconciler<L> {
    fn clone(&self) -> Self {
        Self {
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<L: MembershipListener> Reconciler<L> {
    pub fn new(listener: Arc<L>) -> Self {
        Self { listener }
    }

    pub fn listener(&self) -> &Arc<L> {
        &self.listener
    }

    /// Records that `locator` belongs to `site_id`.
    ///
    /// # Returns
    /// * `true` if the locator was new; the listener has been notified with `source`.
    /// * `false` if it was already known; nothing changed.
    pub fn add_locator(
        &self,
        site_id: SiteId,
        locator: &LocatorId,
        source: Option<&LocatorId>,
    ) -> bool {
        let registry = self.listener.all_locators();
        let (set, created) =
            registry.install_if_absent(site_id, || CowSet::from_items([locator.clone()]));

        if !created && !set.insert(locator.clone()) {
            tracing::debug!("Locator {} already known for site {}", locator, site_id);
            return false;
        }

        if created {
            tracing::info!("Discovered new site {} via locator {}", site_id, locator);
        }

        self.add_server_locator(site_id, locator);
        self.listener.locator_joined(site_id, locator, source);
        true
    }

    /// Mirrors a client-serving locator into the server-locator registry.
    fn add_server_locator(&self, site_id: SiteId, locator: &LocatorId) {
        if !locator.is_server_locator() {
            return;
        }

        let name = locator.to_string();
        let (set, created) = self
            .listener
            .all_server_locators()
            .install_if_absent(site_id, || CowSet::from_items([name.clone()]));

        if !created {
            set.insert(name);
        }
    }

    /// Merges a snapshot received from another locator.
    ///
    /// Sites and locators missing locally are added and announced with no source;
    /// locators known only locally are kept. Returns whether anything was added.
    pub fn add_exchanged_locators(&self, remote: &LocatorSnapshot) -> bool {
        let registry = self.listener.all_locators();

        if registry.snapshot() == *remote {
            tracing::debug!("Exchanged snapshot matches local registry");
            return false;
        }

        let mut changed = false;

        for (&site_id, remote_locators) in remote {
            let (local, created) = registry.install_if_absent(site_id, || {
                CowSet::from_items(remote_locators.iter().cloned())
            });

            if created {
                tracing::info!(
                    "Discovered new site {} with {} locator(s) via exchange",
                    site_id,
                    remote_locators.len()
                );
                changed = true;

                for locator in remote_locators {
                    self.add_server_locator(site_id, locator);
                    self.listener.locator_joined(site_id, locator, None);
                }
                continue;
            }

            if *local.snapshot() == *remote_locators {
                continue;
            }

            for locator in remote_locators {
                // insert() is the arbiter: a locator another thread added first is skipped.
                if local.insert(locator.clone()) {
                    changed = true;
                    self.add_server_locator(site_id, locator);
                    self.listener.locator_joined(site_id, locator, None);
                }
            }
        }

        changed
    }
}
