//! WAN Locator Membership Module
//!
//! Keeps track of every locator known across all connected sites and makes sure each
//! newly learned locator is announced exactly once.
//!
//! ## Core Mechanisms
//! - **Registries**: Per-site copy-on-write sets of locators (and of client-serving locators),
//!   owned by the listener for the lifetime of the process.
//! - **Reconciliation**: Single facts and full exchanged snapshots are merged additively;
//!   only the thread that actually publishes a locator fires the join notification.
//! - **Exchange Protocol**: Bincode-encoded messages a transport carries between locators.

pub mod listener;
pub mod protocol;
pub mod reconciler;
pub mod registry;
pub mod types;
