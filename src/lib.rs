//! WAN Locator Library
//!
//! Membership-reconciliation core for the locators of a multi-site data grid.
//! Each site runs one or more locators; every locator must learn about all locators
//! known at any connected site and relay each new fact to its local peers once.
//!
//! ## Modules
//! - **`membership`**: Locator identities, the per-site registries, the reconciler that
//!   merges single facts and exchanged snapshots, and the exchange wire protocol.
//! - **`config`**: Command-line configuration of a locator process.

pub mod config;
pub mod membership;
