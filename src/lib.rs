//! Renewal Workflow Engine for IP portfolio management.
//!
//! This crate drives patent and trademark renewal (annuity) tasks through
//! their lifecycle, from pending through notified, payable, paid, receipted
//! and closed, or out via abandonment and lapse. It computes the amounts
//! owed at each stage, dispatches staged client notifications, records an
//! append-only audit trail of every transition and keeps billing in sync
//! with an external invoicing system.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod fees;
pub mod invoicing;
pub mod models;
pub mod notify;
pub mod store;
pub mod workflow;
