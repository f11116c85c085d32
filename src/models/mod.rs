//! Core data models for the Renewal Workflow Engine.
//!
//! This module contains all the domain records used throughout the engine.

mod log_entry;
mod matter;
mod schedule;
mod task;

pub use log_entry::RenewalLogEntry;
pub use matter::{CaseEvent, Client, Contact, EventKind, Language, Matter};
pub use schedule::{FeePair, FeeScheduleEntry};
pub use task::{InvoiceStep, LifecycleStep, RenewalTask};
