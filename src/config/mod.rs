//! Configuration loading and types for the Renewal Workflow Engine.
//!
//! Settings and the fee schedule are loaded from YAML files in a
//! configuration directory; see [`ConfigLoader`] for the layout.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineSettings, FeeSettings, InvoicingSettings, NoticeSettings, OrderSettings, SmtpSettings,
};
