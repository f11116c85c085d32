//! Error types for the Renewal Workflow Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while driving renewals through
//! their lifecycle.

use thiserror::Error;

/// The main error type for the Renewal Workflow Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application. Caller errors
/// (empty selection, mixed jurisdictions) are ordinary variants that the
/// API boundary maps to `{"error": ...}` responses, never panics.
///
/// # Example
///
/// ```
/// use renewal_engine::error::EngineError;
///
/// let error = EngineError::EmptySelection;
/// assert_eq!(error.to_string(), "No renewal selected.");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The operator submitted an empty renewal selection.
    #[error("No renewal selected.")]
    EmptySelection,

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A persisted lifecycle or invoice step code was not recognised.
    #[error("Unknown {axis} code: {code}")]
    UnknownStepCode {
        /// The state axis ("step" or "invoice_step").
        axis: &'static str,
        /// The numeric code that could not be mapped.
        code: i16,
    },

    /// A referenced matter does not exist in the repository.
    #[error("Matter not found: {id}")]
    MatterNotFound {
        /// The matter identifier.
        id: String,
    },

    /// A referenced client does not exist in the repository.
    #[error("Client not found: {id}")]
    ClientMissing {
        /// The client identifier.
        id: String,
    },

    /// The external invoicing system has no client matching the name.
    #[error("Client '{name}' not found in the invoicing system")]
    ExternalClientNotFound {
        /// The display name that failed the prefix lookup.
        name: String,
    },

    /// The invoicing API call failed.
    #[error("Invoicing API error: {message}")]
    InvoicingApi {
        /// A description of the failure.
        message: String,
    },

    /// No usable recipient email address for a client notice.
    #[error("No recipient email for client '{client}'")]
    MissingRecipient {
        /// The display name of the client without an address.
        client: String,
    },

    /// The mail transport failed to dispatch a notice.
    #[error("Mail dispatch failed: {message}")]
    MailDispatch {
        /// A description of the failure.
        message: String,
    },

    /// A payment order mixed renewals from more than one jurisdiction.
    #[error("Payment order requires a single jurisdiction, found: {found}")]
    MixedJurisdictions {
        /// Comma-separated list of the jurisdictions encountered.
        found: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
