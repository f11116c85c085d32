//! Renewal task model and its two state axes.
//!
//! A renewal task is one periodic fee obligation (annuity year) tied to a
//! matter. Its lifecycle step and billing sub-state are independent axes,
//! each a closed enum; the legacy numeric codes survive only at the
//! persistence boundary via `code()`/`from_code()`.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The lifecycle state of a renewal task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStep {
    /// Freshly generated, not yet notified.
    Pending,
    /// First notice sent to the client.
    FirstCall,
    /// Client instructed payment; awaiting execution.
    ToPay,
    /// Official fee paid.
    Cleared,
    /// Official receipt obtained.
    Receipt,
    /// Administratively closed.
    Closed,
    /// Client abandoned the right.
    Abandoned,
    /// The right lapsed for non-payment.
    Lapsed,
    /// Terminal: fully done.
    Done,
}

impl LifecycleStep {
    /// Returns the legacy numeric code used by the persistence layer.
    pub fn code(self) -> i16 {
        match self {
            LifecycleStep::Pending => 0,
            LifecycleStep::FirstCall => 2,
            LifecycleStep::ToPay => 4,
            LifecycleStep::Cleared => 6,
            LifecycleStep::Receipt => 8,
            LifecycleStep::Closed => 10,
            LifecycleStep::Abandoned => 12,
            LifecycleStep::Lapsed => 14,
            LifecycleStep::Done => -1,
        }
    }

    /// Maps a legacy numeric code back to a step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownStepCode`] for any code outside the
    /// fixed enumerated set.
    pub fn from_code(code: i16) -> EngineResult<Self> {
        match code {
            0 => Ok(LifecycleStep::Pending),
            2 => Ok(LifecycleStep::FirstCall),
            4 => Ok(LifecycleStep::ToPay),
            6 => Ok(LifecycleStep::Cleared),
            8 => Ok(LifecycleStep::Receipt),
            10 => Ok(LifecycleStep::Closed),
            12 => Ok(LifecycleStep::Abandoned),
            14 => Ok(LifecycleStep::Lapsed),
            -1 => Ok(LifecycleStep::Done),
            other => Err(EngineError::UnknownStepCode {
                axis: "step",
                code: other,
            }),
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStep::Pending => write!(f, "PENDING"),
            LifecycleStep::FirstCall => write!(f, "FIRST_CALL"),
            LifecycleStep::ToPay => write!(f, "TO_PAY"),
            LifecycleStep::Cleared => write!(f, "CLEARED"),
            LifecycleStep::Receipt => write!(f, "RECEIPT"),
            LifecycleStep::Closed => write!(f, "CLOSED"),
            LifecycleStep::Abandoned => write!(f, "ABANDONED"),
            LifecycleStep::Lapsed => write!(f, "LAPSED"),
            LifecycleStep::Done => write!(f, "DONE"),
        }
    }
}

/// The billing sub-state of a renewal task, independent of the lifecycle.
///
/// Only meaningful once the task has reached [`LifecycleStep::ToPay`];
/// this is a documented convention, not an enforced invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStep {
    /// Nothing to bill yet.
    None,
    /// Eligible for invoicing.
    ToInvoice,
    /// Invoice created in the external system.
    Invoiced,
    /// Invoice settled by the client.
    Paid,
}

impl InvoiceStep {
    /// Returns the legacy numeric code used by the persistence layer.
    pub fn code(self) -> i16 {
        match self {
            InvoiceStep::None => 0,
            InvoiceStep::ToInvoice => 1,
            InvoiceStep::Invoiced => 2,
            InvoiceStep::Paid => 3,
        }
    }

    /// Maps a legacy numeric code back to an invoice step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownStepCode`] for an unknown code.
    pub fn from_code(code: i16) -> EngineResult<Self> {
        match code {
            0 => Ok(InvoiceStep::None),
            1 => Ok(InvoiceStep::ToInvoice),
            2 => Ok(InvoiceStep::Invoiced),
            3 => Ok(InvoiceStep::Paid),
            other => Err(EngineError::UnknownStepCode {
                axis: "invoice_step",
                code: other,
            }),
        }
    }
}

impl fmt::Display for InvoiceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStep::None => write!(f, "NONE"),
            InvoiceStep::ToInvoice => write!(f, "TO_INVOICE"),
            InvoiceStep::Invoiced => write!(f, "INVOICED"),
            InvoiceStep::Paid => write!(f, "PAID"),
        }
    }
}

/// One renewal obligation tied to a matter and an annuity year.
///
/// Created by the rule-generation process (external to this crate) and
/// mutated exclusively through the workflow engine's transition operations;
/// never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalTask {
    /// Unique identifier for the task.
    pub id: String,
    /// The matter (case) this renewal belongs to.
    pub matter_id: String,
    /// The owning event on the matter that generated this task.
    pub event_id: String,
    /// The annuity year ("qt") this task covers.
    pub detail: u32,
    /// The official due date of the renewal fee.
    pub due_date: NaiveDate,
    /// Whether the fee has been paid.
    pub done: bool,
    /// The date the fee was paid, when `done` is true.
    pub done_date: Option<NaiveDate>,
    /// The lifecycle state.
    pub step: LifecycleStep,
    /// Whether the task is inside the post-due-date grace window.
    pub grace_period: bool,
    /// The billing sub-state, tracked independently of `step`.
    pub invoice_step: InvoiceStep,
    /// The official cost component (government fee), computed and mutable.
    pub cost: Decimal,
    /// The service fee component, computed and mutable.
    pub fee: Decimal,
    /// Discount: values above 1 are an absolute fee override, values at or
    /// below 1 a fractional reduction.
    pub discount: Decimal,
    /// Whether the client qualifies for the SME-reduced official rate.
    pub sme_status: bool,
    /// Whether a fee-schedule entry exists for this task's key.
    pub table_fee: bool,
}
