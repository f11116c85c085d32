//! Notice escalation stages.
//!
//! Client notifications escalate through three stages: the initial notice,
//! a reminder, and a final notice that coincides with the renewal entering
//! its grace period.

use crate::config::NoticeSettings;

/// One escalation stage of a client notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStage {
    /// Initial notice.
    First,
    /// Reminder notice; the subject carries the REMINDER marker.
    Warn,
    /// Final notice; the renewal enters its grace period.
    Last,
}

impl NoticeStage {
    /// Returns the stage label used in logs and message bodies.
    pub fn label(self) -> &'static str {
        match self {
            NoticeStage::First => "first",
            NoticeStage::Warn => "warn",
            NoticeStage::Last => "last",
        }
    }

    /// Days before the due date the notice remains actionable; the final
    /// notice uses the shorter offset.
    pub fn validity_offset_days(self, notices: &NoticeSettings) -> i64 {
        match self {
            NoticeStage::Last => notices.last_offset_days,
            _ => notices.first_offset_days,
        }
    }

    /// Whether the notice carries an instruction deadline. The final
    /// notice does not: instructions are no longer awaited.
    pub fn has_instruction_deadline(self) -> bool {
        !matches!(self, NoticeStage::Last)
    }

    /// Whether sending this stage moves the renewal into grace.
    pub fn enters_grace(self) -> bool {
        matches!(self, NoticeStage::Last)
    }

    /// Whether the subject line carries the REMINDER marker.
    pub fn is_reminder(self) -> bool {
        matches!(self, NoticeStage::Warn)
    }
}
