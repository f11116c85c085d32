//! Client notification pipeline.
//!
//! Escalating renewal notices (first, reminder, final) grouped by client,
//! with localized descriptions and locale-formatted amounts, dispatched
//! through the [`Mailer`] seam.

mod mailer;
mod notice;
mod service;
mod stage;

pub use mailer::{Mailer, RecordingMailer, SmtpMailer};
pub use notice::{NoticeLine, RenewalNotice, build_description, build_subject, format_date};
pub use service::NotificationService;
pub use stage::NoticeStage;
