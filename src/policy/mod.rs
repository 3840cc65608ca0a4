//! Leave policy engine: workday calendar, request classification, medical
//! certificate deadlines, annual entitlement accounting and the submission
//! validator. Everything in here is synchronous and side-effect free.

pub mod calendar;
pub mod classifier;
pub mod document;
pub mod ledger;
pub mod validation;

use chrono::{NaiveTime, Weekday};

pub use calendar::WorkdayCalendar;
pub use ledger::{EntitlementLedger, LedgerKey};
pub use validation::{Assessment, ErrorField, ValidationEngine, ValidationErrorMap};

pub const ALLOWED_ATTACHMENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/png", "image/webp"];

/// Tunable policy constants.
#[derive(Debug, Clone)]
pub struct LeavePolicy {
    pub rest_day: Weekday,
    pub business_open: NaiveTime,
    pub business_close: NaiveTime,
    /// Workdays of notice for a normal business leave, counted from tomorrow.
    pub advance_notice_workdays: u32,
    /// Calendar days of notice for sterilization leave.
    pub sterilization_notice_days: u64,
    /// Sick spans of this many workdays or more need a medical certificate.
    pub certificate_threshold_workdays: u32,
    pub max_attachments: usize,
    pub max_attachment_bytes: u64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            rest_day: Weekday::Sun,
            business_open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            business_close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            advance_notice_workdays: 3,
            sterilization_notice_days: 1,
            certificate_threshold_workdays: 3,
            max_attachments: 5,
            max_attachment_bytes: 10 * 1024 * 1024,
        }
    }
}

impl LeavePolicy {
    pub fn calendar(&self) -> WorkdayCalendar {
        WorkdayCalendar::new(self.rest_day)
    }

    pub fn within_business_hours(&self, time: NaiveTime) -> bool {
        time >= self.business_open && time <= self.business_close
    }

    pub fn is_allowed_attachment_type(content_type: &str) -> bool {
        let content_type = content_type.trim();
        ALLOWED_ATTACHMENT_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}
