use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

use crate::model::leave::{LeaveKind, LeaveKindError};

/// Canonical request status. Stored values are parsed once here; nothing
/// downstream compares raw status strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, AsRefStr,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    #[strum(to_string = "pending", serialize = "รออนุมัติ")]
    Pending,
    #[strum(to_string = "approved", serialize = "อนุมัติ")]
    Approved,
    #[strum(to_string = "rejected", serialize = "ไม่อนุมัติ")]
    Rejected,
    #[strum(to_string = "canceled", serialize = "cancelled", serialize = "ยกเลิก")]
    Canceled,
}

impl LeaveStatus {
    /// Rejected and canceled requests give their days back; everything else,
    /// pending included, is charged against the entitlement.
    pub fn counts_against_cap(&self) -> bool {
        !matches!(self, LeaveStatus::Rejected | LeaveStatus::Canceled)
    }
}

/// A stored leave request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRow {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "sick")]
    pub category: String,
    #[schema(example = "general")]
    pub sub_type: String,
    #[schema(example = "all_day")]
    pub mode: String,
    #[schema(example = "2026-01-05T00:00:00", format = "date-time", value_type = String)]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-01-07T00:00:00", format = "date-time", value_type = String)]
    pub end_at: NaiveDateTime,
    #[schema(example = 3)]
    pub workday_count: u32,
    #[schema(example = "Fever")]
    pub reason: String,
    #[schema(nullable = true)]
    pub retro_reason: Option<String>,
    pub is_retroactive: bool,
    #[schema(example = "DUE_BY_WORKDAY_3")]
    pub document_mode: String,
    #[schema(example = "2026-01-07T23:59:59.999", format = "date-time", value_type = Option<String>)]
    pub document_due_at: Option<NaiveDateTime>,
    #[schema(example = 0)]
    pub attachment_count: u32,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The slice of a stored request the entitlement ledger needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub workday_count: u32,
    pub status: LeaveStatus,
}

impl UsageRecord {
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Row shape fetched for usage aggregation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsageRow {
    pub category: String,
    pub sub_type: String,
    pub start_at: NaiveDateTime,
    pub workday_count: u32,
    pub status: String,
}

impl TryFrom<UsageRow> for UsageRecord {
    type Error = LeaveKindError;

    fn try_from(row: UsageRow) -> Result<Self, Self::Error> {
        let kind = LeaveKind::parse(&row.category, &row.sub_type)?;
        // Unknown statuses stay chargeable: only an explicit rejection or
        // cancellation releases days.
        let status = row.status.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(status = %row.status, "Unrecognised leave status, counting as pending");
            LeaveStatus::Pending
        });

        Ok(UsageRecord {
            kind,
            start_date: row.start_at.date(),
            workday_count: row.workday_count,
            status,
        })
    }
}
