use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave::{LeaveCategory, LeaveKind};
use crate::policy::{LeavePolicy, WorkdayCalendar, classifier};

/// Whether and when a medical certificate has to be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentMode {
    #[default]
    None,
    /// Upload by the end of the third workday of the leave.
    #[serde(rename = "DUE_BY_WORKDAY_3")]
    DueByWorkday3,
    /// The leave days are already over; the file must come with the request.
    MustAtSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct DocumentRequirement {
    pub required: bool,
    pub mode: DocumentMode,
    #[schema(value_type = Option<String>, format = "date-time", example = "2024-01-12T23:59:59.999")]
    pub due_at: Option<NaiveDateTime>,
}

impl DocumentRequirement {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn due_by(due_at: NaiveDateTime) -> Self {
        Self {
            required: true,
            mode: DocumentMode::DueByWorkday3,
            due_at: Some(due_at),
        }
    }

    pub fn at_submit() -> Self {
        Self {
            required: true,
            mode: DocumentMode::MustAtSubmit,
            due_at: None,
        }
    }
}

pub struct DocumentRequirementResolver<'a> {
    policy: &'a LeavePolicy,
    calendar: WorkdayCalendar,
}

impl<'a> DocumentRequirementResolver<'a> {
    pub fn new(policy: &'a LeavePolicy) -> Self {
        Self {
            policy,
            calendar: policy.calendar(),
        }
    }

    /// Only sick leave other than in-day ever needs a certificate. Spans at
    /// the threshold need one; retroactive spans need it up front.
    pub fn resolve(
        &self,
        kind: LeaveKind,
        workday_count: u32,
        retroactive: bool,
        start_date: NaiveDate,
    ) -> DocumentRequirement {
        if kind.category() != LeaveCategory::Sick || classifier::is_sick_in_day(kind) {
            return DocumentRequirement::none();
        }

        let threshold = self.policy.certificate_threshold_workdays;
        if workday_count < threshold {
            return DocumentRequirement::none();
        }

        if retroactive {
            DocumentRequirement::at_submit()
        } else {
            DocumentRequirement::due_by(self.calendar.nth_workday_from(start_date, threshold))
        }
    }
}
