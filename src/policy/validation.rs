use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::model::leave::{LeaveCategory, LeaveDraft, LeaveMode, LeaveSelection};
use crate::policy::classifier::{self, LeaveFlags};
use crate::policy::document::{DocumentMode, DocumentRequirement, DocumentRequirementResolver};
use crate::policy::{EntitlementLedger, LeavePolicy, LedgerKey, WorkdayCalendar};

/// Form field an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorField {
    Category,
    SubType,
    StartDate,
    EndDate,
    Reason,
    RetroReason,
    Files,
    OverLimit(LedgerKey),
}

impl fmt::Display for ErrorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorField::Category => f.write_str("category"),
            ErrorField::SubType => f.write_str("subType"),
            ErrorField::StartDate => f.write_str("startDate"),
            ErrorField::EndDate => f.write_str("endDate"),
            ErrorField::Reason => f.write_str("reason"),
            ErrorField::RetroReason => f.write_str("retroReason"),
            ErrorField::Files => f.write_str("files"),
            ErrorField::OverLimit(key) => write!(f, "overLimit.{key}"),
        }
    }
}

impl Serialize for ErrorField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field name to message. Submission is allowed only when empty.
///
/// The first message recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorMap(BTreeMap<ErrorField, String>);

impl ValidationErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: ErrorField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Adds `other`'s entries for fields not already reported.
    pub fn merge(&mut self, other: ValidationErrorMap) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: ErrorField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn get(&self, field: ErrorField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = ErrorField> + '_ {
        self.0.keys().copied()
    }
}

/// Calendar extent of a draft and the workdays it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkdaySpan {
    #[schema(value_type = String, format = "date", example = "2024-01-10")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2024-01-12")]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub workday_count: u32,
}

impl WorkdaySpan {
    pub fn of(draft: &LeaveDraft, calendar: &WorkdayCalendar) -> Option<Self> {
        let start_date = draft.start_date()?;
        let end_date = draft.end_date()?;
        Some(Self {
            start_date,
            end_date,
            workday_count: calendar.count_workdays_inclusive(start_date, end_date),
        })
    }
}

/// Everything the form needs after one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Assessment {
    #[schema(value_type = Object, example = json!({"startDate": "Business leave needs 3 workdays of notice"}))]
    pub errors: ValidationErrorMap,
    pub mode: LeaveMode,
    #[schema(nullable = true)]
    pub span: Option<WorkdaySpan>,
    pub retroactive: bool,
    pub document: DocumentRequirement,
    /// False when leave history could not be loaded and ceilings were
    /// checked against zero usage.
    pub usage_known: bool,
}

impl Assessment {
    pub fn workday_count(&self) -> u32 {
        self.span.map(|s| s.workday_count).unwrap_or(0)
    }

    pub fn can_submit(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ValidationEngine<'a> {
    policy: &'a LeavePolicy,
    calendar: WorkdayCalendar,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(policy: &'a LeavePolicy) -> Self {
        Self {
            policy,
            calendar: policy.calendar(),
        }
    }

    /// Derives span, retroactive flag and document requirement, then runs
    /// every rule against them.
    pub fn assess(&self, draft: &LeaveDraft, now: NaiveDateTime, ledger: &EntitlementLedger) -> Assessment {
        let today = now.date();
        let kind = draft.kind();
        let mode = classifier::coerce_mode(kind, draft.mode);
        let span = WorkdaySpan::of(draft, &self.calendar);
        let flags = LeaveFlags::derive(kind, draft.start_date(), today);

        let document = match (kind, span) {
            (Some(kind), Some(span)) => DocumentRequirementResolver::new(self.policy).resolve(
                kind,
                span.workday_count,
                flags.retroactive,
                span.start_date,
            ),
            _ => DocumentRequirement::none(),
        };

        let errors = self.validate(draft, span.as_ref(), &document, ledger, now);
        if !errors.is_empty() {
            tracing::debug!(
                fields = ?errors.fields().map(|f| f.to_string()).collect::<Vec<_>>(),
                "Leave draft failed validation"
            );
        }

        Assessment {
            errors,
            mode,
            span,
            retroactive: flags.retroactive,
            document,
            usage_known: ledger.usage_known(),
        }
    }

    /// Runs all rules; none short-circuits, so every problem is reported.
    pub fn validate(
        &self,
        draft: &LeaveDraft,
        span: Option<&WorkdaySpan>,
        document: &DocumentRequirement,
        ledger: &EntitlementLedger,
        now: NaiveDateTime,
    ) -> ValidationErrorMap {
        let today = now.date();
        let kind = draft.kind();
        let flags = LeaveFlags::derive(kind, draft.start_date(), today);
        let mut errors = ValidationErrorMap::new();

        self.check_selection(draft, &mut errors);
        self.check_bounds(draft, &mut errors);
        if flags.sick_in_day {
            self.check_in_day_window(draft, &mut errors);
        }
        if draft.reason.trim().is_empty() {
            errors.add(ErrorField::Reason, "Please give a reason for the leave");
        }
        if flags.retroactive {
            self.check_retroactive(draft, draft.selection.category(), &mut errors);
        }
        if let Some(start) = draft.start_date() {
            self.check_notice(start, today, &flags, &mut errors);
        }
        self.check_attachments(draft, &mut errors);
        if document.mode == DocumentMode::MustAtSubmit && draft.attachments.is_empty() {
            errors.add(
                ErrorField::Files,
                "A medical certificate must be attached for past sick leave of 3 or more workdays",
            );
        }
        if let (Some(kind), Some(span)) = (kind, span) {
            let key = LedgerKey::for_kind(kind);
            if let Some(remaining) = ledger.remaining(key) {
                if span.workday_count > remaining {
                    errors.add(
                        ErrorField::OverLimit(key),
                        format!(
                            "{} leave over limit: remaining {}, requested {}",
                            key, remaining, span.workday_count
                        ),
                    );
                }
            }
        }

        errors
    }

    fn check_selection(&self, draft: &LeaveDraft, errors: &mut ValidationErrorMap) {
        match draft.selection {
            LeaveSelection::Nothing => {
                errors.add(ErrorField::Category, "Please select a leave category");
                errors.add(ErrorField::SubType, "Please select a leave type");
            }
            LeaveSelection::CategoryOnly(_) => {
                errors.add(ErrorField::SubType, "Please select a leave type");
            }
            LeaveSelection::Complete(_) => {}
        }
    }

    fn check_bounds(&self, draft: &LeaveDraft, errors: &mut ValidationErrorMap) {
        let (start, end) = match (draft.start_at, draft.end_at) {
            (Some(start), Some(end)) => (start, end),
            (start, end) => {
                if start.is_none() {
                    errors.add(ErrorField::StartDate, "Please pick a start date");
                }
                if end.is_none() {
                    errors.add(ErrorField::EndDate, "Please pick an end date");
                }
                return;
            }
        };

        let reversed = match classifier::coerce_mode(draft.kind(), draft.mode) {
            LeaveMode::Timed => end < start,
            LeaveMode::AllDay => end.date() < start.date(),
        };
        if reversed {
            errors.add(ErrorField::EndDate, "End must not be before start");
        }
    }

    fn check_in_day_window(&self, draft: &LeaveDraft, errors: &mut ValidationErrorMap) {
        let (Some(start), Some(end)) = (draft.start_at, draft.end_at) else {
            return;
        };

        if !self.calendar.is_workday(start.date()) {
            errors.add(
                ErrorField::StartDate,
                format!("In-day sick leave cannot fall on a {}", self.policy.rest_day),
            );
        }

        let same_day = start.date() == end.date();
        let in_hours = self.policy.within_business_hours(start.time())
            && self.policy.within_business_hours(end.time());
        if !same_day || !in_hours {
            errors.add(
                ErrorField::EndDate,
                format!(
                    "In-day sick leave must start and end on the same day between {} and {}",
                    self.policy.business_open.format("%H:%M"),
                    self.policy.business_close.format("%H:%M"),
                ),
            );
        }
    }

    fn check_retroactive(
        &self,
        draft: &LeaveDraft,
        category: Option<LeaveCategory>,
        errors: &mut ValidationErrorMap,
    ) {
        let justified = !draft.retro_reason.trim().is_empty();
        match category {
            Some(LeaveCategory::Sick) if !justified => {
                errors.add(ErrorField::RetroReason, "Explain why this sick leave is filed late");
            }
            Some(LeaveCategory::Business) if !justified && draft.attachments.is_empty() => {
                errors.add(
                    ErrorField::RetroReason,
                    "Explain why this business leave is filed late or attach a supporting file",
                );
            }
            _ => {}
        }
    }

    fn check_notice(
        &self,
        start: NaiveDate,
        today: NaiveDate,
        flags: &LeaveFlags,
        errors: &mut ValidationErrorMap,
    ) {
        if flags.retroactive {
            return;
        }

        if flags.business_normal && !flags.business_emergency {
            let notice = self.policy.advance_notice_workdays;
            let earliest = self.calendar.forward_workday_from_tomorrow(today, notice);
            if start < earliest {
                errors.add(
                    ErrorField::StartDate,
                    format!(
                        "Business leave needs {} workdays of notice; earliest start is {}",
                        notice, earliest
                    ),
                );
            }
        }

        if flags.sterilization {
            let earliest = WorkdayCalendar::add_days(today, self.policy.sterilization_notice_days);
            if start < earliest {
                errors.add(
                    ErrorField::StartDate,
                    format!("Sterilization leave must start on or after {}", earliest),
                );
            }
        }
    }

    fn check_attachments(&self, draft: &LeaveDraft, errors: &mut ValidationErrorMap) {
        if draft.attachments.len() > self.policy.max_attachments {
            errors.add(
                ErrorField::Files,
                format!("At most {} files can be attached", self.policy.max_attachments),
            );
        }

        for file in &draft.attachments {
            if file.size_bytes > self.policy.max_attachment_bytes {
                errors.add(
                    ErrorField::Files,
                    format!(
                        "{} is larger than {} MB",
                        file.file_name,
                        self.policy.max_attachment_bytes / (1024 * 1024)
                    ),
                );
            }
            if !LeavePolicy::is_allowed_attachment_type(&file.content_type) {
                errors.add(
                    ErrorField::Files,
                    format!("{} must be a PDF, JPEG, PNG or WEBP file", file.file_name),
                );
            }
        }
    }
}
