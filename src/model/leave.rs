use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    AsRefStr,
    EnumIter,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LeaveCategory {
    Business,
    Sick,
    Vacation,
    Special,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    EnumString, AsRefStr, IntoStaticStr, EnumIter, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BusinessType {
    Normal,
    Emergency,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    EnumString, AsRefStr, IntoStaticStr, EnumIter, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SickType {
    General,
    DoctorAppointment,
    CertificateRequired,
    /// Part-day sick leave, always timed.
    InDay,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    EnumString, AsRefStr, IntoStaticStr, EnumIter, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VacationType {
    Standard,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    EnumString, AsRefStr, IntoStaticStr, EnumIter, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpecialType {
    Maternity,
    MilitaryService,
    Sterilization,
    Other,
}

/// A category together with one of its own subtypes.
///
/// Built only through [`LeaveKind::parse`] or the variant constructors, so a
/// subtype can never be paired with a foreign category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "category", content = "sub_type", rename_all = "snake_case")]
pub enum LeaveKind {
    Business(BusinessType),
    Sick(SickType),
    Vacation(VacationType),
    Special(SpecialType),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LeaveKindError {
    #[display(fmt = "unknown leave category `{}`", _0)]
    UnknownCategory(String),
    #[display(fmt = "sub type `{}` does not belong to category `{}`", sub_type, category)]
    UnknownSubType {
        category: LeaveCategory,
        sub_type: String,
    },
}

impl std::error::Error for LeaveKindError {}

impl LeaveKind {
    pub fn parse(category: &str, sub_type: &str) -> Result<Self, LeaveKindError> {
        let category = LeaveCategory::from_str(category.trim())
            .map_err(|_| LeaveKindError::UnknownCategory(category.to_string()))?;
        Self::parse_sub_type(category, sub_type)
    }

    pub fn parse_sub_type(category: LeaveCategory, sub_type: &str) -> Result<Self, LeaveKindError> {
        let raw = sub_type.trim();
        let unknown = || LeaveKindError::UnknownSubType {
            category,
            sub_type: sub_type.to_string(),
        };

        let kind = match category {
            LeaveCategory::Business => LeaveKind::Business(raw.parse().map_err(|_| unknown())?),
            LeaveCategory::Sick => LeaveKind::Sick(raw.parse().map_err(|_| unknown())?),
            LeaveCategory::Vacation => LeaveKind::Vacation(raw.parse().map_err(|_| unknown())?),
            LeaveCategory::Special => LeaveKind::Special(raw.parse().map_err(|_| unknown())?),
        };
        Ok(kind)
    }

    pub fn category(&self) -> LeaveCategory {
        match self {
            LeaveKind::Business(_) => LeaveCategory::Business,
            LeaveKind::Sick(_) => LeaveCategory::Sick,
            LeaveKind::Vacation(_) => LeaveCategory::Vacation,
            LeaveKind::Special(_) => LeaveCategory::Special,
        }
    }

    pub fn sub_type(&self) -> &'static str {
        match self {
            LeaveKind::Business(t) => t.into(),
            LeaveKind::Sick(t) => t.into(),
            LeaveKind::Vacation(t) => t.into(),
            LeaveKind::Special(t) => t.into(),
        }
    }
}

/// How far the employee has got in picking a leave kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaveSelection {
    #[default]
    Nothing,
    CategoryOnly(LeaveCategory),
    Complete(LeaveKind),
}

impl LeaveSelection {
    /// Builds a selection from optional raw form values. Blank strings count
    /// as "not selected"; unknown values are an error, never a default.
    pub fn from_raw(category: Option<&str>, sub_type: Option<&str>) -> Result<Self, LeaveKindError> {
        let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => LeaveCategory::from_str(c)
                .map_err(|_| LeaveKindError::UnknownCategory(c.to_string()))?,
            None => return Ok(LeaveSelection::Nothing),
        };

        match sub_type.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => LeaveKind::parse_sub_type(category, s).map(LeaveSelection::Complete),
            None => Ok(LeaveSelection::CategoryOnly(category)),
        }
    }

    pub fn kind(&self) -> Option<LeaveKind> {
        match self {
            LeaveSelection::Complete(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<LeaveCategory> {
        match self {
            LeaveSelection::Nothing => None,
            LeaveSelection::CategoryOnly(category) => Some(*category),
            LeaveSelection::Complete(kind) => Some(kind.category()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema,
    EnumString, AsRefStr, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LeaveMode {
    #[default]
    AllDay,
    Timed,
}

/// Metadata of a file the storage service already accepted for this draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttachmentMeta {
    #[schema(example = "medical-certificate.pdf")]
    pub file_name: String,
    #[schema(example = 204800)]
    pub size_bytes: u64,
    #[schema(example = "application/pdf")]
    pub content_type: String,
}

/// The in-progress request as the form currently holds it.
///
/// All-day bounds are stored at midnight; timed bounds carry minutes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaveDraft {
    pub selection: LeaveSelection,
    pub mode: LeaveMode,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub reason: String,
    pub retro_reason: String,
    pub attachments: Vec<AttachmentMeta>,
}

impl LeaveDraft {
    pub fn kind(&self) -> Option<LeaveKind> {
        self.selection.kind()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_at.map(|dt| dt.date())
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_at.map(|dt| dt.date())
    }

    /// Sets all-day bounds from plain dates.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.mode = LeaveMode::AllDay;
        self.start_at = Some(start.and_time(NaiveTime::MIN));
        self.end_at = Some(end.and_time(NaiveTime::MIN));
        self
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_subtypes_of_their_own_category() {
        assert_eq!(
            LeaveKind::parse("sick", "in_day").unwrap(),
            LeaveKind::Sick(SickType::InDay)
        );
        assert_eq!(
            LeaveKind::parse("Special", "military_service").unwrap(),
            LeaveKind::Special(SpecialType::MilitaryService)
        );
    }

    #[test]
    fn parse_rejects_foreign_subtype() {
        let err = LeaveKind::parse("vacation", "maternity").unwrap_err();
        assert_eq!(
            err,
            LeaveKindError::UnknownSubType {
                category: LeaveCategory::Vacation,
                sub_type: "maternity".to_string(),
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_category() {
        assert!(matches!(
            LeaveKind::parse("sabbatical", "standard"),
            Err(LeaveKindError::UnknownCategory(_))
        ));
    }

    #[test]
    fn selection_tracks_form_progress() {
        assert_eq!(LeaveSelection::from_raw(None, None).unwrap(), LeaveSelection::Nothing);
        assert_eq!(
            LeaveSelection::from_raw(Some(" "), Some("normal")).unwrap(),
            LeaveSelection::Nothing
        );
        assert_eq!(
            LeaveSelection::from_raw(Some("business"), Some("")).unwrap(),
            LeaveSelection::CategoryOnly(LeaveCategory::Business)
        );
        assert_eq!(
            LeaveSelection::from_raw(Some("business"), Some("emergency")).unwrap(),
            LeaveSelection::Complete(LeaveKind::Business(BusinessType::Emergency))
        );
    }

    #[test]
    fn kind_reports_category_and_code() {
        let kind = LeaveKind::Special(SpecialType::Sterilization);
        assert_eq!(kind.category(), LeaveCategory::Special);
        assert_eq!(kind.sub_type(), "sterilization");
        assert_eq!(LeaveCategory::Vacation.to_string(), "vacation");
    }
}
