use chrono::NaiveDate;

use crate::model::leave::{BusinessType, LeaveKind, LeaveMode, SickType, SpecialType};

/// Strictly before today, date only. Same day is not retroactive.
pub fn is_retroactive(start_date: NaiveDate, today: NaiveDate) -> bool {
    start_date < today
}

pub fn is_sick_in_day(kind: LeaveKind) -> bool {
    kind == LeaveKind::Sick(SickType::InDay)
}

pub fn is_business_normal(kind: LeaveKind) -> bool {
    kind == LeaveKind::Business(BusinessType::Normal)
}

pub fn is_business_emergency(kind: LeaveKind) -> bool {
    kind == LeaveKind::Business(BusinessType::Emergency)
}

pub fn is_maternity(kind: LeaveKind) -> bool {
    kind == LeaveKind::Special(SpecialType::Maternity)
}

pub fn is_military_service(kind: LeaveKind) -> bool {
    kind == LeaveKind::Special(SpecialType::MilitaryService)
}

pub fn is_sterilization(kind: LeaveKind) -> bool {
    kind == LeaveKind::Special(SpecialType::Sterilization)
}

/// In-day sick leave cannot be all-day. Picking the subtype forces timed
/// mode; picking a mode never touches the subtype.
pub fn coerce_mode(kind: Option<LeaveKind>, requested: LeaveMode) -> LeaveMode {
    match kind {
        Some(kind) if is_sick_in_day(kind) => LeaveMode::Timed,
        _ => requested,
    }
}

/// Facts derived from a draft, computed once per validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeaveFlags {
    pub sick_in_day: bool,
    pub business_normal: bool,
    pub business_emergency: bool,
    pub maternity: bool,
    pub military_service: bool,
    pub sterilization: bool,
    pub retroactive: bool,
}

impl LeaveFlags {
    pub fn derive(kind: Option<LeaveKind>, start_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        let retroactive = start_date.is_some_and(|start| is_retroactive(start, today));
        match kind {
            Some(kind) => Self {
                sick_in_day: is_sick_in_day(kind),
                business_normal: is_business_normal(kind),
                business_emergency: is_business_emergency(kind),
                maternity: is_maternity(kind),
                military_service: is_military_service(kind),
                sterilization: is_sterilization(kind),
                retroactive,
            },
            None => Self {
                retroactive,
                ..Self::default()
            },
        }
    }
}
