use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::leave::{LeaveCategory, LeaveKind, SpecialType};
use crate::model::leave_request::UsageRecord;

/// Annual ceiling for one ledger key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    FixedDays(u32),
    Unlimited,
}

/// What usage is pooled under. Special leave subtypes each have their own
/// ceiling and are never pooled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LedgerKey {
    Category(LeaveCategory),
    Special(SpecialType),
}

impl LedgerKey {
    pub fn for_kind(kind: LeaveKind) -> Self {
        match kind {
            LeaveKind::Special(special) => LedgerKey::Special(special),
            other => LedgerKey::Category(other.category()),
        }
    }

    /// Every key a user can be charged under, in display order.
    pub fn all() -> Vec<LedgerKey> {
        let mut keys: Vec<LedgerKey> = LeaveCategory::iter()
            .filter(|c| *c != LeaveCategory::Special)
            .map(LedgerKey::Category)
            .collect();
        keys.extend(SpecialType::iter().map(LedgerKey::Special));
        keys
    }

    pub fn entitlement(&self) -> Entitlement {
        match self {
            LedgerKey::Category(LeaveCategory::Business) => Entitlement::FixedDays(5),
            LedgerKey::Category(LeaveCategory::Sick) => Entitlement::FixedDays(30),
            LedgerKey::Category(LeaveCategory::Vacation) => Entitlement::FixedDays(6),
            LedgerKey::Category(LeaveCategory::Special) => Entitlement::Unlimited,
            LedgerKey::Special(SpecialType::Maternity) => Entitlement::FixedDays(120),
            LedgerKey::Special(SpecialType::MilitaryService) => Entitlement::FixedDays(60),
            LedgerKey::Special(SpecialType::Sterilization) => Entitlement::Unlimited,
            LedgerKey::Special(SpecialType::Other) => Entitlement::Unlimited,
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKey::Category(category) => write!(f, "{category}"),
            LedgerKey::Special(special) => write!(f, "special.{special}"),
        }
    }
}

impl Serialize for LedgerKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Workdays used per key in one calendar year.
///
/// A projection of the record set: rebuild it when the records or the year
/// change, never patch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementLedger {
    year: i32,
    used: HashMap<LedgerKey, u32>,
    usage_known: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntitlementBalance {
    #[schema(value_type = String, example = "vacation")]
    pub key: LedgerKey,
    #[schema(example = 3)]
    pub used: u32,
    /// `null` when the category has no annual ceiling.
    #[schema(example = 6)]
    pub cap: Option<u32>,
    #[schema(example = 3)]
    pub remaining: Option<u32>,
}

impl EntitlementLedger {
    pub fn build<'a>(year: i32, records: impl IntoIterator<Item = &'a UsageRecord>) -> Self {
        let mut used: HashMap<LedgerKey, u32> = HashMap::new();
        for record in records {
            if record.year() != year || !record.status.counts_against_cap() {
                continue;
            }
            let slot = used.entry(LedgerKey::for_kind(record.kind)).or_default();
            *slot = slot.saturating_add(record.workday_count);
        }

        Self {
            year,
            used,
            usage_known: true,
        }
    }

    /// Zero usage, flagged as unreliable. Used when history could not be read.
    pub fn unknown(year: i32) -> Self {
        Self {
            year,
            used: HashMap::new(),
            usage_known: false,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn usage_known(&self) -> bool {
        self.usage_known
    }

    pub fn used(&self, key: LedgerKey) -> u32 {
        self.used.get(&key).copied().unwrap_or(0)
    }

    /// `None` means no ceiling.
    pub fn remaining(&self, key: LedgerKey) -> Option<u32> {
        match key.entitlement() {
            Entitlement::FixedDays(cap) => Some(cap.saturating_sub(self.used(key))),
            Entitlement::Unlimited => None,
        }
    }

    pub fn balance(&self, key: LedgerKey) -> EntitlementBalance {
        let cap = match key.entitlement() {
            Entitlement::FixedDays(cap) => Some(cap),
            Entitlement::Unlimited => None,
        };
        EntitlementBalance {
            key,
            used: self.used(key),
            cap,
            remaining: self.remaining(key),
        }
    }

    pub fn snapshot(&self) -> Vec<EntitlementBalance> {
        LedgerKey::all().into_iter().map(|key| self.balance(key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::{BusinessType, VacationType};
    use crate::model::leave_request::LeaveStatus;
    use chrono::NaiveDate;

    fn record(kind: LeaveKind, y: i32, m: u32, d: u32, days: u32, status: LeaveStatus) -> UsageRecord {
        UsageRecord {
            kind,
            start_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            workday_count: days,
            status,
        }
    }

    const VACATION: LeaveKind = LeaveKind::Vacation(VacationType::Standard);

    #[test]
    fn sums_counted_statuses_in_target_year() {
        let records = vec![
            record(VACATION, 2024, 2, 1, 2, LeaveStatus::Approved),
            record(VACATION, 2024, 5, 1, 1, LeaveStatus::Pending),
            record(VACATION, 2024, 6, 1, 3, LeaveStatus::Rejected),
            record(VACATION, 2024, 7, 1, 3, LeaveStatus::Canceled),
            record(VACATION, 2023, 12, 30, 4, LeaveStatus::Approved),
        ];
        let ledger = EntitlementLedger::build(2024, &records);
        let key = LedgerKey::Category(LeaveCategory::Vacation);
        assert_eq!(ledger.used(key), 3);
        assert_eq!(ledger.remaining(key), Some(3));
        assert!(ledger.usage_known());
    }

    #[test]
    fn business_subtypes_pool_but_special_subtypes_do_not() {
        let records = vec![
            record(LeaveKind::Business(BusinessType::Normal), 2024, 1, 2, 2, LeaveStatus::Approved),
            record(LeaveKind::Business(BusinessType::Emergency), 2024, 1, 3, 1, LeaveStatus::Approved),
            record(LeaveKind::Special(SpecialType::Maternity), 2024, 3, 1, 40, LeaveStatus::Approved),
            record(LeaveKind::Special(SpecialType::MilitaryService), 2024, 4, 1, 10, LeaveStatus::Approved),
        ];
        let ledger = EntitlementLedger::build(2024, &records);
        assert_eq!(ledger.used(LedgerKey::Category(LeaveCategory::Business)), 3);
        assert_eq!(ledger.remaining(LedgerKey::Special(SpecialType::Maternity)), Some(80));
        assert_eq!(ledger.remaining(LedgerKey::Special(SpecialType::MilitaryService)), Some(50));
    }

    #[test]
    fn remaining_is_floored_and_non_increasing() {
        let key = LedgerKey::Category(LeaveCategory::Business);
        let mut previous = u32::MAX;
        for used in 0..10 {
            let records = vec![record(
                LeaveKind::Business(BusinessType::Normal),
                2024,
                1,
                2,
                used,
                LeaveStatus::Approved,
            )];
            let remaining = EntitlementLedger::build(2024, &records).remaining(key).unwrap();
            assert_eq!(remaining, 5u32.saturating_sub(used));
            assert!(remaining <= previous);
            previous = remaining;
        }
    }

    #[test]
    fn unlimited_keys_track_usage_without_ceiling() {
        let records = vec![record(
            LeaveKind::Special(SpecialType::Sterilization),
            2024,
            8,
            1,
            9,
            LeaveStatus::Approved,
        )];
        let ledger = EntitlementLedger::build(2024, &records);
        let balance = ledger.balance(LedgerKey::Special(SpecialType::Sterilization));
        assert_eq!(balance.used, 9);
        assert_eq!(balance.cap, None);
        assert_eq!(balance.remaining, None);
    }

    #[test]
    fn unknown_ledger_reports_zero_usage_and_flag() {
        let ledger = EntitlementLedger::unknown(2024);
        assert!(!ledger.usage_known());
        assert_eq!(ledger.remaining(LedgerKey::Category(LeaveCategory::Sick)), Some(30));
    }

    #[test]
    fn snapshot_lists_every_key_once() {
        let snapshot = EntitlementLedger::build(2024, Vec::<UsageRecord>::new().iter()).snapshot();
        assert_eq!(snapshot.len(), 7);
        let json = serde_json::to_value(&snapshot[0]).unwrap();
        assert_eq!(json["key"], "business");
        assert_eq!(snapshot.last().unwrap().key.to_string(), "special.other");
        assert!(snapshot.iter().all(|b| b.used == 0));
    }
}
