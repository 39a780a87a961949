use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::Role;

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}

// Belts

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Belt {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbBelt {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub rank_order: Option<i64>,
}

impl From<DbBelt> for Belt {
    fn from(belt: DbBelt) -> Self {
        Self {
            id: belt.id.unwrap_or_default(),
            name: belt.name.unwrap_or_default(),
            color: belt.color.unwrap_or_default(),
            order: belt.rank_order.unwrap_or_default(),
        }
    }
}

/// Fields of a belt that may change after creation. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BeltUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Belt ids are derived from their display name: "Junior Black 1" -> "junior-black-1".
pub fn slugify(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Position of `belt_id` along the progression, as a percentage of all belts.
pub fn belt_progress(belts: &[Belt], belt_id: &str) -> f64 {
    if belts.is_empty() {
        return 0.0;
    }
    let index = belts.iter().position(|b| b.id == belt_id);
    match index {
        Some(index) => ((index + 1) as f64 / belts.len() as f64) * 100.0,
        None => 0.0,
    }
}

// Contracts

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRenewal {
    Monthly,
    Quarterly,
    SixMonths,
    Yearly,
}

impl ContractRenewal {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(ContractRenewal::Monthly),
            "quarterly" => Some(ContractRenewal::Quarterly),
            "six_months" => Some(ContractRenewal::SixMonths),
            "yearly" => Some(ContractRenewal::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractRenewal::Monthly => "monthly",
            ContractRenewal::Quarterly => "quarterly",
            ContractRenewal::SixMonths => "six_months",
            ContractRenewal::Yearly => "yearly",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            ContractRenewal::Monthly => 1,
            ContractRenewal::Quarterly => 3,
            ContractRenewal::SixMonths => 6,
            ContractRenewal::Yearly => 12,
        }
    }

    /// First renewal date on or after `today` for a contract started on `start`.
    ///
    /// Month arithmetic clamps to the end of shorter months (Jan 31 + 1 month is
    /// the last day of February).
    pub fn next_renewal(&self, start: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
        let step = self.months();
        let mut periods = 1u32;
        loop {
            let candidate = start.checked_add_months(Months::new(step.checked_mul(periods)?))?;
            if candidate >= today {
                return Some(candidate);
            }
            periods = periods.checked_add(1)?;
        }
    }
}

impl fmt::Display for ContractRenewal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpcomingRenewal {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub contract_renewal: ContractRenewal,
    pub renewal_date: NaiveDate,
    pub days_until: i64,
}

// Users

/// Everything needed to insert a user row. The password is hashed on insert;
/// `None` leaves the account unable to log in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub current_belt_id: String,
    pub password: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<ContractRenewal>,
    pub sensei_notes: Option<String>,
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

impl NewUser {
    pub fn student(name: &str, email: &str, belt_id: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Student,
            current_belt_id: belt_id.to_string(),
            password: None,
            start_date: None,
            contract_start_date: None,
            contract_renewal: None,
            sensei_notes: None,
            address: None,
            signed_contract: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<ContractRenewal>,
    pub sensei_notes: Option<String>,
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

// Classes

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" => Some(DayOfWeek::Monday),
            "tuesday" => Some(DayOfWeek::Tuesday),
            "wednesday" => Some(DayOfWeek::Wednesday),
            "thursday" => Some(DayOfWeek::Thursday),
            "friday" => Some(DayOfWeek::Friday),
            "saturday" => Some(DayOfWeek::Saturday),
            "sunday" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

/// Class start times are stored as `HH:MM`.
pub fn parse_class_time(time: &str) -> Option<String> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClassStudent {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DojoClass {
    pub id: i64,
    pub name: String,
    pub day: DayOfWeek,
    pub time: String,
    pub duration: i64,
    pub students: Vec<ClassStudent>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbDojoClass {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i64>,
}

impl From<DbDojoClass> for DojoClass {
    fn from(class: DbDojoClass) -> Self {
        Self {
            id: class.id.unwrap_or_default(),
            name: class.name.unwrap_or_default(),
            day: class
                .day
                .as_deref()
                .and_then(DayOfWeek::parse)
                .unwrap_or(DayOfWeek::Monday),
            time: class.time.unwrap_or_default(),
            duration: class.duration.unwrap_or(60),
            students: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbClassStudent {
    pub class_id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: Option<String>,
}

// Attendance

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    pub checked_in_at: DateTime<Utc>,
    pub check_in_day: NaiveDate,
    pub notes: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAttendance {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub checked_in_at: Option<NaiveDateTime>,
    pub check_in_day: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl From<DbAttendance> for Attendance {
    fn from(row: DbAttendance) -> Self {
        let checked_in_at = row.checked_in_at.map(to_utc).unwrap_or_else(Utc::now);
        Self {
            id: row.id.unwrap_or_default(),
            user_id: row.user_id.unwrap_or_default(),
            checked_in_at,
            check_in_day: row
                .check_in_day
                .unwrap_or_else(|| checked_in_at.date_naive()),
            notes: row.notes,
        }
    }
}

/// A check-in joined with the name of the person who checked in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendanceEntry {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub checked_in_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAttendanceEntry {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub checked_in_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl From<DbAttendanceEntry> for AttendanceEntry {
    fn from(row: DbAttendanceEntry) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            user_id: row.user_id.unwrap_or_default(),
            user_name: row.user_name.unwrap_or_default(),
            checked_in_at: row.checked_in_at.map(to_utc).unwrap_or_else(Utc::now),
            notes: row.notes,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CheckInOutcome {
    CheckedIn(Attendance),
    AlreadyCheckedIn,
}

// Events

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbEvent {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl From<DbEvent> for Event {
    fn from(event: DbEvent) -> Self {
        Self {
            id: event.id.unwrap_or_default(),
            title: event.title.unwrap_or_default(),
            date: event.date.unwrap_or_else(|| Utc::now().date_naive()),
            description: event.description.unwrap_or_default(),
        }
    }
}

// Videos

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub belt_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("10th Kyu"), "10th-kyu");
        assert_eq!(slugify("  Junior  Black\tBelt 1 "), "junior-black-belt-1");
        assert_eq!(slugify("Shodan"), "shodan");
    }

    #[test]
    fn renewal_steps_by_contract_length() {
        let start = date(2024, 1, 15);
        let today = date(2024, 1, 20);
        assert_eq!(
            ContractRenewal::Monthly.next_renewal(start, today),
            Some(date(2024, 2, 15))
        );
        assert_eq!(
            ContractRenewal::Quarterly.next_renewal(start, today),
            Some(date(2024, 4, 15))
        );
        assert_eq!(
            ContractRenewal::SixMonths.next_renewal(start, today),
            Some(date(2024, 7, 15))
        );
        assert_eq!(
            ContractRenewal::Yearly.next_renewal(start, today),
            Some(date(2025, 1, 15))
        );
    }

    #[test]
    fn renewal_rolls_forward_past_elapsed_periods() {
        let start = date(2024, 1, 15);
        let today = date(2024, 5, 1);
        assert_eq!(
            ContractRenewal::Monthly.next_renewal(start, today),
            Some(date(2024, 5, 15))
        );
        assert_eq!(
            ContractRenewal::Monthly.next_renewal(start, date(2024, 5, 15)),
            Some(date(2024, 5, 15))
        );
    }

    #[test]
    fn renewal_clamps_to_month_end() {
        assert_eq!(
            ContractRenewal::Monthly.next_renewal(date(2024, 1, 31), date(2024, 2, 1)),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn contract_renewal_uses_snake_case_names() {
        assert_eq!(
            serde_json::to_string(&ContractRenewal::SixMonths).unwrap(),
            "\"six_months\""
        );
        assert_eq!(
            ContractRenewal::parse("six_months"),
            Some(ContractRenewal::SixMonths)
        );
        assert_eq!(ContractRenewal::parse("weekly"), None);
    }

    #[test]
    fn class_time_is_normalized() {
        assert_eq!(parse_class_time("18:00"), Some("18:00".to_string()));
        assert_eq!(parse_class_time("7:05"), Some("07:05".to_string()));
        assert_eq!(parse_class_time("25:00"), None);
        assert_eq!(parse_class_time("evening"), None);
    }

    #[test]
    fn day_of_week_parses_case_insensitively() {
        assert_eq!(DayOfWeek::parse("saturday"), Some(DayOfWeek::Saturday));
        assert_eq!(DayOfWeek::parse("Monday"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::parse("Funday"), None);
        assert!(DayOfWeek::Monday < DayOfWeek::Sunday);
    }

    #[test]
    fn progress_counts_current_belt() {
        let belts: Vec<Belt> = (0..4)
            .map(|i| Belt {
                id: format!("b{}", i),
                name: format!("Belt {}", i),
                color: "#000000".to_string(),
                order: i,
            })
            .collect();
        assert_eq!(belt_progress(&belts, "b0"), 25.0);
        assert_eq!(belt_progress(&belts, "b3"), 100.0);
        assert_eq!(belt_progress(&belts, "missing"), 0.0);
    }
}
