//! Daily attendance figures computed from already-loaded collections.
//!
//! Nothing here touches storage; callers load the roster and the clock-in
//! history through the record store and pass them in.

use chrono::NaiveTime;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::{attendance::ClockInEvent, employee::Employee};

/// How a clock-in time is compared with a reference time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LatenessRule {
    /// Plain string ordering. Only correct when both sides share one
    /// zero-padded width, which is what the stored data has always relied on.
    #[default]
    Lexical,
    /// Parse both sides as a time of day; unparsable values fall back to
    /// string ordering.
    Clock,
}

impl LatenessRule {
    pub fn is_late(self, time: &str, reference: &str) -> bool {
        match self {
            LatenessRule::Lexical => time > reference,
            LatenessRule::Clock => match (parse_time_of_day(time), parse_time_of_day(reference)) {
                (Some(t), Some(r)) => t > r,
                _ => time > reference,
            },
        }
    }
}

fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Late,
    OnTime,
}

impl AttendanceStatus {
    fn from_late(late: bool) -> Self {
        if late {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::OnTime
        }
    }

    /// Label used in the CSV report.
    pub fn report_label(self) -> &'static str {
        match self {
            AttendanceStatus::Late => "En retard",
            AttendanceStatus::OnTime => "À l'heure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyStats {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    /// `total - present`; negative when events belong to employees no longer
    /// on the roster.
    pub absent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterRow<'a> {
    pub event: &'a ClockInEvent,
    /// `None` when the event's employee is no longer on the roster.
    pub employee: Option<&'a Employee>,
    pub is_late: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportRow {
    pub employee_name: String,
    pub date: String,
    pub time: String,
    pub reference_time_snapshot: String,
    pub status: AttendanceStatus,
}

fn on_date<'a>(
    clock_ins: &'a [ClockInEvent],
    date: &'a str,
) -> impl Iterator<Item = &'a ClockInEvent> + 'a {
    clock_ins.iter().filter(move |c| c.date == date)
}

fn find_employee<'a>(employees: &'a [Employee], id: &str) -> Option<&'a Employee> {
    employees.iter().find(|e| e.id == id)
}

pub fn daily_stats(employees: &[Employee], clock_ins: &[ClockInEvent], date: &str) -> DailyStats {
    daily_stats_with(LatenessRule::Lexical, employees, clock_ins, date)
}

/// Lateness is judged against the employee's *current* reference time; events
/// whose employee left the roster are never counted late.
pub fn daily_stats_with(
    rule: LatenessRule,
    employees: &[Employee],
    clock_ins: &[ClockInEvent],
    date: &str,
) -> DailyStats {
    let mut present = 0usize;
    let mut late = 0usize;

    for event in on_date(clock_ins, date) {
        present += 1;
        if let Some(employee) = find_employee(employees, &event.employee_id) {
            if rule.is_late(&event.time, &employee.reference_time) {
                late += 1;
            }
        }
    }

    let total = employees.len();
    DailyStats {
        total,
        present,
        late,
        absent: total as i64 - present as i64,
    }
}

pub fn daily_roster<'a>(
    employees: &'a [Employee],
    clock_ins: &'a [ClockInEvent],
    date: &'a str,
) -> Vec<RosterRow<'a>> {
    daily_roster_with(LatenessRule::Lexical, employees, clock_ins, date)
}

/// Rows sorted by clock-in time; equal times keep their recorded order.
/// Lateness uses the reference time captured on the event.
pub fn daily_roster_with<'a>(
    rule: LatenessRule,
    employees: &'a [Employee],
    clock_ins: &'a [ClockInEvent],
    date: &'a str,
) -> Vec<RosterRow<'a>> {
    let mut rows: Vec<RosterRow<'a>> = on_date(clock_ins, date)
        .map(|event| RosterRow {
            event,
            employee: find_employee(employees, &event.employee_id),
            is_late: rule.is_late(&event.time, &event.reference_time_snapshot),
        })
        .collect();

    rows.sort_by(|a, b| a.event.time.cmp(&b.event.time));
    rows
}

pub fn export_rows(employees: &[Employee], clock_ins: &[ClockInEvent], date: &str) -> Vec<ExportRow> {
    export_rows_with(LatenessRule::Lexical, employees, clock_ins, date)
}

/// Report rows in recorded order. The roster is not consulted: every column
/// comes from the event snapshots.
pub fn export_rows_with(
    rule: LatenessRule,
    _employees: &[Employee],
    clock_ins: &[ClockInEvent],
    date: &str,
) -> Vec<ExportRow> {
    on_date(clock_ins, date)
        .map(|event| ExportRow {
            employee_name: event.employee_name.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            reference_time_snapshot: event.reference_time_snapshot.clone(),
            status: AttendanceStatus::from_late(
                rule.is_late(&event.time, &event.reference_time_snapshot),
            ),
        })
        .collect()
}
