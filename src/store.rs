use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::password,
    error::AppError,
    kv::{ADMIN_SESSION_KEY, CLOCK_INS_KEY, EMPLOYEES_KEY, KeyValueStore},
    model::{
        attendance::ClockInEvent,
        employee::{DEFAULT_REFERENCE_TIME, Employee, EmployeeUpdate, NewEmployee},
    },
};

/// Result of a clock-in attempt. A wrong password is `Rejected`, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockInOutcome {
    Recorded(ClockInEvent),
    Rejected,
}

/// Employees and clock-in history, each persisted as one JSON document.
///
/// Every mutation is load, modify, save of the whole collection; the write
/// lock serialises those cycles between request handlers.
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.write_lock
            .lock()
            .map_err(|_| AppError::Storage("record store lock poisoned".into()))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        match self.kv.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| AppError::CorruptState {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        let raw = serde_json::to_string(items).map_err(|e| AppError::Storage(e.to_string()))?;
        self.kv.set(key, &raw)
    }

    pub fn load_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.load(EMPLOYEES_KEY)
    }

    pub fn save_employees(&self, employees: &[Employee]) -> Result<(), AppError> {
        self.save(EMPLOYEES_KEY, employees)
    }

    pub fn load_clock_ins(&self) -> Result<Vec<ClockInEvent>, AppError> {
        self.load(CLOCK_INS_KEY)
    }

    pub fn save_clock_ins(&self, clock_ins: &[ClockInEvent]) -> Result<(), AppError> {
        self.save(CLOCK_INS_KEY, clock_ins)
    }

    pub fn find_employee(&self, id: &str) -> Result<Employee, AppError> {
        self.load_employees()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
    }

    pub fn add_employee(&self, employee: Employee) -> Result<(), AppError> {
        validate_employee(&employee)?;

        let _guard = self.lock()?;
        let mut employees = self.load_employees()?;
        if employees.iter().any(|e| e.id == employee.id) {
            return Err(AppError::Validation(format!(
                "Employee id {} already exists",
                employee.id
            )));
        }

        info!(employee_id = %employee.id, "Employee added");
        employees.push(employee);
        self.save_employees(&employees)
    }

    /// Hashes the password and assigns a fresh id before storing.
    pub fn create_employee(
        &self,
        new: NewEmployee,
        now: DateTime<Utc>,
    ) -> Result<Employee, AppError> {
        if new.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }

        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            position: new.position.trim().to_string(),
            password_hash: password::hash(&new.password),
            reference_time: new
                .reference_time
                .unwrap_or_else(|| DEFAULT_REFERENCE_TIME.to_string()),
            photo_url: new.photo_url.filter(|p| !p.is_empty()),
            created_at: now,
        };

        self.add_employee(employee.clone())?;
        Ok(employee)
    }

    /// Replaces the editable fields. Past clock-ins keep their snapshots.
    pub fn update_employee(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, AppError> {
        let _guard = self.lock()?;
        let mut employees = self.load_employees()?;
        let slot = employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))?;

        let mut edited = slot.clone();
        edited.first_name = update.first_name.trim().to_string();
        edited.last_name = update.last_name.trim().to_string();
        edited.position = update.position.trim().to_string();
        if let Some(reference_time) = update.reference_time {
            edited.reference_time = reference_time;
        }
        if let Some(pw) = update.password.filter(|p| !p.is_empty()) {
            edited.password_hash = password::hash(&pw);
        }
        edited.photo_url = update.photo_url.filter(|p| !p.is_empty());

        validate_employee(&edited)?;
        *slot = edited.clone();

        self.save_employees(&employees)?;
        info!(employee_id = %id, "Employee updated");
        Ok(edited)
    }

    /// Removes the employee and every clock-in that references it.
    /// An unknown id is `NotFound` and nothing is written.
    pub fn delete_employee_cascade(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.lock()?;
        let mut employees = self.load_employees()?;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        if employees.len() == before {
            return Err(AppError::NotFound(format!("Employee {id} not found")));
        }

        let mut clock_ins = self.load_clock_ins()?;
        let events_before = clock_ins.len();
        clock_ins.retain(|c| c.employee_id != id);

        // history first, so a failed second write leaves a retryable state
        self.save_clock_ins(&clock_ins)?;
        self.save_employees(&employees)?;

        info!(
            employee_id = %id,
            removed_events = events_before - clock_ins.len(),
            "Employee deleted"
        );
        Ok(())
    }

    pub fn append_clock_in(&self, event: ClockInEvent) -> Result<(), AppError> {
        let guard = self.lock()?;
        self.append_locked(&guard, event)
    }

    fn append_locked(
        &self,
        _guard: &MutexGuard<'_, ()>,
        event: ClockInEvent,
    ) -> Result<(), AppError> {
        let mut clock_ins = self.load_clock_ins()?;
        clock_ins.push(event);
        self.save_clock_ins(&clock_ins)
    }

    /// Verifies the personal password and records one event on success.
    /// `now` is the wall clock in the employee's time zone.
    pub fn clock_in<Tz>(
        &self,
        employee_id: &str,
        plaintext: &str,
        now: &DateTime<Tz>,
    ) -> Result<ClockInOutcome, AppError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if plaintext.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }

        // lookup and append under one guard, so a concurrent cascade delete
        // either runs first (NotFound) or removes this event too
        let guard = self.lock()?;
        let employee = self.find_employee(employee_id)?;
        if !password::verify(plaintext, &employee.password_hash) {
            warn!(employee_id, "Clock-in rejected: password mismatch");
            return Ok(ClockInOutcome::Rejected);
        }

        let event = ClockInEvent {
            employee_id: employee.id.clone(),
            employee_name: employee.full_name(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            timestamp: now
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            reference_time_snapshot: employee.reference_time.clone(),
        };

        self.append_locked(&guard, event.clone())?;
        drop(guard);
        info!(employee_id, date = %event.date, time = %event.time, "Clock-in recorded");
        Ok(ClockInOutcome::Recorded(event))
    }

    pub fn set_admin_session(&self, active: bool) -> Result<(), AppError> {
        debug!(active, "Admin session flag");
        if active {
            self.kv.set(ADMIN_SESSION_KEY, "true")
        } else {
            self.kv.remove(ADMIN_SESSION_KEY)
        }
    }

    pub fn admin_session_active(&self) -> Result<bool, AppError> {
        Ok(self.kv.get(ADMIN_SESSION_KEY)?.as_deref() == Some("true"))
    }
}

fn validate_employee(e: &Employee) -> Result<(), AppError> {
    let required = [
        ("firstName", &e.first_name),
        ("lastName", &e.last_name),
        ("position", &e.position),
        ("passwordHash", &e.password_hash),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    if !is_reference_time(&e.reference_time) {
        return Err(AppError::Validation(format!(
            "referenceTime must be zero-padded HH:MM, got '{}'",
            e.reference_time
        )));
    }
    Ok(())
}

/// `HH:MM`, two digits each, within a day.
fn is_reference_time(s: &str) -> bool {
    s.len() == 5
        && s.as_bytes()[2] == b':'
        && chrono::NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}
