use crate::{
    api::run_blocking,
    attendance::{
        export::{CsvDialect, export_file_name, render_csv},
        stats::{DailyStats, daily_roster_with, daily_stats_with, export_rows_with},
    },
    auth::auth::AdminUser,
    config::Config,
    error::AppError,
    model::{attendance::ClockInEvent, employee::PublicEmployee},
    models::ClockInReq,
    store::{ClockInOutcome, RecordStore},
};
use actix_web::{
    HttpResponse, Responder,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DayQuery {
    /// Day to report on (`YYYY-MM-DD`); today when omitted
    #[param(example = "2024-01-10")]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    #[param(example = "2024-01-10")]
    pub date: Option<String>,
    /// `legacy` or `rfc4180` (default)
    #[param(example = "rfc4180")]
    pub dialect: Option<String>,
}

/// API view of a [`ClockInEvent`]. The stored document keeps its legacy
/// camelCase keys; responses use the same snake_case as every other DTO.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClockInResponse {
    pub employee_id: String,
    #[schema(example = "Ana Li")]
    pub employee_name: String,
    #[schema(example = "2024-01-10")]
    pub date: String,
    #[schema(example = "09:05:12")]
    pub time: String,
    #[schema(example = "2024-01-10T08:05:12.000Z")]
    pub timestamp: String,
    #[schema(example = "09:00")]
    pub reference_time: String,
}

impl From<ClockInEvent> for ClockInResponse {
    fn from(e: ClockInEvent) -> Self {
        ClockInResponse {
            employee_id: e.employee_id,
            employee_name: e.employee_name,
            date: e.date,
            time: e.time,
            timestamp: e.timestamp,
            reference_time: e.reference_time_snapshot,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RosterRowResponse {
    pub event: ClockInResponse,
    #[schema(nullable = true)]
    pub employee: Option<PublicEmployee>,
    pub is_late: bool,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(example = "2024-01-10")]
    pub date: String,
    pub stats: DailyStats,
    /// `stats.absent` clamped at zero for display
    pub absent_display: u64,
    pub rows: Vec<RosterRowResponse>,
}

fn resolve_date(date: Option<String>) -> Result<String, AppError> {
    match date {
        None => Ok(Local::now().format("%Y-%m-%d").to_string()),
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .map(|parsed| parsed.format("%Y-%m-%d").to_string())
            .map_err(|_| AppError::Validation(format!("date must be YYYY-MM-DD, got '{d}'"))),
    }
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/clock-in",
    request_body = ClockInReq,
    responses(
        (status = 200, description = "Arrival recorded", body = ClockInResponse),
        (status = 400, description = "Password missing"),
        (status = 401, description = "Wrong password", body = Object, example = json!({
            "message": "Incorrect password"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Clock-in"
)]
pub async fn clock_in(
    store: web::Data<RecordStore>,
    payload: web::Json<ClockInReq>,
) -> Result<impl Responder, AppError> {
    let ClockInReq {
        employee_id,
        password,
    } = payload.into_inner();

    let outcome =
        run_blocking(move || store.clock_in(&employee_id, &password, &Local::now())).await?;

    match outcome {
        ClockInOutcome::Recorded(event) => {
            Ok(HttpResponse::Ok().json(ClockInResponse::from(event)))
        }
        ClockInOutcome::Rejected => Ok(HttpResponse::Unauthorized().json(json!({
            "message": "Incorrect password"
        }))),
    }
}

/// Daily attendance dashboard
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(DayQuery),
    responses(
        (status = 200, description = "Stats and clock-ins for the day", body = DashboardResponse),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dashboard(
    _admin: AdminUser,
    store: web::Data<RecordStore>,
    config: web::Data<Config>,
    query: web::Query<DayQuery>,
) -> Result<impl Responder, AppError> {
    let date = resolve_date(query.into_inner().date)?;
    let rule = config.lateness_rule;

    let (employees, clock_ins) =
        run_blocking(move || Ok((store.load_employees()?, store.load_clock_ins()?))).await?;

    let stats = daily_stats_with(rule, &employees, &clock_ins, &date);
    let rows = daily_roster_with(rule, &employees, &clock_ins, &date)
        .into_iter()
        .map(|row| RosterRowResponse {
            event: ClockInResponse::from(row.event.clone()),
            employee: row.employee.map(PublicEmployee::from),
            is_late: row.is_late,
        })
        .collect();

    debug!(%date, present = stats.present, late = stats.late, "Dashboard computed");

    Ok(HttpResponse::Ok().json(DashboardResponse {
        absent_display: stats.absent.max(0) as u64,
        date,
        stats,
        rows,
    }))
}

/// CSV export of one day's clock-ins
#[utoipa::path(
    get,
    path = "/api/admin/attendance/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Malformed date or dialect"),
        (status = 404, description = "No clock-in for that day", body = Object, example = json!({
            "message": "No clock-in found for 2024-01-10"
        }))
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_csv(
    admin: AdminUser,
    store: web::Data<RecordStore>,
    config: web::Data<Config>,
    query: web::Query<ExportQuery>,
) -> Result<impl Responder, AppError> {
    let ExportQuery { date, dialect } = query.into_inner();
    let date = resolve_date(date)?;
    let dialect = match dialect {
        None => CsvDialect::default(),
        Some(d) => d
            .parse::<CsvDialect>()
            .map_err(|_| AppError::Validation(format!("unknown CSV dialect '{d}'")))?,
    };
    let rule = config.lateness_rule;

    let (employees, clock_ins) =
        run_blocking(move || Ok((store.load_employees()?, store.load_clock_ins()?))).await?;

    let rows = export_rows_with(rule, &employees, &clock_ins, &date);
    let Some(csv) = render_csv(&rows, dialect) else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": format!("No clock-in found for {date}")
        })));
    };

    info!(
        admin = %admin.username,
        token_id = %admin.token_id,
        %date,
        rows = rows.len(),
        %dialect,
        "CSV export"
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export_file_name(&date))],
        })
        .body(csv))
}
