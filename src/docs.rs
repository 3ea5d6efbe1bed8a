use crate::api::attendance::{ClockInResponse, DashboardResponse, RosterRowResponse};
use crate::api::employee::EmployeeResponse;
use crate::attendance::stats::{AttendanceStatus, DailyStats, ExportRow};
use crate::model::employee::{EmployeeUpdate, NewEmployee, PublicEmployee};
use crate::models::{ClockInReq, LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pointage API",
        version = "1.0.0",
        description = r#"
## Employee time clock

Employees pick their profile and enter a personal password to record their
arrival. An administrator reviews daily attendance, sees late arrivals,
exports CSV reports and manages the roster.

### Clock-in
- `GET /api/employees` lists profiles (no credential material)
- `POST /api/clock-in` records one arrival after the password check

### Back office
- Admin login issues a **JWT Bearer** token
- Roster management, daily dashboard and CSV export under `/api/admin`

Lateness is the clock-in time compared with the employee's reference time.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::attendance::clock_in,
        crate::api::attendance::dashboard,
        crate::api::attendance::export_csv,

        crate::api::employee::list_public_employees,
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            ClockInReq,
            ClockInResponse,
            PublicEmployee,
            NewEmployee,
            EmployeeUpdate,
            EmployeeResponse,
            DailyStats,
            AttendanceStatus,
            ExportRow,
            RosterRowResponse,
            DashboardResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Admin session"),
        (name = "Clock-in", description = "Employee arrival recording"),
        (name = "Attendance", description = "Daily attendance and reports"),
        (name = "Employee", description = "Roster management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
