use crate::{
    api::run_blocking,
    auth::auth::AdminUser,
    error::AppError,
    model::employee::{Employee, EmployeeUpdate, NewEmployee, PublicEmployee},
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

/// Admin view of an employee; the password hash never leaves the store.
#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[schema(example = "5f1c8d0e-3a7b-4b1e-9a55-0d8e2c6f4a11")]
    pub id: String,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Li")]
    pub last_name: String,
    #[schema(example = "Cashier")]
    pub position: String,
    #[schema(example = "09:00")]
    pub reference_time: String,
    #[schema(nullable = true)]
    pub photo_url: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        EmployeeResponse {
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            position: e.position,
            reference_time: e.reference_time,
            photo_url: e.photo_url,
            created_at: e.created_at,
        }
    }
}

/// Employee picker for the clock-in screen
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employees available for clock-in", body = [PublicEmployee]),
        (status = 500, description = "Stored roster cannot be read")
    ),
    tag = "Clock-in"
)]
pub async fn list_public_employees(
    store: web::Data<RecordStore>,
) -> Result<impl Responder, AppError> {
    let employees = run_blocking(move || store.load_employees()).await?;
    let data: Vec<PublicEmployee> = employees.iter().map(PublicEmployee::from).collect();
    Ok(HttpResponse::Ok().json(data))
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Full roster", body = [EmployeeResponse]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    _admin: AdminUser,
    store: web::Data<RecordStore>,
) -> Result<impl Responder, AppError> {
    let employees = run_blocking(move || store.load_employees()).await?;
    let data: Vec<EmployeeResponse> = employees.into_iter().map(EmployeeResponse::from).collect();
    Ok(HttpResponse::Ok().json(data))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Required field missing", body = Object, example = json!({
            "message": "position is required"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    admin: AdminUser,
    store: web::Data<RecordStore>,
    payload: web::Json<NewEmployee>,
) -> Result<impl Responder, AppError> {
    let new = payload.into_inner();
    let employee = run_blocking(move || store.create_employee(new, Utc::now())).await?;

    info!(
        admin = %admin.username,
        token_id = %admin.token_id,
        employee_id = %employee.id,
        "Employee created"
    );
    Ok(HttpResponse::Created().json(EmployeeResponse::from(employee)))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/admin/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee 42 not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    _admin: AdminUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let employee = run_blocking(move || store.find_employee(&id)).await?;
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/admin/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Required field missing"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    admin: AdminUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
    body: web::Json<EmployeeUpdate>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let update = body.into_inner();
    let employee = run_blocking(move || store.update_employee(&id, update)).await?;

    info!(
        admin = %admin.username,
        token_id = %admin.token_id,
        employee_id = %employee.id,
        "Employee updated via API"
    );
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

/// Delete Employee together with its clock-in history
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    admin: AdminUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let deleted = id.clone();
    run_blocking(move || store.delete_employee_cascade(&id)).await?;

    info!(
        admin = %admin.username,
        token_id = %admin.token_id,
        employee_id = %deleted,
        "Employee deleted via API"
    );
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
