//! Route table and handlers.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /health` | [`health`] |
//! | `POST /departments` | [`create_department`] |
//! | `GET /departments/:id` | [`get_department`] |
//! | `PATCH /departments/:id` | [`update_department`] |
//! | `DELETE /departments/:id?mode=..` | [`delete_department`] |
//! | `POST /departments/:id/employees` | [`create_employee`] |
//! | `GET /employees/:id` | [`get_employee`] |

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use orgchart_core::{
    core_version, DeleteMode, Department, DepartmentDetail, DepartmentId, DepartmentPatch,
    DepartmentService, Employee, EmployeeService, NewEmployee, SqliteDepartmentRepository,
    SqliteEmployeeRepository,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departments", post(create_department))
        .route(
            "/departments/:id",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
        .route("/departments/:id/employees", post(create_employee))
        .route("/employees/:id", get(get_employee))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<DepartmentId>,
}

/// `parent_id: null` moves the department to the root; an absent key leaves
/// the parent unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateDepartmentBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub parent_id: Option<Option<DepartmentId>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteDepartmentQuery {
    pub mode: Option<String>,
    pub reassign_to_department_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeBody {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_version(),
    })
}

pub async fn create_department(
    State(state): State<AppState>,
    body: Result<Json<CreateDepartmentBody>, JsonRejection>,
) -> Result<Json<Department>, ApiError> {
    let Json(body) = body?;
    let department = state
        .with_connection(move |conn| {
            let service = DepartmentService::new(SqliteDepartmentRepository::try_new(conn)?);
            Ok(service.create_department(&body.name, body.parent_id)?)
        })
        .await?;
    Ok(Json(department))
}

pub async fn get_department(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DepartmentDetail>, ApiError> {
    let id = parse_id("department", &raw_id)?;
    let detail = state
        .with_connection(move |conn| {
            let service = DepartmentService::new(SqliteDepartmentRepository::try_new(conn)?);
            Ok(service.get_department(id)?)
        })
        .await?;
    Ok(Json(detail))
}

/// Updates a department; a missing department wins over a malformed body.
pub async fn update_department(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateDepartmentBody>, JsonRejection>,
) -> Result<Json<Department>, ApiError> {
    let id = parse_id("department", &raw_id)?;
    let department = state
        .with_connection(move |conn| {
            let service = DepartmentService::new(SqliteDepartmentRepository::try_new(conn)?);
            service.ensure_department_exists(id)?;

            let Json(body) = body?;
            let patch = DepartmentPatch {
                name: body.name,
                parent_id: body.parent_id,
            };
            Ok(service.update_department(id, &patch)?)
        })
        .await?;
    Ok(Json(department))
}

pub async fn delete_department(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<DeleteDepartmentQuery>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("department", &raw_id)?;
    let mode = DeleteMode::parse(
        query.mode.as_deref(),
        query.reassign_to_department_id.as_deref(),
    )
    .map_err(|err| ApiError::Service(err.into()))?;

    state
        .with_connection(move |conn| {
            let service = DepartmentService::new(SqliteDepartmentRepository::try_new(conn)?);
            service.delete_department(id, mode)?;
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates an employee; a missing department wins over a malformed body.
pub async fn create_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<CreateEmployeeBody>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let department_id = parse_id("department", &raw_id)?;
    let employee = state
        .with_connection(move |conn| {
            let service = EmployeeService::new(SqliteEmployeeRepository::try_new(conn)?);
            service.ensure_department_exists(department_id)?;

            let Json(body) = body?;
            let request = NewEmployee {
                department_id,
                full_name: body.full_name,
                position: body.position,
                hired_at: body.hired_at,
            };
            Ok(service.create_employee(&request)?)
        })
        .await?;
    Ok(Json(employee))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let id = parse_id("employee", &raw_id)?;
    let employee = state
        .with_connection(move |conn| {
            let service = EmployeeService::new(SqliteEmployeeRepository::try_new(conn)?);
            Ok(service.get_employee(id)?)
        })
        .await?;
    Ok(Json(employee))
}

fn parse_id(what: &'static str, raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::InvalidId {
        what,
        raw: raw.to_string(),
    })
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<DepartmentId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DepartmentId>::deserialize(deserializer).map(Some)
}
