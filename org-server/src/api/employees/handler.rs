//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Employee, EmployeeCreate, EmployeeDetail, EmployeeQuery, EmployeeUpdate};
use shared::pagination::PaginatedResponse;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// List employees, filtered and paginated
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Employee>>>> {
    let ctx = state.request_context();
    let page = state.org.list_employees(&ctx, query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Get employee with department and manager names
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<EmployeeDetail>>> {
    let ctx = state.request_context();
    let employee = state.org.get_employee(&ctx, id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    let ctx = state.request_context();
    let employee = state.org.create_employee(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(employee))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let ctx = state.request_context();
    let employee = state.org.update_employee(&ctx, id, payload).await?;
    Ok(Json(ApiResponse::success(employee)))
}

/// Delete an employee who manages no department
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let ctx = state.request_context();
    state.org.delete_employee(&ctx, id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Everyone in the sub-tree of the department this employee manages
pub async fn subordinates(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    let ctx = state.request_context();
    let employees = state.org.subordinates(&ctx, id).await?;
    Ok(Json(ApiResponse::success(employees)))
}
