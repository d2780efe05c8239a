//! Department API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    Department, DepartmentCreate, DepartmentDelete, DepartmentFound, DepartmentQuery,
    DepartmentTree, DepartmentUpdate, DepartmentWithManager, FoundedDepartment,
};
use shared::pagination::PaginatedResponse;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// List departments with manager names
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DepartmentQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<DepartmentWithManager>>>> {
    let ctx = state.request_context();
    let page = state.org.list_departments(&ctx, query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Department with its nested sub-departments
pub async fn get_tree(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DepartmentTree>>> {
    let ctx = state.request_context();
    let tree = state.org.get_department(&ctx, id).await?;
    Ok(Json(ApiResponse::success(tree)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Department>>)> {
    let ctx = state.request_context();
    let department = state.org.create_department(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(department))))
}

/// Create a department together with a new manager
pub async fn found(
    State(state): State<ServerState>,
    Json(payload): Json<DepartmentFound>,
) -> AppResult<(StatusCode, Json<ApiResponse<FoundedDepartment>>)> {
    let ctx = state.request_context();
    let founded = state.org.found_department(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(founded))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DepartmentUpdate>,
) -> AppResult<Json<ApiResponse<Department>>> {
    let ctx = state.request_context();
    let department = state.org.update_department(&ctx, id, payload).await?;
    Ok(Json(ApiResponse::success(department)))
}

/// `DELETE /api/departments/{id}?reassign_manager_to=..&remove_manager=..`
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(options): Query<DepartmentDelete>,
) -> AppResult<Json<ApiResponse<()>>> {
    let ctx = state.request_context();
    state.org.delete_department(&ctx, id, options).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn ancestors(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Department>>>> {
    let ctx = state.request_context();
    let chain = state.org.get_ancestors(&ctx, id).await?;
    Ok(Json(ApiResponse::success(chain)))
}

pub async fn subtree(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<i64>>>> {
    let ctx = state.request_context();
    let ids = state.org.list_subdepartment_ids(&ctx, id).await?;
    Ok(Json(ApiResponse::success(ids)))
}
