use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    middleware::CurrentUser,
    routes::auth::User,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{CreateSubjectRequest, Subject, UpdateSubjectRequest};

#[axum::debug_handler]
pub async fn list_subjects(State(state): State<AppState>) -> impl IntoResponse {
    match Subject::list_all(&state.pool).await {
        Ok(subjects) => (StatusCode::OK, success_to_api_response(subjects)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
        ),
    }
}

#[axum::debug_handler]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<i32>,
) -> impl IntoResponse {
    match Subject::find_by_id(&state.pool, subject_id).await {
        Ok(Some(subject)) => (StatusCode::OK, success_to_api_response(subject)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "课程不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
        ),
    }
}

// 检查当前用户是否允许管理课程（学生不允许）
async fn check_can_manage(
    state: &AppState,
    current: CurrentUser,
) -> Result<(), (StatusCode, i32, String)> {
    match User::find_by_id(&state.pool, current.user_id).await {
        Ok(Some(user)) => {
            if user.role == "student" {
                Err((
                    StatusCode::FORBIDDEN,
                    error_codes::PERMISSION_DENIED,
                    "只有教师或管理员可以管理课程".to_string(),
                ))
            } else {
                Ok(())
            }
        }
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            error_codes::NOT_FOUND,
            "用户不存在".to_string(),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            format!("数据库错误: {}", e),
        )),
    }
}

#[axum::debug_handler]
pub async fn create_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateSubjectRequest>,
) -> impl IntoResponse {
    if let Err((status, code, msg)) = check_can_manage(&state, current).await {
        return (status, error_to_api_response(code, msg));
    }

    if req.name.trim().is_empty() || req.code.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "课程名称和课程代码为必填项".to_string(),
            ),
        );
    }

    match Subject::create(&state.pool, req).await {
        Ok(subject) => (StatusCode::CREATED, success_to_api_response(subject)),
        Err(e) => {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                (
                    StatusCode::CONFLICT,
                    error_to_api_response(error_codes::ALREADY_EXISTS, "课程代码已存在".to_string()),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("创建课程失败: {}", e)),
                )
            }
        }
    }
}

#[axum::debug_handler]
pub async fn update_subject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(subject_id): Path<i32>,
    Json(req): Json<UpdateSubjectRequest>,
) -> impl IntoResponse {
    if let Err((status, code, msg)) = check_can_manage(&state, current).await {
        return (status, error_to_api_response(code, msg));
    }

    if req.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "没有提供任何需要更新的字段".to_string(),
            ),
        );
    }

    match Subject::update(&state.pool, subject_id, req).await {
        Ok(Some(subject)) => (StatusCode::OK, success_to_api_response(subject)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "课程不存在".to_string()),
        ),
        Err(e) => {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                (
                    StatusCode::CONFLICT,
                    error_to_api_response(error_codes::ALREADY_EXISTS, "课程代码已存在".to_string()),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("更新课程失败: {}", e)),
                )
            }
        }
    }
}
