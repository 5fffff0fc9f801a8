use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    middleware::CurrentUser,
    utils::{error_codes, error_to_api_response, generate_token, success_to_api_response},
};

use super::model::{AuthResponse, LoginRequest, ROLES, RegisterRequest, User, UserProfile};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    // 必填字段检查
    if req.first_name.trim().is_empty()
        || req.last_name.trim().is_empty()
        || req.email.trim().is_empty()
        || req.password.is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "姓名、邮箱和密码均为必填项".to_string(),
            ),
        );
    }

    let role = req.role.as_deref().unwrap_or("student").to_string();
    if !ROLES.contains(&role.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "角色无效，只允许student、teacher或admin".to_string(),
            ),
        );
    }

    match User::create(&state.pool, req, &role).await {
        Ok(user) => match generate_token(user.id, &state.config) {
            Ok(token) => (
                StatusCode::CREATED,
                success_to_api_response(AuthResponse {
                    token,
                    user: UserProfile::from(user),
                }),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
            ),
        },
        Err(e) => {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                (
                    StatusCode::CONFLICT,
                    error_to_api_response(error_codes::ALREADY_EXISTS, "邮箱已被注册".to_string()),
                )
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("创建用户失败: {}", e)),
                )
            }
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match User::find_by_email(&state.pool, &req.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
            );
        }
    };

    match user.verify_login(&req.password) {
        Ok(true) => (),
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_to_api_response(error_codes::AUTH_FAILED, "密码无效".to_string()),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, "密码校验失败".to_string()),
            );
        }
    }

    match generate_token(user.id, &state.config) {
        Ok(token) => (
            StatusCode::OK,
            success_to_api_response(AuthResponse {
                token,
                user: UserProfile::from(user),
            }),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> impl IntoResponse {
    match User::find_by_id(&state.pool, current.user_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            success_to_api_response(UserProfile::from(user)),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
        ),
    }
}
