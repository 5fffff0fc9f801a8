use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, verify_token},
};

// 认证通过后写入请求扩展，供handler读取
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i32,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(error_codes::AUTH_FAILED, "缺少认证令牌".to_string()),
        )
            .into_response();
    };

    match verify_token(bearer.token(), &state.config) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser {
                user_id: claims.sub,
            });
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                error_to_api_response::<()>(
                    error_codes::AUTH_FAILED,
                    "认证令牌无效或已过期".to_string(),
                ),
            )
                .into_response()
        }
    }
}
