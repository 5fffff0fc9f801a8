use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    biometrics::FaceEncoding,
    middleware::CurrentUser,
    routes::auth::User,
    utils::{
        decode_base64_image, error_codes, error_to_api_response, success_to_api_response,
        write_temp_image,
    },
};

use super::model::{FaceImageRequest, RecognizeFaceResponse, RegisterFaceResponse};

// 解出请求中的图像并落到临时文件，统一处理缺失/解码失败
async fn image_to_temp_file(
    req: &FaceImageRequest,
) -> Result<std::path::PathBuf, (StatusCode, i32, String)> {
    let Some(image) = req.image.as_deref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            "未提供图像数据".to_string(),
        ));
    };

    let bytes = decode_base64_image(image).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            "图像base64解码失败".to_string(),
        )
    })?;

    write_temp_image(&bytes).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            format!("写入临时文件失败: {}", e),
        )
    })
}

#[axum::debug_handler]
pub async fn register_face(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<FaceImageRequest>,
) -> impl IntoResponse {
    let user = match User::find_by_id(&state.pool, current.user_id).await {
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

    let temp_path = match image_to_temp_file(&req).await {
        Ok(path) => path,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let encoding = state.face_engine.encode(&temp_path);
    let _ = tokio::fs::remove_file(&temp_path).await;

    let encoding = match encoding {
        Ok(Some(encoding)) => encoding,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response(error_codes::VALIDATION_ERROR, "未检测到人脸".to_string()),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("人脸编码失败: {}", e)),
            );
        }
    };

    let encoding_json = match serde_json::to_string(&encoding) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("序列化编码失败: {}", e)),
            );
        }
    };

    match User::store_face_encoding(&state.pool, user.id, &encoding_json).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(RegisterFaceResponse { user_id: user.id }),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("保存人脸编码失败: {}", e)),
        ),
    }
}

#[axum::debug_handler]
pub async fn recognize_face(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<FaceImageRequest>,
) -> impl IntoResponse {
    let user = match User::find_by_id(&state.pool, current.user_id).await {
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

    let Some(stored_json) = user.face_encoding.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::VALIDATION_ERROR, "用户尚未注册人脸".to_string()),
        );
    };

    let stored: FaceEncoding = match serde_json::from_str(stored_json) {
        Ok(encoding) => encoding,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    format!("已存储的人脸编码损坏: {}", e),
                ),
            );
        }
    };

    let temp_path = match image_to_temp_file(&req).await {
        Ok(path) => path,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let probe = state.face_engine.encode(&temp_path);
    let _ = tokio::fs::remove_file(&temp_path).await;

    let probe = match probe {
        Ok(Some(encoding)) => encoding,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response(error_codes::VALIDATION_ERROR, "未检测到人脸".to_string()),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("人脸编码失败: {}", e)),
            );
        }
    };

    let is_match =
        state
            .face_engine
            .compare(&stored, &probe, state.config.face_match_tolerance);

    (
        StatusCode::OK,
        success_to_api_response(RecognizeFaceResponse {
            is_match,
            user_id: is_match.then_some(user.id),
        }),
    )
}
