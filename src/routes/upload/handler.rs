use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, sanitize_filename, success_to_api_response},
};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub path: String,
}

#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // 只处理名为file的表单字段
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    error_to_api_response(
                        error_codes::VALIDATION_ERROR,
                        "请求中缺少file字段".to_string(),
                    ),
                );
            }
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    error_to_api_response(
                        error_codes::VALIDATION_ERROR,
                        format!("解析multipart请求失败: {}", e),
                    ),
                );
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or_default());
        if filename.is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response(error_codes::VALIDATION_ERROR, "未选择文件".to_string()),
            );
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    error_to_api_response(
                        error_codes::VALIDATION_ERROR,
                        format!("读取上传内容失败: {}", e),
                    ),
                );
            }
        };
        if bytes.len() > state.config.max_upload_bytes {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                error_to_api_response(error_codes::VALIDATION_ERROR, "上传文件过大".to_string()),
            );
        }

        if let Err(e) = tokio::fs::create_dir_all(&state.config.upload_dir).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("创建上传目录失败: {}", e)),
            );
        }

        let path = state.config.upload_dir.join(&filename);
        return match tokio::fs::write(&path, &bytes).await {
            Ok(()) => (
                StatusCode::OK,
                success_to_api_response(UploadResponse {
                    filename,
                    path: path.to_string_lossy().into_owned(),
                }),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("保存文件失败: {}", e)),
            ),
        };
    }
}
