use std::path::PathBuf;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    utils::{
        decode_base64_image, error_codes, error_to_api_response, success_to_api_response,
        write_temp_image,
    },
};

use super::model::{
    BlinkLivenessResponse, MIN_FRAMES_FOR_BLINK, ThermalLivenessResponse, VerifyLivenessRequest,
};

async fn cleanup_frames(paths: &[PathBuf]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}

#[axum::debug_handler]
pub async fn verify_liveness(
    State(state): State<AppState>,
    Json(req): Json<VerifyLivenessRequest>,
) -> Response {
    let method = req.method.as_deref().unwrap_or("blink");
    match method {
        "blink" => verify_blink(&state, &req).await,
        "thermal" => verify_thermal(&state, &req).await,
        other => (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(
                error_codes::VALIDATION_ERROR,
                format!("不支持的活体检测方式: {}", other),
            ),
        )
            .into_response(),
    }
}

async fn verify_blink(state: &AppState, req: &VerifyLivenessRequest) -> Response {
    let Some(frames) = req.frames.as_ref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(error_codes::VALIDATION_ERROR, "未提供视频帧".to_string()),
        )
            .into_response();
    };
    // 眨眼检测需要足够的帧数
    if frames.len() < MIN_FRAMES_FOR_BLINK {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(
                error_codes::VALIDATION_ERROR,
                format!("帧数不足，至少需要{}帧", MIN_FRAMES_FOR_BLINK),
            ),
        )
            .into_response();
    }

    let mut frame_paths = Vec::with_capacity(frames.len());
    for frame in frames {
        let bytes = match decode_base64_image(frame) {
            Ok(bytes) => bytes,
            Err(_) => {
                cleanup_frames(&frame_paths).await;
                return (
                    StatusCode::BAD_REQUEST,
                    error_to_api_response::<()>(
                        error_codes::VALIDATION_ERROR,
                        "视频帧base64解码失败".to_string(),
                    ),
                )
                    .into_response();
            }
        };
        match write_temp_image(&bytes).await {
            Ok(path) => frame_paths.push(path),
            Err(e) => {
                cleanup_frames(&frame_paths).await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response::<()>(
                        error_codes::INTERNAL_ERROR,
                        format!("写入临时文件失败: {}", e),
                    ),
                )
                    .into_response();
            }
        }
    }

    let result = state
        .liveness_engine
        .count_blinks(&frame_paths, state.config.blink_threshold);
    cleanup_frames(&frame_paths).await;

    match result {
        Ok(blink_count) => {
            let min_blinks_required = state.config.min_blinks_required;
            (
                StatusCode::OK,
                success_to_api_response(BlinkLivenessResponse {
                    is_live: blink_count >= min_blinks_required,
                    blink_count,
                    min_blinks_required,
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response::<()>(error_codes::INTERNAL_ERROR, format!("眨眼检测失败: {}", e)),
        )
            .into_response(),
    }
}

async fn verify_thermal(state: &AppState, req: &VerifyLivenessRequest) -> Response {
    let Some(thermal_image) = req.thermal_image.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(
                error_codes::VALIDATION_ERROR,
                "未提供热成像图像".to_string(),
            ),
        )
            .into_response();
    };

    let bytes = match decode_base64_image(thermal_image) {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response::<()>(
                    error_codes::VALIDATION_ERROR,
                    "图像base64解码失败".to_string(),
                ),
            )
                .into_response();
        }
    };

    let temp_path = match write_temp_image(&bytes).await {
        Ok(path) => path,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(
                    error_codes::INTERNAL_ERROR,
                    format!("写入临时文件失败: {}", e),
                ),
            )
                .into_response();
        }
    };

    let result = state.liveness_engine.analyze_thermal(&temp_path);
    let _ = tokio::fs::remove_file(&temp_path).await;

    match result {
        Ok((is_live, confidence)) => (
            StatusCode::OK,
            success_to_api_response(ThermalLivenessResponse {
                is_live,
                confidence,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response::<()>(
                error_codes::INTERNAL_ERROR,
                format!("热成像分析失败: {}", e),
            ),
        )
            .into_response(),
    }
}
