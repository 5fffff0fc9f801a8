use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};

use crate::{
    AppState,
    middleware::CurrentUser,
    report::generate_attendance_report,
    routes::{auth::User, subjects::Subject},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{
    Attendance, AttendanceStatus, MarkAttendanceRequest, PdfReportResponse, ReportFilter,
    ReportParams, ReportResponse, StatsParams, StatsResponse, SubjectStats,
};
use super::stats::{Period, StatusCounts, attendance_percentage, count_statuses, period_start};

fn parse_date(
    value: Option<&str>,
    field: &str,
) -> Result<Option<NaiveDate>, (StatusCode, i32, String)> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    error_codes::VALIDATION_ERROR,
                    format!("{}格式无效，应为YYYY-MM-DD", field),
                )
            }),
    }
}

// 管理员可以通过user_id查询任意用户，其他角色只能查询自己
fn resolve_target_user(caller: &User, requested: Option<i32>) -> i32 {
    if caller.is_admin() {
        requested.unwrap_or(caller.id)
    } else {
        caller.id
    }
}

async fn load_caller(
    state: &AppState,
    current: CurrentUser,
) -> Result<User, (StatusCode, i32, String)> {
    match User::find_by_id(&state.pool, current.user_id).await {
        Ok(Some(user)) => Ok(user),
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
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<MarkAttendanceRequest>,
) -> impl IntoResponse {
    let user = match load_caller(&state, current).await {
        Ok(user) => user,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let Some(subject_id) = req.subject_id else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::VALIDATION_ERROR, "缺少课程ID".to_string()),
        );
    };

    let subject = match Subject::find_by_id(&state.pool, subject_id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_to_api_response(error_codes::NOT_FOUND, "课程不存在".to_string()),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
            );
        }
    };

    let status: AttendanceStatus = match req.status.as_deref().unwrap_or("present").parse() {
        Ok(status) => status,
        Err(()) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response(
                    error_codes::VALIDATION_ERROR,
                    "考勤状态无效，只允许present、absent或late".to_string(),
                ),
            );
        }
    };
    let verification_method = req.verification_method.as_deref().unwrap_or("face");
    let liveness_verified = req.liveness_verified.unwrap_or(false);

    // 日期和时间由服务端指定
    let now = Utc::now();
    let today = now.date_naive();

    // 先查当日是否已有记录，再插入。并发下存在竞态，原型阶段接受
    match Attendance::find_for_day(&state.pool, user.id, subject.id, today).await {
        Ok(Some(existing)) => {
            tracing::debug!(
                "Attendance already marked: user {} subject {} date {}",
                user.id,
                subject.id,
                today
            );
            return (StatusCode::OK, success_to_api_response(existing));
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
            );
        }
    }

    match Attendance::insert(
        &state.pool,
        user.id,
        subject.id,
        status,
        verification_method,
        liveness_verified,
        today,
        now.time(),
    )
    .await
    {
        Ok(attendance) => (StatusCode::CREATED, success_to_api_response(attendance)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("记录考勤失败: {}", e)),
        ),
    }
}

#[axum::debug_handler]
pub async fn attendance_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ReportParams>,
) -> impl IntoResponse {
    let caller = match load_caller(&state, current).await {
        Ok(user) => user,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let start_date = match parse_date(params.start_date.as_deref(), "start_date") {
        Ok(date) => date,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };
    let end_date = match parse_date(params.end_date.as_deref(), "end_date") {
        Ok(date) => date,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let filter = ReportFilter {
        user_id: resolve_target_user(&caller, params.user_id),
        subject_id: params.subject_id,
        start_date,
        end_date,
    };

    match Attendance::query_report(&state.pool, &filter).await {
        Ok(attendances) => {
            let count = attendances.len();
            (
                StatusCode::OK,
                success_to_api_response(ReportResponse { attendances, count }),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("查询考勤失败: {}", e)),
        ),
    }
}

#[axum::debug_handler]
pub async fn attendance_report_pdf(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ReportParams>,
) -> impl IntoResponse {
    let caller = match load_caller(&state, current).await {
        Ok(user) => user,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let start_date = match parse_date(params.start_date.as_deref(), "start_date") {
        Ok(date) => date,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };
    let end_date = match parse_date(params.end_date.as_deref(), "end_date") {
        Ok(date) => date,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let target_user_id = resolve_target_user(&caller, params.user_id);
    let target_user = if target_user_id == caller.id {
        caller
    } else {
        match User::find_by_id(&state.pool, target_user_id).await {
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
        }
    };

    let subject = match params.subject_id {
        Some(subject_id) => match Subject::find_by_id(&state.pool, subject_id).await {
            Ok(Some(subject)) => Some(subject),
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    error_to_api_response(error_codes::NOT_FOUND, "课程不存在".to_string()),
                );
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
                );
            }
        },
        None => None,
    };

    let filter = ReportFilter {
        user_id: target_user.id,
        subject_id: params.subject_id,
        start_date,
        end_date,
    };

    let attendances = match Attendance::query_report_with_subjects(&state.pool, &filter).await {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("查询考勤失败: {}", e)),
            );
        }
    };

    match generate_attendance_report(
        &state.config.upload_dir,
        &attendances,
        &target_user,
        subject.as_ref(),
        start_date,
        end_date,
    ) {
        Ok(path) => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (
                StatusCode::OK,
                success_to_api_response(PdfReportResponse {
                    filename,
                    path: path.to_string_lossy().into_owned(),
                }),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, format!("生成报表失败: {}", e)),
        ),
    }
}

#[axum::debug_handler]
pub async fn attendance_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<StatsParams>,
) -> impl IntoResponse {
    let caller = match load_caller(&state, current).await {
        Ok(user) => user,
        Err((status, code, msg)) => return (status, error_to_api_response(code, msg)),
    };

    let period: Period = match params.period.as_deref().unwrap_or("month").parse() {
        Ok(period) => period,
        Err(()) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response(
                    error_codes::VALIDATION_ERROR,
                    "统计周期无效，只允许week、month、semester或year".to_string(),
                ),
            );
        }
    };
    let start = period_start(Utc::now().date_naive(), period);

    let target_user_id = resolve_target_user(&caller, params.user_id);

    let subjects = match params.subject_id {
        Some(subject_id) => match Subject::find_by_id(&state.pool, subject_id).await {
            Ok(Some(subject)) => vec![subject],
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    error_to_api_response(error_codes::NOT_FOUND, "课程不存在".to_string()),
                );
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
                );
            }
        },
        None => match Subject::list_all(&state.pool).await {
            Ok(subjects) => subjects,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, format!("数据库错误: {}", e)),
                );
            }
        },
    };

    let mut response = StatsResponse {
        total_classes: 0,
        present: 0,
        absent: 0,
        late: 0,
        attendance_percentage: 0.0,
        subjects: Vec::with_capacity(subjects.len()),
    };
    let mut overall = StatusCounts::default();

    for subject in subjects {
        let statuses =
            match Attendance::statuses_since(&state.pool, target_user_id, subject.id, start).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        error_to_api_response(
                            error_codes::INTERNAL_ERROR,
                            format!("查询考勤失败: {}", e),
                        ),
                    );
                }
            };

        let counts = count_statuses(statuses.iter().map(String::as_str));
        overall.total += counts.total;
        overall.present += counts.present;
        overall.absent += counts.absent;
        overall.late += counts.late;

        response.subjects.push(SubjectStats {
            id: subject.id,
            name: subject.name,
            code: subject.code,
            total_classes: counts.total,
            present: counts.present,
            absent: counts.absent,
            late: counts.late,
            attendance_percentage: attendance_percentage(counts),
        });
    }

    response.total_classes = overall.total;
    response.present = overall.present;
    response.absent = overall.absent;
    response.late = overall.late;
    response.attendance_percentage = attendance_percentage(overall);

    (StatusCode::OK, success_to_api_response(response))
}
