use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use attendance_backend::{
    AppState,
    biometrics::{MockFaceEngine, MockLivenessEngine},
    config::Config,
    database,
    middleware::{auth_middleware, log_errors},
    routes,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'attendance_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 建表并确保上传目录存在
    database::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // 设置应用状态，人脸/活体检测目前接入的是占位实现
    let state = AppState {
        pool,
        config: config.clone(),
        face_engine: Arc::new(MockFaceEngine),
        liveness_engine: Arc::new(MockLivenessEngine),
    };

    // 将路由分为公开路由和受保护路由
    let public_routes = Router::new()
        .route("/", get(routes::index))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/upload", post(routes::upload::upload_file));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(routes::auth::profile))
        // 人脸识别路由
        .route("/api/faces/register", post(routes::faces::register_face))
        .route("/api/faces/recognize", post(routes::faces::recognize_face))
        // 活体检测路由
        .route("/api/liveness/verify", post(routes::liveness::verify_liveness))
        // 考勤路由
        .route("/api/attendance/mark", post(routes::attendance::mark_attendance))
        .route("/api/attendance/report", get(routes::attendance::attendance_report))
        .route(
            "/api/attendance/report/pdf",
            get(routes::attendance::attendance_report_pdf),
        )
        .route("/api/attendance/stats", get(routes::attendance::attendance_stats))
        // 课程路由
        .route("/api/subjects", get(routes::subjects::list_subjects))
        .route("/api/subjects", post(routes::subjects::create_subject))
        .route("/api/subjects/{subject_id}", get(routes::subjects::get_subject))
        .route("/api/subjects/{subject_id}", put(routes::subjects::update_subject))
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
