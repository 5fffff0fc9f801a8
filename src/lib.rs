use std::sync::Arc;

use config::Config;
use sqlx::PgPool;

use biometrics::{FaceEngine, LivenessEngine};

pub mod biometrics;
pub mod common;
pub mod config;
pub mod database;
pub mod middleware;
pub mod report;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub face_engine: Arc<dyn FaceEngine>,
    pub liveness_engine: Arc<dyn LivenessEngine>,
}
