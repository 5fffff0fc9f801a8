use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub face_match_tolerance: f64,
    pub blink_threshold: f64,
    pub min_blinks_required: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".to_string())
                .into(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_default()
                .parse()
                .unwrap_or(16 * 1024 * 1024),
            face_match_tolerance: env::var("FACE_MATCH_TOLERANCE")
                .unwrap_or_default()
                .parse()
                .unwrap_or(0.6),
            blink_threshold: env::var("BLINK_THRESHOLD")
                .unwrap_or_default()
                .parse()
                .unwrap_or(0.3),
            min_blinks_required: env::var("MIN_BLINKS_REQUIRED")
                .unwrap_or_default()
                .parse()
                .unwrap_or(2),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}
