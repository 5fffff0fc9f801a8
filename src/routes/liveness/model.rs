use serde::{Deserialize, Serialize};

pub const MIN_FRAMES_FOR_BLINK: usize = 10;

#[derive(Debug, Deserialize)]
pub struct VerifyLivenessRequest {
    pub method: Option<String>,
    pub frames: Option<Vec<String>>,
    pub thermal_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlinkLivenessResponse {
    pub is_live: bool,
    pub blink_count: u32,
    pub min_blinks_required: u32,
}

#[derive(Debug, Serialize)]
pub struct ThermalLivenessResponse {
    pub is_live: bool,
    pub confidence: f64,
}
