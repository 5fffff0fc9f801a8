use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FaceImageRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterFaceResponse {
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct RecognizeFaceResponse {
    #[serde(rename = "match")]
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
}
