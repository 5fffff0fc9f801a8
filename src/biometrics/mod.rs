// 生物识别能力接口
// 人脸编码/比对与活体检测以trait形式接入，后续接入真实算法时无需改动调用方

use std::io;
use std::path::Path;

use serde::Serialize;

mod mock;

pub use mock::{MockFaceEngine, MockLivenessEngine};

/// 人脸编码向量，与存储在用户表中的JSON数组互转
pub type FaceEncoding = Vec<f64>;

/// 图像中人脸的位置，(top, right, bottom, left) 像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceLocation {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// 单张人脸的关键点，目前只用到双眼
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceLandmarks {
    pub left_eye: Vec<(u32, u32)>,
    pub right_eye: Vec<(u32, u32)>,
}

pub trait FaceEngine: Send + Sync {
    /// 从图像生成人脸编码，未检测到人脸时返回None
    fn encode(&self, image_path: &Path) -> io::Result<Option<FaceEncoding>>;

    /// 比对已注册编码与待验证编码，tolerance越小越严格
    fn compare(&self, known: &FaceEncoding, candidate: &FaceEncoding, tolerance: f64) -> bool;

    fn detect(&self, image_path: &Path) -> io::Result<Vec<FaceLocation>>;

    fn landmarks(&self, image_path: &Path) -> io::Result<Vec<FaceLandmarks>>;
}

pub trait LivenessEngine: Send + Sync {
    /// 统计帧序列中的眨眼次数，threshold为EAR阈值
    fn count_blinks(&self, frame_paths: &[std::path::PathBuf], threshold: f64) -> io::Result<u32>;

    /// 分析热成像图，返回(是否为活体, 置信度)
    fn analyze_thermal(&self, image_path: &Path) -> io::Result<(bool, f64)>;
}
