// 开发用的占位实现：输出与输入图像无关
// 真实的人脸识别/活体检测算法尚未接入

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

use super::{FaceEncoding, FaceEngine, FaceLandmarks, FaceLocation, LivenessEngine};

pub const ENCODING_DIMENSIONS: usize = 128;

#[derive(Debug, Default)]
pub struct MockFaceEngine;

impl FaceEngine for MockFaceEngine {
    fn encode(&self, _image_path: &Path) -> io::Result<Option<FaceEncoding>> {
        // 随机128维向量
        let mut rng = rand::thread_rng();
        let encoding = (0..ENCODING_DIMENSIONS)
            .map(|_| rng.gen_range(0.0..1.0))
            .collect();
        Ok(Some(encoding))
    }

    fn compare(&self, _known: &FaceEncoding, _candidate: &FaceEncoding, _tolerance: f64) -> bool {
        // 占位实现恒定匹配
        true
    }

    fn detect(&self, _image_path: &Path) -> io::Result<Vec<FaceLocation>> {
        Ok(vec![FaceLocation {
            top: 0,
            right: 100,
            bottom: 100,
            left: 0,
        }])
    }

    fn landmarks(&self, _image_path: &Path) -> io::Result<Vec<FaceLandmarks>> {
        Ok(vec![FaceLandmarks {
            left_eye: vec![(20, 30), (25, 30)],
            right_eye: vec![(70, 30), (75, 30)],
        }])
    }
}

#[derive(Debug, Default)]
pub struct MockLivenessEngine;

impl LivenessEngine for MockLivenessEngine {
    fn count_blinks(&self, _frame_paths: &[PathBuf], _threshold: f64) -> io::Result<u32> {
        // 2到5次之间的随机眨眼数
        Ok(rand::thread_rng().gen_range(2..6))
    }

    fn analyze_thermal(&self, _image_path: &Path) -> io::Result<(bool, f64)> {
        Ok((true, 0.95))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_returns_fixed_dimension_vector() {
        let engine = MockFaceEngine;
        let encoding = engine.encode(Path::new("ignored.jpg")).unwrap().unwrap();
        assert_eq!(encoding.len(), ENCODING_DIMENSIONS);
        assert!(encoding.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn compare_always_matches() {
        let engine = MockFaceEngine;
        let a = vec![0.0; ENCODING_DIMENSIONS];
        let b = vec![1.0; ENCODING_DIMENSIONS];
        assert!(engine.compare(&a, &b, 0.6));
    }

    #[test]
    fn detect_returns_single_fixed_box() {
        let engine = MockFaceEngine;
        let faces = engine.detect(Path::new("ignored.jpg")).unwrap();
        assert_eq!(
            faces,
            vec![FaceLocation {
                top: 0,
                right: 100,
                bottom: 100,
                left: 0
            }]
        );
    }

    #[test]
    fn landmarks_contain_both_eyes() {
        let engine = MockFaceEngine;
        let marks = engine.landmarks(Path::new("ignored.jpg")).unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].left_eye.len(), 2);
        assert_eq!(marks[0].right_eye.len(), 2);
    }

    #[test]
    fn blink_count_stays_in_mock_range() {
        let engine = MockLivenessEngine;
        for _ in 0..50 {
            let count = engine.count_blinks(&[], 0.3).unwrap();
            assert!((2..6).contains(&count));
        }
    }

    #[test]
    fn thermal_always_reports_live() {
        let engine = MockLivenessEngine;
        let (is_live, confidence) = engine.analyze_thermal(Path::new("ignored.jpg")).unwrap();
        assert!(is_live);
        assert!((confidence - 0.95).abs() < f64::EPSILON);
    }
}
