use crate::db::model::FaceEncoding;

/// `FaceAnalyser` backed by dlib's HOG face detector, 68 point landmark
/// predictor and ResNet face encoder.
pub struct DlibFaceAnalyser {
    face_landmark_predictor_model_file_path: std::path::PathBuf,
    face_encoder_model_file_path: std::path::PathBuf,
}

impl DlibFaceAnalyser {
    /// Checks both models load before handing out an analyser.
    pub fn new(
        face_landmark_predictor_model_file_path: std::path::PathBuf,
        face_encoder_model_file_path: std::path::PathBuf,
    ) -> Result<Self, super::AnalyseError> {
        let analyser = Self {
            face_landmark_predictor_model_file_path,
            face_encoder_model_file_path,
        };

        analyser.landmark_predictor()?;
        analyser.face_encoder()?;

        Ok(analyser)
    }

    fn landmark_predictor(
        &self,
    ) -> Result<dlib_face_recognition::LandmarkPredictor, super::AnalyseError> {
        dlib_face_recognition::LandmarkPredictor::open(&self.face_landmark_predictor_model_file_path)
            .map_err(super::AnalyseError::FaceLandmarkPredictorInitFailed)
    }

    fn face_encoder(&self) -> Result<dlib_face_recognition::FaceEncoderNetwork, super::AnalyseError> {
        dlib_face_recognition::FaceEncoderNetwork::open(&self.face_encoder_model_file_path)
            .map_err(super::AnalyseError::FaceEncoderInitFailed)
    }
}

impl super::FaceAnalyser for DlibFaceAnalyser {
    fn face_encodings(
        &self,
        image: &image::RgbImage,
    ) -> Result<Vec<FaceEncoding>, super::AnalyseError> {
        use dlib_face_recognition::{FaceDetectorTrait, FaceEncoderTrait, LandmarkPredictorTrait};

        let image_matrix = dlib_face_recognition::ImageMatrix::from_image(image);

        let face_locations = dlib_face_recognition::FaceDetector::new().face_locations(&image_matrix);

        log::debug!("  FOUND FACE COUNT {}", face_locations.len());

        if face_locations.is_empty() {
            return Ok(Vec::new());
        }

        let face_landmark_predictor = self.landmark_predictor()?;
        let face_encoder = self.face_encoder()?;

        let landmarks: Vec<_> = face_locations
            .iter()
            .map(|face_location| {
                log::debug!(
                    "  FOUND FACE @ {} {} {} {}",
                    face_location.top,
                    face_location.left,
                    face_location.bottom,
                    face_location.right
                );
                face_landmark_predictor.face_landmarks(&image_matrix, face_location)
            })
            .filter(|landmarks| !landmarks.is_empty())
            .collect();

        face_encoder
            .get_face_encodings(&image_matrix, &landmarks, 0)
            .iter()
            .map(|encoding| Ok(FaceEncoding::try_from(&encoding[..])?))
            .collect()
    }
}
