use crate::db::model::FaceEncoding;

#[cfg(feature = "dlib")]
pub mod dlib;
pub mod matcher;

#[derive(Debug, thiserror::Error)]
pub enum AnalyseError {
    #[error("Failed to setup face landmark predictor: {0}")]
    FaceLandmarkPredictorInitFailed(String),
    #[error("Failed to setup face encoder: {0}")]
    FaceEncoderInitFailed(String),
    #[error("Face encoder produced an unusable encoding")]
    BadEncoding(#[from] crate::db::model::face_encoding::BadFaceEncodingLengthError),
}

/// Finds the faces in an image and encodes each one.
///
/// Implementations wrap an external face recognition library; the server only
/// ever compares the encodings they return.
pub trait FaceAnalyser: Send + Sync {
    fn face_encodings(&self, image: &image::RgbImage) -> Result<Vec<FaceEncoding>, AnalyseError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SingleFaceError {
    #[error("No face detected in the image")]
    NoFace,
    #[error("More than one face detected in the image, please provide a photo of a single face")]
    MultipleFaces(usize),
}

/// Reduces the analysis of a reference photo to its one face.
pub fn single_face(mut encodings: Vec<FaceEncoding>) -> Result<FaceEncoding, SingleFaceError> {
    match encodings.len() {
        0 => Err(SingleFaceError::NoFace),
        1 => Ok(encodings.remove(0)),
        count => Err(SingleFaceError::MultipleFaces(count)),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Reports the same faces for every image it is shown.
    pub struct StubAnalyser(pub Vec<FaceEncoding>);

    impl FaceAnalyser for StubAnalyser {
        fn face_encodings(
            &self,
            _image: &image::RgbImage,
        ) -> Result<Vec<FaceEncoding>, AnalyseError> {
            Ok(self.0.clone())
        }
    }
}
