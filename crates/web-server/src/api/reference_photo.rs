use actix_web::web;

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(BAD_REQUEST)]
    #[error("Could not decode the uploaded image, check its format")]
    ImageLoadFailed(#[source] crate::image_ext::NewImageExtError),
    #[status_code(BAD_REQUEST)]
    #[error(transparent)]
    FaceCount(#[from] crate::face::SingleFaceError),
    #[error("Failed to analyse the image")]
    AnalyseFailed(#[source] crate::face::AnalyseError),
    #[error("Failed to create the image directory")]
    CreateImageDirError(#[source] std::io::Error),
    #[error("Failed to store the image")]
    SaveImageFailed(#[source] image::ImageError),
    #[error("Operation cancelled")]
    OperationCancelled,
}

/// A decoded photo showing exactly one face.
pub struct ReferencePhoto {
    image: crate::image_ext::ImageExt,
    pub encoding: crate::db::model::FaceEncoding,
}

impl ReferencePhoto {
    pub async fn analyse(
        bytes: Vec<u8>,
        face_analyser: web::Data<dyn crate::face::FaceAnalyser>,
    ) -> Result<Self, Error> {
        let (image, encodings) = web::block(move || {
            let image = crate::image_ext::ImageExt::new(&bytes).map_err(Error::ImageLoadFailed)?;
            let encodings = face_analyser
                .face_encodings(&image.to_rgb8())
                .map_err(Error::AnalyseFailed)?;
            Ok::<_, Error>((image, encodings))
        })
        .await
        .map_err(|_| Error::OperationCancelled)??;

        log::debug!("  FOUND FACE COUNT {}", encodings.len());

        Ok(Self {
            image,
            encoding: crate::face::single_face(encodings)?,
        })
    }

    /// Writes the photo into `image_dir` as `file_name`, returning the public
    /// path it is served from.
    pub async fn save(
        self,
        image_dir: &super::ImageDirPath,
        file_name: &str,
    ) -> Result<String, Error> {
        std::fs::create_dir_all(&**image_dir).map_err(Error::CreateImageDirError)?;

        let image_path = image_dir.join(file_name);

        log::debug!("  IMAGE PATH {:?}", image_path);

        let image = self.image;
        web::block(move || image.save_jpeg(&image_path))
            .await
            .map_err(|_| Error::OperationCancelled)?
            .map_err(Error::SaveImageFailed)?;

        Ok(super::ImageDirPath::public_path(file_name))
    }
}
