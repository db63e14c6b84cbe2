use actix_web::{patch, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(inherit)]
    #[error(transparent)]
    FormError(#[from] super::form::Error),
    #[status_code(inherit)]
    #[error(transparent)]
    ReferencePhotoError(#[from] super::reference_photo::Error),
    #[error("Database query failed")]
    DatabaseQueryError(#[source] crate::db::QueryError),
    #[status_code(NOT_FOUND)]
    #[error("User not found")]
    NotFound,
}

impl From<crate::db::UpdateQueryError> for Error {
    fn from(err: crate::db::UpdateQueryError) -> Self {
        match err {
            crate::db::UpdateQueryError::QueryError(err) => Self::DatabaseQueryError(err),
            crate::db::UpdateQueryError::NoSuchRecord => Self::NotFound,
        }
    }
}

impl From<crate::db::QueryError> for Error {
    fn from(err: crate::db::QueryError) -> Self {
        Self::DatabaseQueryError(err)
    }
}

/// Replaces a user's reference photo and face encoding.
#[patch("/users/{id:\\d+}/image")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    user_id: web::Path<i32>,
    multipart: actix_multipart::Multipart,
    db: web::Data<crate::db::System>,
    image_dir: web::Data<crate::api::ImageDirPath>,
    face_analyser: web::Data<dyn crate::face::FaceAnalyser>,
) -> Result<HttpResponse, Error> {
    let user_id = user_id.into_inner();

    log::debug!("PATCH /users/{}/image", user_id);

    let user = crate::db::model::User::fetch(&db, user_id)
        .await?
        .ok_or(Error::NotFound)?;

    let image = super::form::Form::read(multipart, &["image_file"], crate::MAX_IMAGE_SIZE)
        .await?
        .required_file("image_file")?;

    let photo = super::reference_photo::ReferencePhoto::analyse(image, face_analyser).await?;
    let encoding = photo.encoding.clone();

    let file_name = crate::image_ext::user_image_file_name(&user.name, user_id);
    let image_path = photo.save(&image_dir, &file_name).await?;

    crate::db::model::User::update_image(&db, user_id, image_path.clone(), encoding).await?;

    if user.image_path != image_path {
        if let Some(old_file_path) = image_dir.resolve(&user.image_path) {
            if let Err(err) = std::fs::remove_file(&old_file_path) {
                log::warn!("Failed to remove old image {:?}: {}", old_file_path, err);
            }
        }
    }

    crate::db::model::User::fetch(&db, user_id)
        .await?
        .ok_or(Error::NotFound)
        .map(|user| HttpResponse::Ok().json(facegate_web_core::User::from(user)))
}
