use actix_web::{delete, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error("Database update failed")]
    DatabaseUpdateQueryError(#[source] crate::db::QueryError),
    #[status_code(NOT_FOUND)]
    #[error("User not found")]
    NotFound,
}

impl From<crate::db::UpdateQueryError> for Error {
    fn from(err: crate::db::UpdateQueryError) -> Self {
        match err {
            crate::db::UpdateQueryError::QueryError(err) => Self::DatabaseUpdateQueryError(err),
            crate::db::UpdateQueryError::NoSuchRecord => Self::NotFound,
        }
    }
}

#[delete("/users/{id:\\d+}")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    user_id: web::Path<i32>,
    db: web::Data<crate::db::System>,
    image_dir: web::Data<crate::api::ImageDirPath>,
) -> Result<HttpResponse, Error> {
    log::debug!("DELETE /users/{}", user_id);

    let image_path = crate::db::model::User::delete(&db, *user_id).await?;

    if let Some(file_path) = image_dir.resolve(&image_path) {
        if let Err(err) = std::fs::remove_file(&file_path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove image {:?}: {}", file_path, err);
            }
        }
    }

    log::info!("Deleted user {}", user_id);

    Ok(HttpResponse::NoContent().finish())
}
