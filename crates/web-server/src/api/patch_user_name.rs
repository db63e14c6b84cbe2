use actix_web::{patch, web, HttpRequest, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(inherit)]
    #[error(transparent)]
    FormError(#[from] super::form::Error),
    #[status_code(BAD_REQUEST)]
    #[error(transparent)]
    ValidationError(#[from] crate::validation::ValidationError),
    #[error("Database update failed")]
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

/// Renames a user. An absent or blank name leaves the user unchanged.
#[patch("/users/{id:\\d+}")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    user_id: web::Path<i32>,
    req: HttpRequest,
    payload: web::Payload,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    let user_id = user_id.into_inner();

    log::debug!("PATCH /users/{}", user_id);

    let mut form =
        super::form::Form::read_text(&req, payload, &["name"], crate::MAX_IMAGE_SIZE).await?;

    if let Some(name) = crate::validation::non_blank(form.text("name")) {
        let name = crate::validation::validate_name(&name)?;
        crate::db::model::User::update_name(&db, user_id, name).await?;
    }

    crate::db::model::User::fetch(&db, user_id)
        .await?
        .ok_or(Error::NotFound)
        .map(|user| HttpResponse::Ok().json(facegate_web_core::User::from(user)))
}
