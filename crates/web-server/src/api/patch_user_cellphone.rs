use actix_web::{patch, web, HttpRequest, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(inherit)]
    #[error(transparent)]
    FormError(#[from] super::form::Error),
    #[status_code(BAD_REQUEST)]
    #[error(transparent)]
    ValidationError(#[from] crate::validation::ValidationError),
    #[status_code(BAD_REQUEST)]
    #[error("A user with this cellphone is already registered")]
    AlreadyRegistered,
    #[error("Database update failed")]
    DatabaseQueryError(#[source] crate::db::QueryError),
    #[status_code(NOT_FOUND)]
    #[error("User not found")]
    NotFound,
}

impl From<crate::db::UpdateQueryError> for Error {
    fn from(err: crate::db::UpdateQueryError) -> Self {
        match err {
            crate::db::UpdateQueryError::QueryError(err) => err.into(),
            crate::db::UpdateQueryError::NoSuchRecord => Self::NotFound,
        }
    }
}

impl From<crate::db::QueryError> for Error {
    fn from(err: crate::db::QueryError) -> Self {
        if err.is_unique_violation() {
            Self::AlreadyRegistered
        } else {
            Self::DatabaseQueryError(err)
        }
    }
}

/// Changes a user's cellphone. An absent or blank value leaves the user
/// unchanged.
#[patch("/users/{id:\\d+}/cellphone")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    user_id: web::Path<i32>,
    req: HttpRequest,
    payload: web::Payload,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    let user_id = user_id.into_inner();

    log::debug!("PATCH /users/{}/cellphone", user_id);

    let mut form =
        super::form::Form::read_text(&req, payload, &["cellphone"], crate::MAX_IMAGE_SIZE).await?;

    if let Some(cellphone) = crate::validation::non_blank(form.text("cellphone")) {
        let cellphone = crate::validation::validate_cellphone(&cellphone)?;
        crate::db::model::User::update_cellphone(&db, user_id, cellphone).await?;
    }

    crate::db::model::User::fetch(&db, user_id)
        .await?
        .ok_or(Error::NotFound)
        .map(|user| HttpResponse::Ok().json(facegate_web_core::User::from(user)))
}
