use actix_web::{post, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(BAD_REQUEST)]
    #[error("Admin already registered")]
    AlreadyRegistered,
    #[status_code(BAD_REQUEST)]
    #[error("Name and password are required")]
    MissingCredentials,
    #[error("Failed to hash password")]
    HashPasswordError(#[from] crate::auth::password::HashPasswordError),
    #[error("Failed to record admin in database")]
    RecordAdminFailed(#[source] crate::db::QueryError),
    #[error("Operation cancelled")]
    OperationCancelled,
}

#[post("/admin/register")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    new_admin: web::Json<facegate_web_core::NewAdmin>,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    let facegate_web_core::NewAdmin { name, password } = new_admin.into_inner();
    let name = name.trim().to_string();

    log::debug!("POST /admin/register {:?}", name);

    if name.is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let hashed_password = web::block(move || crate::auth::hash_password(&password))
        .await
        .map_err(|_| Error::OperationCancelled)??;

    let id = crate::db::model::Admin::insert(&db, name.clone(), hashed_password)
        .await
        .map_err(|err| {
            if err.is_unique_violation() {
                Error::AlreadyRegistered
            } else {
                Error::RecordAdminFailed(err)
            }
        })?;

    log::info!("Registered admin {} ({})", name, id);

    Ok(HttpResponse::Ok().json(facegate_web_core::Admin { id, name }))
}
