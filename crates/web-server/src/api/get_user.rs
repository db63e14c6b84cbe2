use actix_web::{get, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error("Database query failed")]
    DatabaseQueryError(#[from] crate::db::QueryError),
    #[status_code(NOT_FOUND)]
    #[error("User not found")]
    NotFound,
}

#[get("/users/{id:\\d+}")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    user_id: web::Path<i32>,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    crate::db::model::User::fetch(&db, *user_id)
        .await?
        .ok_or(Error::NotFound)
        .map(|user| HttpResponse::Ok().json(facegate_web_core::User::from(user)))
}
