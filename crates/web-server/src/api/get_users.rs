use actix_web::{get, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error("Database query failed")]
    DatabaseQueryError(#[from] crate::db::QueryError),
}

#[get("/users")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    Ok(crate::db::model::User::fetch_all(&db).await.map(|users| {
        HttpResponse::Ok().json(
            users
                .into_iter()
                .map(facegate_web_core::User::from)
                .collect::<Vec<_>>(),
        )
    })?)
}
