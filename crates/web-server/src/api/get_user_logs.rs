use actix_web::{get, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error("Database query failed")]
    DatabaseQueryError(#[from] crate::db::QueryError),
    #[status_code(BAD_REQUEST)]
    #[error("skip and limit must not be negative")]
    NegativePage,
}

#[get("/users_log")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    query: web::Query<facegate_web_core::LogQueryParams>,
    db: web::Data<crate::db::System>,
) -> Result<HttpResponse, Error> {
    if query.skip < 0 || query.limit < 0 {
        return Err(Error::NegativePage);
    }

    Ok(crate::db::model::UserLog::fetch_page(&db, query.skip, query.limit)
        .await
        .map(|logs| {
            HttpResponse::Ok().json(
                logs.into_iter()
                    .map(facegate_web_core::UserLog::from)
                    .collect::<Vec<_>>(),
            )
        })?)
}
