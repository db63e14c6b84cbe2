use actix_web::{post, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(BAD_REQUEST)]
    #[error("Username and password are required")]
    MissingCredentials,
    #[status_code(UNAUTHORIZED)]
    #[error("Incorrect username or password")]
    IncorrectCredentials,
    #[error("Database query failed")]
    DatabaseQueryError(#[from] crate::db::QueryError),
    #[error("Failed to issue token")]
    TokenError(#[from] crate::auth::token::TokenError),
    #[error("Operation cancelled")]
    OperationCancelled,
}

#[post("/admin/token")]
pub async fn endpoint(
    form: web::Form<facegate_web_core::LoginForm>,
    db: web::Data<crate::db::System>,
    tokens: web::Data<crate::auth::TokenService>,
) -> Result<HttpResponse, Error> {
    let facegate_web_core::LoginForm { username, password } = form.into_inner();

    log::debug!("POST /admin/token {:?}", username);

    if username.is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let admin = crate::db::model::Admin::fetch_by_name(&db, username)
        .await?
        .ok_or(Error::IncorrectCredentials)?;

    let hashed_password = admin.hashed_password.clone();
    let verified = web::block(move || crate::auth::verify_password(&password, &hashed_password))
        .await
        .map_err(|_| Error::OperationCancelled)?;

    if !verified {
        return Err(Error::IncorrectCredentials);
    }

    Ok(HttpResponse::Ok().json(facegate_web_core::Token::bearer(tokens.issue(&admin.name)?)))
}
