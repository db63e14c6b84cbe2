use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::TokenService;

#[derive(Debug, crate::api::Error, thiserror::Error)]
pub enum AuthError {
    #[status_code(UNAUTHORIZED)]
    #[error("Not authenticated")]
    MissingToken,
    #[status_code(UNAUTHORIZED)]
    #[error("Could not validate credentials")]
    InvalidToken(#[source] token::TokenError),
    #[status_code(UNAUTHORIZED)]
    #[error("Could not validate credentials")]
    UnknownAdmin,
    #[error("Failed to look up administrator")]
    LookupFailed(#[source] crate::db::QueryError),
    #[error("Authentication is not configured")]
    NotConfigured,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

/// Extracts the administrator named by the request's bearer token.
///
/// Endpoints take this as an argument to require authentication.
pub struct AuthenticatedAdmin(pub crate::db::model::Admin);

impl FromRequest for AuthenticatedAdmin {
    type Error = AuthError;
    type Future = futures::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let tokens = req.app_data::<web::Data<TokenService>>().cloned();
        let db = req.app_data::<web::Data<crate::db::System>>().cloned();

        Box::pin(async move {
            let (tokens, db) = tokens.zip(db).ok_or(AuthError::NotConfigured)?;

            let claims = tokens
                .validate(&token.ok_or(AuthError::MissingToken)?)
                .map_err(AuthError::InvalidToken)?;

            crate::db::model::Admin::fetch_by_name(&db, claims.sub)
                .await
                .map_err(AuthError::LookupFailed)?
                .map(AuthenticatedAdmin)
                .ok_or(AuthError::UnknownAdmin)
        })
    }
}
