use actix_web::{get, HttpResponse};

#[get("/admin/me")]
pub async fn endpoint(admin: crate::auth::AuthenticatedAdmin) -> HttpResponse {
    HttpResponse::Ok().json(facegate_web_core::Admin::from(admin.0))
}
