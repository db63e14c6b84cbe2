use actix_web::{get, HttpResponse};

#[get("/")]
pub async fn endpoint() -> HttpResponse {
    HttpResponse::Ok().json(facegate_web_core::Message {
        message: String::from("Welcome to the facial recognition API!"),
    })
}
