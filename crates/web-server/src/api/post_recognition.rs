use actix_web::{post, web, HttpResponse};

/// Accepts the raw image as the request body, e.g. `image/jpeg` straight
/// from an ESP32-CAM. Needs no authentication.
#[post("/recognition/recognize")]
pub async fn endpoint(
    body: web::Bytes,
    db: web::Data<crate::db::System>,
    face_analyser: web::Data<dyn crate::face::FaceAnalyser>,
    tolerance: web::Data<crate::api::Tolerance>,
) -> Result<HttpResponse, crate::recognition::Error> {
    log::debug!("POST /recognition/recognize {} BYTES", body.len());

    crate::recognition::recognise(&db, face_analyser, body, **tolerance)
        .await
        .map(|recognition| HttpResponse::Ok().json(recognition))
}
