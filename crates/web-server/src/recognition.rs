use actix_web::web;

#[derive(Debug, crate::api::Error, thiserror::Error)]
pub enum Error {
    #[status_code(BAD_REQUEST)]
    #[error("Could not decode the submitted image, check its format")]
    ImageLoadFailed(#[source] crate::image_ext::NewImageExtError),
    #[error("Failed to fetch known faces")]
    FetchKnownFacesFailed(#[source] crate::db::QueryError),
    #[error("Failed to analyse the image")]
    AnalyseFailed(#[source] crate::face::AnalyseError),
    #[error("Operation cancelled")]
    OperationCancelled,
}

/// Matches the faces in `bytes` against every registered user and records a
/// log entry for each one recognised.
///
/// Malformed images are rejected even when no users are registered; face
/// detection is skipped in that case. A failed log write is reported but does
/// not fail the recognition.
pub async fn recognise(
    db: &crate::db::System,
    face_analyser: web::Data<dyn crate::face::FaceAnalyser>,
    bytes: web::Bytes,
    tolerance: crate::api::Tolerance,
) -> Result<facegate_web_core::Recognition, Error> {
    let image = web::block(move || crate::image_ext::ImageExt::new(&bytes))
        .await
        .map_err(|_| Error::OperationCancelled)?
        .map_err(Error::ImageLoadFailed)?;

    let users = crate::db::model::User::fetch_all(db)
        .await
        .map_err(Error::FetchKnownFacesFailed)?;

    log::debug!("  KNOWN FACE COUNT {}", users.len());

    if users.is_empty() {
        log::info!("Recognition attempted with no registered users");
        return Ok(facegate_web_core::Recognition::default());
    }

    let faces = web::block(move || face_analyser.face_encodings(&image.to_rgb8()))
        .await
        .map_err(|_| Error::OperationCancelled)?
        .map_err(Error::AnalyseFailed)?;

    log::debug!("  FOUND FACE COUNT {}", faces.len());

    let known: Vec<_> = users.iter().map(|user| &user.encoding).collect();
    let matches = crate::face::matcher::match_faces(&known, &faces, tolerance.0);

    let log_time = chrono::Utc::now().naive_utc();
    let mut recognized_people = Vec::with_capacity(matches.len());

    for found in matches {
        let user = &users[found.index];

        log::info!(
            "Recognised {} ({}) at distance {:.3}",
            user.name,
            user.id,
            found.distance
        );

        if let Err(err) = crate::db::model::UserLog::insert(db, user.id, log_time).await {
            log::error!(
                "Failed to record log for user {} ({}): {}",
                user.name,
                user.id,
                err
            );
        }

        recognized_people.push(facegate_web_core::RecognisedPerson {
            id: user.id,
            name: user.name.clone(),
            cellphone: user.cellphone.clone(),
            image_path: user.image_path.clone(),
            log_time,
        });
    }

    Ok(facegate_web_core::Recognition::from(recognized_people))
}
