use actix_web::{post, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(inherit)]
    #[error(transparent)]
    FormError(#[from] super::form::Error),
    #[status_code(BAD_REQUEST)]
    #[error(transparent)]
    ValidationError(#[from] crate::validation::ValidationError),
    #[status_code(inherit)]
    #[error(transparent)]
    ReferencePhotoError(#[from] super::reference_photo::Error),
    #[status_code(BAD_REQUEST)]
    #[error("A user with this cellphone or email is already registered")]
    AlreadyRegistered,
    #[error("Failed to record user in database")]
    RecordUserFailed(#[source] crate::db::QueryError),
    #[error("Failed to record the user's image path")]
    RecordImagePathFailed(#[source] crate::db::UpdateQueryError),
    #[error("Failed to fetch the new user")]
    FetchUserFailed(#[source] crate::db::QueryError),
}

#[post("/users")]
pub async fn endpoint(
    _admin: crate::auth::AuthenticatedAdmin,
    multipart: actix_multipart::Multipart,
    db: web::Data<crate::db::System>,
    image_dir: web::Data<crate::api::ImageDirPath>,
    face_analyser: web::Data<dyn crate::face::FaceAnalyser>,
) -> Result<HttpResponse, Error> {
    use crate::validation::{non_blank, validate_cellphone, validate_email, validate_name};

    log::debug!("POST /users");

    let mut form = super::form::Form::read(
        multipart,
        &["name", "cellphone", "email", "position", "image_file"],
        crate::MAX_IMAGE_SIZE,
    )
    .await?;

    let name = validate_name(&form.required_text("name")?)?;
    let cellphone = validate_cellphone(&form.required_text("cellphone")?)?;
    let email = non_blank(form.text("email"))
        .map(|email| validate_email(&email))
        .transpose()?;
    let position = non_blank(form.text("position")).map(|position| position.trim().to_string());
    let image = form.required_file("image_file")?;

    let photo = super::reference_photo::ReferencePhoto::analyse(image, face_analyser).await?;

    let user_id = crate::db::model::User::insert(
        &db,
        crate::db::model::NewUser {
            name: name.clone(),
            cellphone,
            email,
            position,
            image_path: String::new(),
            encoding: photo.encoding.clone(),
        },
    )
    .await
    .map_err(|err| {
        if err.is_unique_violation() {
            Error::AlreadyRegistered
        } else {
            Error::RecordUserFailed(err)
        }
    })?;

    log::debug!("  USER ID {}", user_id);

    let file_name = crate::image_ext::user_image_file_name(&name, user_id);
    let image_path = match photo.save(&image_dir, &file_name).await {
        Ok(image_path) => image_path,
        Err(err) => {
            discard(&db, &image_dir, user_id, None).await;
            return Err(err.into());
        }
    };

    if let Err(err) =
        crate::db::model::User::update_image_path(&db, user_id, image_path.clone()).await
    {
        discard(&db, &image_dir, user_id, Some(&image_path)).await;
        return Err(Error::RecordImagePathFailed(err));
    }

    let user = crate::db::model::User::fetch(&db, user_id)
        .await
        .map_err(Error::FetchUserFailed)?
        .ok_or(Error::RecordImagePathFailed(crate::db::UpdateQueryError::NoSuchRecord))?;

    log::info!("Registered user {} ({})", user.name, user.id);

    Ok(HttpResponse::Created().json(facegate_web_core::User::from(user)))
}

/// Undoes a half finished registration.
async fn discard(
    db: &crate::db::System,
    image_dir: &crate::api::ImageDirPath,
    user_id: i32,
    image_path: Option<&str>,
) {
    if let Err(err) = crate::db::model::User::delete(db, user_id).await {
        log::error!("Failed to roll back user {}: {}", user_id, err);
    }

    if let Some(file_path) = image_path.and_then(|image_path| image_dir.resolve(image_path)) {
        if let Err(err) = std::fs::remove_file(&file_path) {
            log::warn!("Failed to remove image {:?}: {}", file_path, err);
        }
    }
}
