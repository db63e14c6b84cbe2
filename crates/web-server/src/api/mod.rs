mod delete_user;
mod form;
mod get_admin_me;
mod get_index;
mod get_user;
mod get_user_logs;
mod get_users;
mod patch_user_cellphone;
mod patch_user_image;
mod patch_user_name;
mod post_admin;
mod post_recognition;
mod post_token;
mod post_user;
mod reference_photo;

pub use facegate_web_server_derive::ApiError as Error;

/// URL prefix under which the image directory is served.
pub const IMAGE_URL_PREFIX: &str = "images";

pub struct ImageDirPath(std::path::PathBuf);

impl ImageDirPath {
    /// The path clients fetch a stored image file from.
    pub fn public_path(file_name: &str) -> String {
        format!("{}/{}", IMAGE_URL_PREFIX, file_name)
    }

    /// Maps a stored public path back to its file. Paths that do not point
    /// into the image directory map to nothing.
    pub fn resolve(&self, public_path: &str) -> Option<std::path::PathBuf> {
        let file_name = public_path
            .strip_prefix(IMAGE_URL_PREFIX)?
            .strip_prefix('/')?;

        match std::path::Path::new(file_name).components().collect::<Vec<_>>()[..] {
            [std::path::Component::Normal(file_name)] => Some(self.0.join(file_name)),
            _ => None,
        }
    }
}

impl From<std::path::PathBuf> for ImageDirPath {
    fn from(path: std::path::PathBuf) -> Self {
        Self(path)
    }
}

impl std::ops::Deref for ImageDirPath {
    type Target = std::path::Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Largest distance between two encodings still taken as the same person.
#[derive(Clone, Copy, Debug)]
pub struct Tolerance(pub f64);

impl Default for Tolerance {
    fn default() -> Self {
        Self(crate::face::matcher::DEFAULT_TOLERANCE)
    }
}

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(get_index::endpoint)
        .service(post_token::endpoint)
        .service(post_admin::endpoint)
        .service(get_admin_me::endpoint)
        .service(get_users::endpoint)
        .service(post_user::endpoint)
        .service(get_user::endpoint)
        .service(delete_user::endpoint)
        .service(patch_user_name::endpoint)
        .service(patch_user_cellphone::endpoint)
        .service(patch_user_image::endpoint)
        .service(get_user_logs::endpoint)
        .service(post_recognition::endpoint);
}

#[cfg(test)]
mod tests;
