pub mod api;
pub mod auth;
pub mod db;
pub mod face;
pub mod image_ext;
pub mod recognition;
pub mod validation;

pub const MIGRATIONS: diesel_migrations::EmbeddedMigrations = diesel_migrations::embed_migrations!();

const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Everything the HTTP handlers share.
#[derive(Clone)]
pub struct AppState {
    pub db: db::System,
    pub image_dir_path: std::path::PathBuf,
    pub face_analyser: std::sync::Arc<dyn face::FaceAnalyser>,
    pub tolerance: api::Tolerance,
    pub tokens: auth::TokenService,
}

impl AppState {
    pub fn configure(self, cfg: &mut actix_web::web::ServiceConfig) {
        use actix_web::web::Data;

        cfg.app_data(Data::new(self.db))
            .app_data(Data::new(api::ImageDirPath::from(
                self.image_dir_path.clone(),
            )))
            .app_data(Data::from(self.face_analyser))
            .app_data(Data::new(self.tolerance))
            .app_data(Data::new(self.tokens))
            .app_data(actix_web::web::PayloadConfig::new(MAX_IMAGE_SIZE))
            .service(actix_files::Files::new(
                &format!("/{}", api::IMAGE_URL_PREFIX),
                self.image_dir_path,
            ))
            .configure(api::configure);
    }
}

pub fn app(
    state: AppState,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    use actix_web::middleware;

    actix_web::App::new()
        .wrap(middleware::NormalizePath::trim())
        .wrap(middleware::Logger::default())
        .configure(|cfg| state.configure(cfg))
}
