#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("Failed to connect to database")]
    DatabaseInitError(#[from] facegated::db::NewSystemError),
    #[error("Failed to create the image directory {0:?}")]
    CreateImageDirError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Failed to load the face recognition models")]
    FaceAnalyserInitError(#[from] facegated::face::AnalyseError),
    #[error("Failed to bind listen socket")]
    BindError(#[source] std::io::Error),
    #[error("Failed to run server")]
    RunError(#[source] std::io::Error),
}

async fn run(cli_options: CliOptions) -> Result<(), ServerError> {
    let db = facegated::db::System::new(&cli_options.db_file_path)?;

    std::fs::create_dir_all(&cli_options.image_dir_path)
        .map_err(|err| ServerError::CreateImageDirError(cli_options.image_dir_path.clone(), err))?;

    let face_analyser = facegated::face::dlib::DlibFaceAnalyser::new(
        cli_options.face_landmark_predictor_model_file_path,
        cli_options.face_encoder_model_file_path,
    )?;

    let state = facegated::AppState {
        db,
        image_dir_path: cli_options.image_dir_path,
        face_analyser: std::sync::Arc::new(face_analyser),
        tolerance: facegated::api::Tolerance(cli_options.tolerance),
        tokens: facegated::auth::TokenService::new(
            cli_options.jwt_secret.as_bytes(),
            chrono::Duration::minutes(cli_options.access_token_expiry_minutes),
        ),
    };

    log::info!(
        "Listening on {}:{} with tolerance {}",
        cli_options.host,
        cli_options.port,
        cli_options.tolerance
    );

    actix_web::HttpServer::new(move || facegated::app(state.clone()))
        .bind((cli_options.host.as_str(), cli_options.port))
        .map_err(ServerError::BindError)?
        .run()
        .await
        .map_err(ServerError::RunError)
}

#[derive(structopt::StructOpt)]
struct CliOptions {
    #[structopt(
        long,
        env = "FACEGATED_DB_FILE_PATH",
        default_value = "/var/lib/facegate/facegate.db"
    )]
    db_file_path: std::path::PathBuf,
    #[structopt(
        long,
        env = "FACEGATED_IMAGE_DIR_PATH",
        default_value = "/var/lib/facegate/images"
    )]
    image_dir_path: std::path::PathBuf,
    #[structopt(
        long,
        env = "FACEGATED_FACE_LANDMARK_PREDICTOR_MODEL_FILE_PATH",
        default_value = "/usr/local/share/facegate/shape_predictor_68_face_landmarks.dat"
    )]
    face_landmark_predictor_model_file_path: std::path::PathBuf,
    #[structopt(
        long,
        env = "FACEGATED_FACE_ENCODER_MODEL_FILE_PATH",
        default_value = "/usr/local/share/facegate/dlib_face_recognition_resnet_model_v1.dat"
    )]
    face_encoder_model_file_path: std::path::PathBuf,
    /// Largest encoding distance accepted as a match
    #[structopt(long, env = "FACEGATED_TOLERANCE", default_value = "0.5")]
    tolerance: f64,
    #[structopt(long, env = "FACEGATED_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
    #[structopt(long, env = "FACEGATED_ACCESS_TOKEN_EXPIRY_MINUTES", default_value = "30")]
    access_token_expiry_minutes: i64,
    #[structopt(short, long, env = "FACEGATED_HOST", default_value = "0.0.0.0")]
    host: String,
    #[structopt(short, long, env = "FACEGATED_PORT", default_value = "8000")]
    port: u16,
}

#[actix_web::main]
async fn main() {
    use structopt::StructOpt;

    env_logger::init_from_env(env_logger::Env::new().filter_or("FACEGATED_LOG", "info"));

    let cli_options = CliOptions::from_args();

    if let Err(error) = run(cli_options).await {
        use std::error::Error;

        eprintln!("Error: {}", error);

        let mut current = error.source();
        if current.is_some() {
            eprintln!();
            eprintln!("Caused by:");
            while let Some(error) = current {
                eprintln!("  {}", error);
                current = error.source();
            }
        }

        std::process::exit(1);
    }
}
