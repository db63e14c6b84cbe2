#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error("Failed to connect to database")]
    DatabaseInitError(#[from] facegated::db::NewSystemError),
    #[error("Failed to read the password")]
    ReadPasswordError(#[source] std::io::Error),
    #[error("Name and password must not be empty")]
    EmptyCredentials,
    #[error("Failed to hash password")]
    HashPasswordError(#[from] facegated::auth::password::HashPasswordError),
    #[error("Admin '{0}' already exists")]
    AlreadyExists(String),
    #[error("Failed to record admin in database")]
    RecordAdminFailed(#[source] facegated::db::QueryError),
}

fn read_password() -> Result<String, AdminError> {
    eprint!("Password: ");

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(AdminError::ReadPasswordError)?;

    Ok(password.trim_end_matches(&['\r', '\n'][..]).to_string())
}

async fn create(db_file_path: std::path::PathBuf, name: String) -> Result<i32, AdminError> {
    let name = name.trim().to_string();
    let password = read_password()?;

    if name.is_empty() || password.is_empty() {
        return Err(AdminError::EmptyCredentials);
    }

    let db = facegated::db::System::new(&db_file_path)?;

    facegated::db::model::Admin::insert(&db, name.clone(), facegated::auth::hash_password(&password)?)
        .await
        .map_err(|err| {
            if err.is_unique_violation() {
                AdminError::AlreadyExists(name)
            } else {
                AdminError::RecordAdminFailed(err)
            }
        })
}

#[derive(structopt::StructOpt)]
enum CliOptions {
    /// Creates an administrator. Pipe its password in on stdin since typed
    /// input is echoed
    Create {
        #[structopt(
            long,
            env = "FACEGATED_DB_FILE_PATH",
            default_value = "/var/lib/facegate/facegate.db"
        )]
        db_file_path: std::path::PathBuf,
        #[structopt(long)]
        name: String,
    },
}

#[actix_web::main]
async fn main() {
    use structopt::StructOpt;

    env_logger::init_from_env(env_logger::Env::new().filter("FACEGATED_LOG"));

    let result = match CliOptions::from_args() {
        CliOptions::Create { db_file_path, name } => create(db_file_path, name.clone())
            .await
            .map(|id| println!("Administrator '{}' created with id {}", name.trim(), id)),
    };

    if let Err(error) = result {
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
