use diesel::{
    r2d2::{ConnectionManager, Pool, PoolError},
    result::Error as DieselError,
    SqliteConnection,
};

pub mod model;
pub mod schema;

pub type ConnectionPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct Guard(std::sync::Arc<std::sync::Mutex<()>>);

impl Guard {
    pub fn new() -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(())))
    }
}

impl std::ops::Deref for Guard {
    type Target = std::sync::Mutex<()>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewSystemError {
    #[error("Failed to connect to database")]
    DatabaseConnectionError(#[from] diesel::r2d2::PoolError),
    #[error("Failed to perform database migration: {0}")]
    DatabaseMigrationFailed(String),
}

#[derive(Clone)]
pub struct System {
    connection_pool: ConnectionPool,
    admins_guard: Guard,
    users_guard: Guard,
    user_logs_guard: Guard,
}

impl System {
    pub fn new(db_file_path: &std::path::Path) -> Result<Self, NewSystemError> {
        use diesel_migrations::MigrationHarness;

        #[derive(Debug)]
        struct ConnectionCustomiser;

        impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
            for ConnectionCustomiser
        {
            fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
                use diesel::connection::SimpleConnection;
                conn.batch_execute("PRAGMA busy_timeout = 2000;")
                    .and_then(|_| conn.batch_execute("PRAGMA journal_mode = WAL;"))
                    .and_then(|_| conn.batch_execute("PRAGMA synchronous = NORMAL;"))
                    .and_then(|_| conn.batch_execute("PRAGMA foreign_keys = ON;"))
                    .map_err(diesel::r2d2::Error::QueryError)
            }
        }

        let connection_pool = diesel::r2d2::Pool::builder()
            .connection_customizer(Box::new(ConnectionCustomiser))
            .build(ConnectionManager::<SqliteConnection>::new(
                db_file_path.to_string_lossy(),
            ))?;

        connection_pool
            .get()?
            .run_pending_migrations(crate::MIGRATIONS)
            .map_err(|err| NewSystemError::DatabaseMigrationFailed(err.to_string()))?;

        Ok(Self {
            connection_pool,
            admins_guard: Guard::new(),
            users_guard: Guard::new(),
            user_logs_guard: Guard::new(),
        })
    }

    pub fn admins_insertion_guard(&self) -> &Guard {
        &self.admins_guard
    }

    pub fn users_insertion_guard(&self) -> &Guard {
        &self.users_guard
    }

    pub fn user_logs_insertion_guard(&self) -> &Guard {
        &self.user_logs_guard
    }

    pub async fn run_query<F, T>(&self, f: F) -> Result<T, QueryError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, DieselError> + Send + 'static,
        T: Send + 'static,
    {
        let mut connection = self.connection_pool.get()?;

        actix_web::web::block(move || f(&mut connection))
            .await
            .map_err(|_| QueryError::OperationCancelled)?
            .map_err(QueryError::QueryError)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Failed to connect to the database")]
    ConnectionError(#[from] PoolError),
    #[error(transparent)]
    QueryError(DieselError),
    #[error("Operation cancelled")]
    OperationCancelled,
}

impl QueryError {
    /// True when the query was rejected by a `UNIQUE` constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::QueryError(DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ))
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateQueryError {
    #[error(transparent)]
    QueryError(QueryError),
    #[error("No matching record was found")]
    NoSuchRecord,
}
