use crate::db::schema::{user_logs, users};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(diesel::Insertable)]
#[diesel(table_name = user_logs)]
struct NewUserLog {
    pub user_id: i32,
    pub log_time: chrono::NaiveDateTime,
}

/// A recognition event joined with the recognised user's details.
#[derive(Debug, diesel::Queryable)]
pub struct UserLog {
    pub id: i32,
    pub user_id: i32,
    pub log_time: chrono::NaiveDateTime,
    pub user_name: String,
    pub user_image_path: String,
}

impl UserLog {
    pub async fn insert(
        db: &crate::db::System,
        user_id: i32,
        log_time: chrono::NaiveDateTime,
    ) -> Result<i32, crate::db::QueryError> {
        db.run_query({
            let db = db.clone();
            move |db_connection| {
                let _guard = db.user_logs_insertion_guard().lock();

                diesel::insert_into(user_logs::table)
                    .values(&NewUserLog { user_id, log_time })
                    .execute(db_connection)?;

                user_logs::table
                    .select(user_logs::id)
                    .order(user_logs::id.desc())
                    .first::<i32>(db_connection)
            }
        })
        .await
    }

    pub async fn fetch_page(
        db: &crate::db::System,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Self>, crate::db::QueryError> {
        db.run_query(move |db_connection| {
            user_logs::table
                .inner_join(users::table)
                .select((
                    user_logs::id,
                    user_logs::user_id,
                    user_logs::log_time,
                    users::name,
                    users::image_path,
                ))
                .order_by(user_logs::id)
                .offset(skip)
                .limit(limit)
                .load::<Self>(db_connection)
        })
        .await
    }
}

impl From<UserLog> for facegate_web_core::UserLog {
    fn from(log: UserLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            user_name: log.user_name,
            user_image_path: log.user_image_path,
            log_time: log.log_time,
        }
    }
}
