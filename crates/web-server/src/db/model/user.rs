use crate::db::schema::{user_logs, users};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(diesel::Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub cellphone: String,
    pub email: Option<String>,
    pub position: Option<String>,
    pub image_path: String,
    pub encoding: crate::db::model::FaceEncoding,
}

#[derive(Clone, Debug, diesel::Queryable)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub cellphone: String,
    pub email: Option<String>,
    pub position: Option<String>,
    pub image_path: String,
    pub encoding: crate::db::model::FaceEncoding,
}

fn expect_single_row(
    result: Result<usize, crate::db::QueryError>,
) -> Result<(), crate::db::UpdateQueryError> {
    result
        .map_err(crate::db::UpdateQueryError::QueryError)
        .and_then(|result| match result {
            0 => Err(crate::db::UpdateQueryError::NoSuchRecord),
            _ => Ok(()),
        })
}

impl User {
    pub async fn insert(
        db: &crate::db::System,
        new_user: NewUser,
    ) -> Result<i32, crate::db::QueryError> {
        db.run_query({
            let db = db.clone();
            move |db_connection| {
                let _guard = db.users_insertion_guard().lock();

                diesel::insert_into(users::table)
                    .values(&new_user)
                    .execute(db_connection)?;

                users::table
                    .select(users::id)
                    .order(users::id.desc())
                    .first::<i32>(db_connection)
            }
        })
        .await
    }

    pub async fn fetch(
        db: &crate::db::System,
        user_id: i32,
    ) -> Result<Option<Self>, crate::db::QueryError> {
        db.run_query(move |db_connection| {
            users::table
                .filter(users::id.eq(user_id))
                .limit(1)
                .load::<Self>(db_connection)
        })
        .await
        .map(|mut users| users.pop())
    }

    pub async fn fetch_all(db: &crate::db::System) -> Result<Vec<Self>, crate::db::QueryError> {
        db.run_query(move |db_connection| {
            users::table
                .order_by(users::id)
                .load::<Self>(db_connection)
        })
        .await
    }

    pub async fn update_name(
        db: &crate::db::System,
        user_id: i32,
        name: String,
    ) -> Result<(), crate::db::UpdateQueryError> {
        expect_single_row(
            db.run_query(move |db_connection| {
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set(users::name.eq(name))
                    .execute(db_connection)
            })
            .await,
        )
    }

    pub async fn update_cellphone(
        db: &crate::db::System,
        user_id: i32,
        cellphone: String,
    ) -> Result<(), crate::db::UpdateQueryError> {
        expect_single_row(
            db.run_query(move |db_connection| {
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set(users::cellphone.eq(cellphone))
                    .execute(db_connection)
            })
            .await,
        )
    }

    pub async fn update_image_path(
        db: &crate::db::System,
        user_id: i32,
        image_path: String,
    ) -> Result<(), crate::db::UpdateQueryError> {
        expect_single_row(
            db.run_query(move |db_connection| {
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set(users::image_path.eq(image_path))
                    .execute(db_connection)
            })
            .await,
        )
    }

    pub async fn update_image(
        db: &crate::db::System,
        user_id: i32,
        image_path: String,
        encoding: crate::db::model::FaceEncoding,
    ) -> Result<(), crate::db::UpdateQueryError> {
        expect_single_row(
            db.run_query(move |db_connection| {
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set((users::image_path.eq(image_path), users::encoding.eq(encoding)))
                    .execute(db_connection)
            })
            .await,
        )
    }

    /// Deletes the user along with its recognition logs, returning the path
    /// of its stored image.
    pub async fn delete(
        db: &crate::db::System,
        user_id: i32,
    ) -> Result<String, crate::db::UpdateQueryError> {
        db.run_query(move |db_connection| {
            use diesel::Connection;

            db_connection.transaction::<_, diesel::result::Error, _>(|db_connection| {
                let mut image_paths = users::table
                    .select(users::image_path)
                    .filter(users::id.eq(user_id))
                    .load::<String>(db_connection)?;

                diesel::delete(user_logs::table.filter(user_logs::user_id.eq(user_id)))
                    .execute(db_connection)?;

                diesel::delete(users::table.filter(users::id.eq(user_id)))
                    .execute(db_connection)?;

                Ok(image_paths.pop())
            })
        })
        .await
        .map_err(crate::db::UpdateQueryError::QueryError)
        .and_then(|image_path| image_path.ok_or(crate::db::UpdateQueryError::NoSuchRecord))
    }
}

impl From<User> for facegate_web_core::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            cellphone: user.cellphone,
            email: user.email,
            position: user.position,
            image_path: user.image_path,
        }
    }
}

#[cfg(test)]
pub fn new_user(name: &str, cellphone: &str, encoding: f64) -> NewUser {
    NewUser {
        name: name.to_string(),
        cellphone: cellphone.to_string(),
        email: None,
        position: None,
        image_path: format!("{}.jpg", name),
        encoding: crate::db::model::face_encoding::uniform(encoding),
    }
}
