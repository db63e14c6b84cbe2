use crate::db::schema::admins;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(diesel::Insertable)]
#[diesel(table_name = admins)]
struct NewAdmin {
    pub name: String,
    pub hashed_password: String,
}

#[derive(Debug, diesel::Queryable)]
pub struct Admin {
    pub id: i32,
    pub name: String,
    pub hashed_password: String,
}

impl Admin {
    pub async fn insert(
        db: &crate::db::System,
        name: String,
        hashed_password: String,
    ) -> Result<i32, crate::db::QueryError> {
        db.run_query({
            let db = db.clone();
            move |db_connection| {
                let _guard = db.admins_insertion_guard().lock();

                diesel::insert_into(admins::table)
                    .values(&NewAdmin {
                        name,
                        hashed_password,
                    })
                    .execute(db_connection)?;

                admins::table
                    .select(admins::id)
                    .order(admins::id.desc())
                    .first::<i32>(db_connection)
            }
        })
        .await
    }

    pub async fn fetch_by_name(
        db: &crate::db::System,
        admin_name: String,
    ) -> Result<Option<Self>, crate::db::QueryError> {
        db.run_query(move |db_connection| {
            use crate::db::schema::admins::dsl::*;
            admins
                .select((id, name, hashed_password))
                .filter(name.eq(admin_name))
                .limit(1)
                .load::<Self>(db_connection)
        })
        .await
        .map(|mut admins| admins.pop())
    }
}

impl From<Admin> for facegate_web_core::Admin {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
        }
    }
}
