pub mod admin;
pub mod face_encoding;
pub mod user;
pub mod user_log;

pub use admin::Admin;
pub use face_encoding::FaceEncoding;
pub use user::{NewUser, User};
pub use user_log::UserLog;
