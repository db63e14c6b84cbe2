#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDesc {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub cause: Option<Box<ErrorDesc>>,
}

impl From<&dyn std::error::Error> for ErrorDesc {
    fn from(error: &dyn std::error::Error) -> Self {
        Self {
            description: format!("{}", error),
            cause: error
                .source()
                .map(|source| Box::new(ErrorDesc::from(source))),
        }
    }
}

impl std::fmt::Display for ErrorDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)?;
        let mut current = self.cause.as_deref();
        while let Some(cause) = current {
            write!(f, ": {}", cause.description)?;
            current = cause.cause.as_deref();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: String::from("bearer"),
        }
    }
}

/// Credentials as posted to the token endpoint.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct NewAdmin {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Admin {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub cellphone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub position: Option<String>,
    pub image_path: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct NameUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct CellphoneUpdate {
    pub cellphone: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LogQueryParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "LogQueryParams::default_limit")]
    pub limit: i64,
}

impl LogQueryParams {
    fn default_limit() -> i64 {
        100
    }
}

impl Default for LogQueryParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserLog {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub user_image_path: String,
    pub log_time: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RecognisedPerson {
    pub id: i32,
    pub name: String,
    pub cellphone: String,
    pub image_path: String,
    pub log_time: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Recognition {
    pub status: bool,
    pub recognized_people: Vec<RecognisedPerson>,
}

impl From<Vec<RecognisedPerson>> for Recognition {
    fn from(recognized_people: Vec<RecognisedPerson>) -> Self {
        Self {
            status: !recognized_people.is_empty(),
            recognized_people,
        }
    }
}
