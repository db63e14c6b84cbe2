use actix_multipart::{Multipart, MultipartError};
use actix_web::{error::PayloadError, web, HttpRequest};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[status_code(BAD_REQUEST)]
    #[error("Failed to parse multipart body")]
    PayloadParsingFailed(#[source] MultipartError),
    #[status_code(BAD_REQUEST)]
    #[error("Failed to read request body")]
    PayloadReadFailed(#[source] PayloadError),
    #[status_code(PAYLOAD_TOO_LARGE)]
    #[error("Request body is larger than {0} bytes")]
    TooLarge(usize),
    #[status_code(BAD_REQUEST)]
    #[error("Field '{0}' is not valid UTF-8")]
    NotUtf8(String),
    #[status_code(BAD_REQUEST)]
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
    #[status_code(UNSUPPORTED_MEDIA_TYPE)]
    #[error("Expected a form body, got '{0}'")]
    UnsupportedContentType(String),
}

/// The requested fields of a `multipart/form-data` or urlencoded body.
#[derive(Default)]
pub struct Form {
    text: std::collections::HashMap<String, String>,
    files: std::collections::HashMap<String, Vec<u8>>,
}

impl Form {
    /// Buffers the fields named in `wanted`, discarding the rest. The whole
    /// body, discarded fields included, may not exceed `limit` bytes.
    pub async fn read(
        mut multipart: Multipart,
        wanted: &[&str],
        limit: usize,
    ) -> Result<Self, Error> {
        use futures::TryStreamExt;

        let mut form = Form::default();
        let mut total = 0;

        while let Some(mut field) = multipart
            .try_next()
            .await
            .map_err(Error::PayloadParsingFailed)?
        {
            let disposition = field.content_disposition();
            let name = disposition.get_name().unwrap_or_default().to_string();
            let is_file = disposition.get_filename().is_some();
            let keep = wanted.iter().any(|wanted| *wanted == name);

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(Error::PayloadParsingFailed)? {
                total += chunk.len();
                if total > limit {
                    return Err(Error::TooLarge(limit));
                }
                if keep {
                    bytes.extend_from_slice(&chunk);
                }
            }

            if !keep {
                log::debug!("  SKIPPED FIELD {:?}", name);
                continue;
            }

            log::debug!("  FIELD {:?} {} BYTES", name, bytes.len());

            if is_file {
                form.files.insert(name, bytes);
            } else {
                let value = String::from_utf8(bytes).map_err(|_| Error::NotUtf8(name.clone()))?;
                form.text.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text fields from a multipart or urlencoded body. An empty body, with or
    /// without a content type, yields no fields.
    pub async fn read_text(
        req: &HttpRequest,
        mut payload: web::Payload,
        wanted: &[&str],
        limit: usize,
    ) -> Result<Self, Error> {
        use futures::StreamExt;

        let content_type = req
            .headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("multipart/form-data") {
            return Self::read(Multipart::new(req.headers(), payload), wanted, limit).await;
        }

        let mut body = web::BytesMut::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(Error::PayloadReadFailed)?;
            if body.len() + chunk.len() > limit {
                return Err(Error::TooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Ok(Self::default());
        }

        if !content_type.starts_with("application/x-www-form-urlencoded") {
            return Err(Error::UnsupportedContentType(content_type));
        }

        Ok(Self {
            text: url::form_urlencoded::parse(&body)
                .filter(|(name, _)| wanted.iter().any(|wanted| *wanted == *name))
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect(),
            files: Default::default(),
        })
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }

    pub fn required_text(&mut self, name: &'static str) -> Result<String, Error> {
        self.text(name).ok_or(Error::MissingField(name))
    }

    pub fn required_file(&mut self, name: &'static str) -> Result<Vec<u8>, Error> {
        self.files
            .remove(name)
            .filter(|bytes| !bytes.is_empty())
            .ok_or(Error::MissingField(name))
    }
}
