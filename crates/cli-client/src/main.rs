mod resolved_path;

use resolved_path::{ResolvedPath, ResolvedPathError};

const MAX_PENDING_REQUESTS: usize = 4;

type PendingResponse = futures::future::BoxFuture<
    'static,
    (
        std::path::PathBuf,
        Result<hyper::Response<hyper::Body>, hyper::Error>,
    ),
>;

type PendingResponses = futures::stream::futures_unordered::FuturesUnordered<PendingResponse>;

#[derive(Debug, thiserror::Error)]
enum NewClientError {
    #[error("Invalid host '{0}'")]
    InvalidHost(String, #[source] http::uri::InvalidUri),
    #[error("Invalid request URI")]
    InvalidUri(#[source] http::Error),
    #[error("Invalid path")]
    InvalidPath(#[source] ResolvedPathError),
}

#[derive(Debug, thiserror::Error)]
enum MakeBodyError {
    #[error("Failed to open {0:?}")]
    FileOpenError(std::path::PathBuf, #[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
enum MakeRequestError {
    #[error("Failed to create body")]
    MakeBodyError(#[from] MakeBodyError),
    #[error("Failed to build request")]
    BuildError(#[from] http::Error),
}

#[derive(Debug, thiserror::Error)]
enum LoginError {
    #[error(transparent)]
    NewClientError(#[from] NewClientError),
    #[error("Failed to read password")]
    ReadPasswordError(#[source] std::io::Error),
    #[error("Failed to build request")]
    BuildError(#[from] http::Error),
    #[error("Request failed")]
    RequestError(#[from] hyper::Error),
    #[error("Unexpected response from server")]
    BadResponse(#[source] serde_json::Error),
    #[error("Login rejected: {0}")]
    Rejected(facegate_web_core::ErrorDesc),
}

fn endpoint_uri(host: &str, path: &'static str) -> Result<http::Uri, NewClientError> {
    http::uri::Builder::new()
        .scheme(http::uri::Scheme::HTTP)
        .authority(
            http::uri::Authority::try_from(host)
                .map_err(|err| NewClientError::InvalidHost(host.to_string(), err))?,
        )
        .path_and_query(path)
        .build()
        .map_err(NewClientError::InvalidUri)
}

fn describe_error_body(bytes: &[u8]) -> String {
    serde_json::from_slice::<facegate_web_core::ErrorDesc>(bytes)
        .map(|error| error.to_string())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

fn describe_recognition(recognition: &facegate_web_core::Recognition) -> String {
    if recognition.recognized_people.is_empty() {
        return "no one recognised".to_string();
    }

    recognition
        .recognized_people
        .iter()
        .map(|person| format!("{} ({})", person.name, person.cellphone))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Posts every image beneath a path to the recognition endpoint, keeping a
/// bounded number of requests in flight.
struct Recogniser {
    http_client: hyper::client::Client<hyper::client::HttpConnector>,
    file_paths: Vec<Result<std::path::PathBuf, ResolvedPathError>>,
    responses: PendingResponses,
    uri: http::Uri,
}

impl Recogniser {
    pub fn new(host: &str, root: std::path::PathBuf) -> Result<Self, NewClientError> {
        let mut file_paths = ResolvedPath::try_from(root)
            .map_err(NewClientError::InvalidPath)?
            .image_files();

        // Requests are popped off the back
        file_paths.reverse();

        Ok(Self {
            http_client: hyper::client::Client::new(),
            responses: PendingResponses::new(),
            uri: endpoint_uri(host, "/recognition/recognize")?,
            file_paths,
        })
    }

    pub async fn run(&mut self) {
        use futures::StreamExt;

        self.enqueue_requests().await;

        while let Some((file_path, response_result)) = self.responses.next().await {
            match response_result {
                Ok(response) => Self::report(&file_path, response).await,
                Err(err) => Self::log_error(&err),
            }

            self.enqueue_requests().await;
        }
    }

    async fn report(file_path: &std::path::Path, response: hyper::Response<hyper::Body>) {
        let status = response.status();

        let bytes = match hyper::body::to_bytes(response.into_body()).await {
            Ok(bytes) => bytes,
            Err(err) => {
                Self::log_error(&err);
                return;
            }
        };

        if status.is_success() {
            match serde_json::from_slice::<facegate_web_core::Recognition>(&bytes) {
                Ok(recognition) => {
                    println!("{}: {}", file_path.display(), describe_recognition(&recognition))
                }
                Err(err) => Self::log_error(&err),
            }
        } else {
            println!(
                "{}: {} ({})",
                file_path.display(),
                describe_error_body(&bytes),
                status.canonical_reason().unwrap_or("Unknown reason")
            );
        }
    }

    async fn enqueue_requests(&mut self) {
        while self.responses.len() < MAX_PENDING_REQUESTS {
            let file_path = match self.file_paths.pop() {
                Some(Ok(file_path)) => file_path,
                Some(Err(err)) => {
                    Self::log_error(&err);
                    continue;
                }
                None => break,
            };

            let request = match Self::make_request(self.uri.clone(), file_path.clone()).await {
                Ok(request) => request,
                Err(err) => {
                    Self::log_error(&err);
                    continue;
                }
            };

            let response = self.http_client.request(request);
            self.responses
                .push(Box::pin(async move { (file_path, response.await) }));
        }
    }

    async fn make_body(file_path: std::path::PathBuf) -> Result<hyper::Body, MakeBodyError> {
        struct BodyFileStream {
            file: tokio::fs::File,
        }

        impl BodyFileStream {
            pin_utils::unsafe_pinned!(file: tokio::fs::File);

            pub fn new(file: tokio::fs::File) -> Self {
                Self { file }
            }
        }

        impl futures::Stream for BodyFileStream {
            type Item =
                Result<hyper::body::Bytes, Box<dyn std::error::Error + 'static + Send + Sync>>;

            fn poll_next(
                self: std::pin::Pin<&mut Self>,
                ctx: &mut futures::task::Context<'_>,
            ) -> futures::task::Poll<Option<Self::Item>> {
                use futures::task::Poll;
                use tokio::io::AsyncRead;

                let mut bytes = vec![0u8; 4096];
                let mut buffer = tokio::io::ReadBuf::new(&mut bytes);

                match self.file().poll_read(ctx, &mut buffer) {
                    Poll::Ready(result) => {
                        let read_count = buffer.filled().len();

                        bytes.truncate(read_count);

                        Poll::Ready(
                            result
                                .map(|_| match read_count {
                                    0 => None,
                                    _ => Some(hyper::body::Bytes::from(bytes)),
                                })
                                .map_err(|err| {
                                    Box::new(err)
                                        as Box<dyn std::error::Error + 'static + Send + Sync>
                                })
                                .transpose(),
                        )
                    }
                    Poll::Pending => Poll::Pending,
                }
            }
        }

        let file = tokio::fs::File::open(&file_path)
            .await
            .map_err(|err| MakeBodyError::FileOpenError(file_path, err))?;

        Ok(hyper::Body::wrap_stream(BodyFileStream::new(file)))
    }

    async fn make_request(
        uri: http::Uri,
        file_path: std::path::PathBuf,
    ) -> Result<hyper::Request<hyper::Body>, MakeRequestError> {
        let content_type = match file_path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            _ => "image/jpeg",
        };

        Ok(hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(uri)
            .header(hyper::header::CONTENT_TYPE, content_type)
            .body(Self::make_body(file_path).await?)?)
    }

    fn log_error(err: &dyn std::error::Error) {
        println!("{}", err);
    }
}

async fn recognize(host: &str, path: std::path::PathBuf) -> Result<(), NewClientError> {
    let mut recogniser = Recogniser::new(host, path)?;
    recogniser.run().await;
    Ok(())
}

async fn login(host: &str, name: &str) -> Result<(), LoginError> {
    let uri = endpoint_uri(host, "/admin/token")?;

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(LoginError::ReadPasswordError)?;

    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("username", name)
        .append_pair("password", password.trim_end_matches(&['\r', '\n'][..]))
        .finish();

    let request = hyper::Request::builder()
        .method(hyper::Method::POST)
        .uri(uri)
        .header(
            hyper::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(hyper::Body::from(body))?;

    let response = hyper::client::Client::new().request(request).await?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;

    if !status.is_success() {
        return Err(match serde_json::from_slice(&bytes) {
            Ok(error) => LoginError::Rejected(error),
            Err(err) => LoginError::BadResponse(err),
        });
    }

    let token = serde_json::from_slice::<facegate_web_core::Token>(&bytes)
        .map_err(LoginError::BadResponse)?;

    println!("{}", token.access_token);

    Ok(())
}

#[derive(structopt::StructOpt)]
#[structopt(about = "Command line client for facegated")]
enum CliOptions {
    /// Exchange admin credentials for an access token. Pipe the password in
    /// on stdin since typed input is echoed
    Login { host: String, name: String },
    /// Submit every jpg/jpeg/png image beneath PATH for recognition.
    Recognize {
        host: String,
        path: std::path::PathBuf,
    },
}

fn print_error(error: &dyn std::error::Error) {
    println!("Error: {}", error);

    let mut current = error.source();
    if current.is_some() {
        println!();
        println!("Caused by:");
        while let Some(error) = current {
            println!("  {}", error);
            current = error.source();
        }
    }
}

#[tokio::main]
async fn main() {
    use structopt::StructOpt;

    let result = match CliOptions::from_args() {
        CliOptions::Login { host, name } => login(&host, &name)
            .await
            .map_err(|err| Box::new(err) as Box<dyn std::error::Error>),
        CliOptions::Recognize { host, path } => recognize(&host, path)
            .await
            .map_err(|err| Box::new(err) as Box<dyn std::error::Error>),
    };

    if let Err(error) = result {
        print_error(error.as_ref());
        std::process::exit(1);
    }
}
