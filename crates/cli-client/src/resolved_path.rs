const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn supports_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported_extension| *supported_extension == extension)
}

fn is_image(file_path: &std::path::Path) -> bool {
    file_path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| supports_extension(&extension.to_lowercase()))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ResolvedPathError {
    #[error("Operation failed on directory {0:?}")]
    Dir(std::path::PathBuf, #[source] std::io::Error),
    #[error("Operation failed on path {0:?}")]
    Unknown(std::path::PathBuf, #[source] std::io::Error),
}

pub enum ResolvedPath {
    Dir(std::path::PathBuf),
    File(std::path::PathBuf),
    Other(std::path::PathBuf),
}

impl ResolvedPath {
    /// Every image file at or beneath this path. Unreadable entries are
    /// reported in place rather than aborting the walk.
    pub fn image_files(self) -> Vec<Result<std::path::PathBuf, ResolvedPathError>> {
        let mut files = Vec::new();
        self.gather_files_into(&mut files);
        files
            .into_iter()
            .filter(|file_path_result| match file_path_result {
                Ok(file_path) => is_image(file_path),
                Err(_) => true,
            })
            .collect()
    }

    fn gather_files_into(self, files: &mut Vec<Result<std::path::PathBuf, ResolvedPathError>>) {
        match self {
            Self::Dir(dir_path) => match Self::list(&dir_path) {
                Ok(path_results) => {
                    for path_result in path_results {
                        match path_result {
                            Ok(path) => path.gather_files_into(files),
                            Err(err) => files.push(Err(err)),
                        }
                    }
                }
                Err(err) => files.push(Err(err)),
            },
            Self::File(file_path) => files.push(Ok(file_path)),
            Self::Other(_) => {}
        }
    }

    fn list(
        dir_path: &std::path::Path,
    ) -> Result<Vec<Result<ResolvedPath, ResolvedPathError>>, ResolvedPathError> {
        let mut entries = std::fs::read_dir(dir_path)
            .map_err(|err| ResolvedPathError::Dir(dir_path.to_path_buf(), err))?
            .map(|entry_result| {
                entry_result
                    .map_err(|err| ResolvedPathError::Unknown(dir_path.to_path_buf(), err))
                    .and_then(ResolvedPath::try_from)
            })
            .collect::<Vec<_>>();

        // read_dir order is platform dependent
        entries.sort_by(|a, b| match (a, b) {
            (Ok(a), Ok(b)) => a.path().cmp(b.path()),
            _ => std::cmp::Ordering::Equal,
        });

        Ok(entries)
    }

    fn path(&self) -> &std::path::Path {
        match self {
            Self::Dir(path) | Self::File(path) | Self::Other(path) => path,
        }
    }

    fn try_from_path_and_metadata(
        metadata: Result<std::fs::Metadata, std::io::Error>,
        path: std::path::PathBuf,
    ) -> Result<Self, ResolvedPathError> {
        metadata
            .map_err(|err| ResolvedPathError::Unknown(path.clone(), err))
            .map(|metadata| {
                if metadata.is_dir() {
                    Self::Dir(path)
                } else if metadata.is_file() {
                    Self::File(path)
                } else {
                    Self::Other(path)
                }
            })
    }
}

impl TryFrom<std::path::PathBuf> for ResolvedPath {
    type Error = ResolvedPathError;

    fn try_from(path: std::path::PathBuf) -> Result<Self, Self::Error> {
        Self::try_from_path_and_metadata(std::fs::metadata(&path), path)
    }
}

impl TryFrom<std::fs::DirEntry> for ResolvedPath {
    type Error = ResolvedPathError;

    fn try_from(e: std::fs::DirEntry) -> Result<Self, Self::Error> {
        Self::try_from_path_and_metadata(e.metadata(), e.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directories_for_images() {
        let root = std::env::temp_dir().join(format!("facegate-walk-{}", std::process::id()));
        let nested = root.join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        for file_path in [
            root.join("a.JPG"),
            root.join("notes.txt"),
            root.join("no_extension"),
            nested.join("b.png"),
            nested.join("c.jpeg"),
        ] {
            std::fs::write(file_path, b"").unwrap();
        }

        let files = ResolvedPath::try_from(root.clone())
            .unwrap()
            .image_files()
            .into_iter()
            .map(Result::unwrap)
            .collect::<Vec<_>>();

        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(
            files,
            vec![root.join("a.JPG"), nested.join("b.png"), nested.join("c.jpeg")]
        );
    }

    #[test]
    fn missing_roots_are_errors() {
        assert!(matches!(
            ResolvedPath::try_from(std::path::PathBuf::from("/definitely/not/here")),
            Err(ResolvedPathError::Unknown(..))
        ));
    }
}
