use std::fmt;
use std::path::PathBuf;

/// Object name suffixes the tool accepts.
pub const OBJECT_SUFFIXES: [&str; 2] = [".ion.zst", ".10n.zst"];

/// Where the object to dump lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// `[s3://]bucket/key`
    S3 { bucket: String, key: String },
    /// `file://path`
    File(PathBuf),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("invalid s3 path spec {0:?}")]
    InvalidPath(String),

    #[error("no valid bucket specified")]
    MissingBucket,

    #[error("no valid '.ion.zst' object specified: {0:?}")]
    UnsupportedSuffix(String),

    #[error("empty file path in locator")]
    EmptyFilePath,

    #[error("an endpoint (-e) is required for s3 objects")]
    MissingEndpoint,
}

impl Locator {
    /// Parse a `-f` argument.
    ///
    /// ```text
    /// s3://bucket/dir/obj.ion.zst ──▶ S3 { bucket, key: "dir/obj.ion.zst" }
    /// bucket/obj.10n.zst          ──▶ S3 { bucket, key: "obj.10n.zst" }
    /// file:///tmp/obj.ion.zst     ──▶ File("/tmp/obj.ion.zst")
    /// ```
    ///
    /// # Errors
    ///
    /// See [`LocatorError`]. The suffix is checked for both kinds.
    pub fn parse(spec: &str) -> Result<Self, LocatorError> {
        if let Some(path) = spec.strip_prefix("file://") {
            if path.is_empty() {
                return Err(LocatorError::EmptyFilePath);
            }
            check_suffix(path)?;
            return Ok(Self::File(PathBuf::from(path)));
        }

        let spec = spec.strip_prefix("s3://").unwrap_or(spec);
        let Some((bucket, key)) = spec.split_once('/') else {
            return Err(LocatorError::InvalidPath(spec.to_string()));
        };
        if bucket.is_empty() {
            return Err(LocatorError::MissingBucket);
        }
        check_suffix(key)?;
        Ok(Self::S3 {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

fn check_suffix(name: &str) -> Result<(), LocatorError> {
    if OBJECT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        Ok(())
    } else {
        Err(LocatorError::UnsupportedSuffix(name.to_string()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}
