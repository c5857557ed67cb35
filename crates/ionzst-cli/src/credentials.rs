//! Static credentials from the shared AWS credentials file.
//!
//! Only the INI subset that file uses is understood: `[profile]` section
//! headers, `key = value` pairs, and `#`/`;` comment lines.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

// Secrets are redacted.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("cannot locate the credentials file: HOME is not set")]
    NoHomeDirectory,

    #[error("reading credentials file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile {profile:?} not found in {}", path.display())]
    ProfileNotFound { profile: String, path: PathBuf },

    #[error("profile {profile:?} has no {key}")]
    MissingKey { profile: String, key: &'static str },
}

/// The credentials file to read: `override_path` (from
/// `AWS_SHARED_CREDENTIALS_FILE`) or `<home>/.aws/credentials`.
pub fn credentials_path(
    override_path: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf, CredentialsError> {
    if let Some(path) = override_path.filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = home
        .filter(|home| !home.is_empty())
        .ok_or(CredentialsError::NoHomeDirectory)?;
    Ok(Path::new(&home).join(".aws").join("credentials"))
}

/// `--profile`, then `AWS_PROFILE`, then `default`.
pub fn resolve_profile(flag: Option<&str>, env: Option<String>) -> String {
    flag.map(str::to_string)
        .or(env.filter(|profile| !profile.is_empty()))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Load `profile` from the file at `path`.
///
/// # Errors
///
/// [`CredentialsError::Read`] if the file cannot be read, otherwise as
/// [`parse_profile`].
pub fn load(path: &Path, profile: &str) -> Result<Credentials, CredentialsError> {
    let text = fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&text, profile, path)
}

/// Pick `profile` out of credentials file text. Later duplicate keys win;
/// a profile split over two sections is merged. `path` is only used in
/// error messages.
///
/// # Errors
///
/// [`CredentialsError::ProfileNotFound`] when no section has that name,
/// [`CredentialsError::MissingKey`] when the key id or secret is absent.
pub fn parse_profile(text: &str, profile: &str, path: &Path) -> Result<Credentials, CredentialsError> {
    let mut found = false;
    let mut in_profile = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            found |= in_profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "aws_access_key_id" => access_key_id = Some(value),
            "aws_secret_access_key" => secret_access_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }

    if !found {
        return Err(CredentialsError::ProfileNotFound {
            profile: profile.to_string(),
            path: path.to_path_buf(),
        });
    }
    let missing = |key| CredentialsError::MissingKey {
        profile: profile.to_string(),
        key,
    };
    Ok(Credentials {
        access_key_id: access_key_id.ok_or_else(|| missing("aws_access_key_id"))?,
        secret_access_key: secret_access_key.ok_or_else(|| missing("aws_secret_access_key"))?,
        session_token: session_token.filter(|token| !token.is_empty()),
    })
}
