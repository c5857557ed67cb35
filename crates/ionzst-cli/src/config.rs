use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use ionzst_driver::{PipelineConfig, TextStyle};

use crate::Cli;
use crate::credentials;
use crate::locator::{Locator, LocatorError};

/// Everything a run needs, resolved once from the command line and the
/// environment. Nothing reads flags or environment variables after this.
#[derive(Clone, Debug)]
pub struct Config {
    pub locator: Locator,
    pub s3: S3Config,
    pub pipeline: PipelineConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3Config {
    /// Full endpoint URL. Always set for S3 locators.
    pub endpoint: Option<String>,
    pub region: String,
    pub profile: String,
    /// `--credentials-file`, else the shared credentials file. `None`
    /// when neither is set and there is no home directory.
    pub credentials_file: Option<PathBuf>,
    pub allow_http: bool,
    pub virtual_hosted: bool,
}

/// The environment variables the tool reads.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    pub aws_profile: Option<String>,
    pub shared_credentials_file: Option<OsString>,
    pub home: Option<OsString>,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            aws_profile: env::var("AWS_PROFILE").ok(),
            shared_credentials_file: env::var_os("AWS_SHARED_CREDENTIALS_FILE"),
            home: env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")),
        }
    }
}

impl Config {
    /// Resolve `cli` against `env`.
    ///
    /// # Errors
    ///
    /// The locator does not parse, or names an S3 object without an
    /// endpoint.
    pub fn from_cli(cli: &Cli, env: &Environment) -> Result<Self, LocatorError> {
        let locator = Locator::parse(&cli.file)?;
        if matches!(locator, Locator::S3 { .. }) && cli.endpoint.is_none() {
            return Err(LocatorError::MissingEndpoint);
        }
        let credentials_file = cli.credentials_file.clone().or_else(|| {
            credentials::credentials_path(env.shared_credentials_file.clone(), env.home.clone()).ok()
        });
        Ok(Self {
            locator,
            s3: S3Config {
                endpoint: cli.endpoint.as_deref().map(endpoint_url),
                region: cli.region.clone(),
                profile: credentials::resolve_profile(cli.profile.as_deref(), env.aws_profile.clone()),
                credentials_file,
                allow_http: cli.allow_http,
                virtual_hosted: cli.virtual_hosted,
            },
            pipeline: PipelineConfig {
                handoff_capacity: cli.handoff_capacity,
                style: if cli.pretty {
                    TextStyle::Pretty
                } else {
                    TextStyle::Lines
                },
            },
        })
    }
}

/// `host[:port]` becomes `https://host[:port]`; URLs pass through.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}
