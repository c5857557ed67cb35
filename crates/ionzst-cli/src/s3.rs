//! Blocking [`ObjectSource`] over an S3-compatible store.
//!
//! `object_store` is async; the pipeline stages are plain threads. The
//! source owns a small multi-threaded `tokio` runtime and every read
//! blocks on it from the calling thread.

use std::io::{self, Read};
use std::ops::Range;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use ionzst_driver::ObjectSource;
use object_store::aws::AmazonS3Builder;
use object_store::{GetOptions, GetRange, ObjectStore};
use object_store::path::Path as ObjectPath;
use tokio::runtime::{Handle, Runtime};
use tracing::debug;

use crate::config::S3Config;
use crate::credentials::{self, CredentialsError};

const RUNTIME_THREADS: usize = 2;

pub struct S3Source {
    runtime: Arc<Runtime>,
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
}

impl S3Source {
    /// Build a client for `bucket` and point it at `key`. No request is
    /// made until the pipeline asks for the object size.
    ///
    /// # Errors
    ///
    /// Credentials cannot be loaded, the client cannot be configured, or
    /// the runtime cannot start.
    pub fn connect(bucket: &str, key: &str, config: &S3Config) -> Result<Self> {
        let path = config
            .credentials_file
            .as_deref()
            .ok_or(CredentialsError::NoHomeDirectory)?;
        let creds = credentials::load(path, &config.profile)?;
        debug!(profile = %config.profile, path = %path.display(), "loaded credentials");

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&config.region)
            .with_access_key_id(&creds.access_key_id)
            .with_secret_access_key(&creds.secret_access_key)
            .with_allow_http(config.allow_http)
            .with_virtual_hosted_style_request(config.virtual_hosted);
        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        let store = builder
            .build()
            .with_context(|| format!("configuring S3 client for bucket {bucket:?}"))?;

        Self::with_store(Arc::new(store), key).context("starting the S3 runtime")
    }

    fn with_store(store: Arc<dyn ObjectStore>, key: &str) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_THREADS)
            .thread_name("ionzst-s3")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: Arc::new(runtime),
            store,
            location: ObjectPath::from(key),
        })
    }
}

fn to_io(err: object_store::Error) -> io::Error {
    let kind = match err {
        object_store::Error::NotFound { .. } => io::ErrorKind::NotFound,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, err)
}

fn to_range(start: u64, len: u64) -> io::Result<Range<usize>> {
    let start = usize::try_from(start).map_err(io::Error::other)?;
    let len = usize::try_from(len).map_err(io::Error::other)?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| io::Error::other("range overflows"))?;
    Ok(start..end)
}

impl ObjectSource for S3Source {
    type Reader = S3Reader;

    fn size(&self) -> io::Result<u64> {
        let meta = self
            .runtime
            .block_on(self.store.head(&self.location))
            .map_err(to_io)?;
        debug!(location = %self.location, size = meta.size, "object metadata");
        u64::try_from(meta.size).map_err(io::Error::other)
    }

    fn read_range(&self, start: u64, len: u64) -> io::Result<Vec<u8>> {
        let range = to_range(start, len)?;
        let bytes = self
            .runtime
            .block_on(self.store.get_range(&self.location, range))
            .map_err(to_io)?;
        if (bytes.len() as u64) < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "short range read",
            ));
        }
        Ok(bytes.to_vec())
    }

    fn open(&self, len: u64) -> io::Result<S3Reader> {
        // An empty range is not a valid HTTP range request.
        let stream = if len == 0 {
            futures::stream::empty().boxed()
        } else {
            let options = GetOptions {
                range: Some(GetRange::Bounded(to_range(0, len)?)),
                ..GetOptions::default()
            };
            self.runtime
                .block_on(self.store.get_opts(&self.location, options))
                .map_err(to_io)?
                .into_stream()
        };
        Ok(S3Reader {
            _runtime: Arc::clone(&self.runtime),
            handle: self.runtime.handle().clone(),
            stream,
            chunk: Bytes::new(),
        })
    }
}

/// Sequential reader over the body of a GET. Called from a pipeline
/// thread, never from inside the runtime.
pub struct S3Reader {
    _runtime: Arc<Runtime>,
    handle: Handle,
    stream: BoxStream<'static, object_store::Result<Bytes>>,
    chunk: Bytes,
}

impl Read for S3Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.chunk.is_empty() {
            match self.handle.block_on(self.stream.next()) {
                Some(Ok(chunk)) => self.chunk = chunk,
                Some(Err(err)) => return Err(to_io(err)),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.chunk.len());
        buf[..n].copy_from_slice(&self.chunk.split_to(n));
        Ok(n)
    }
}
