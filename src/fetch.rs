use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::VariantDescriptor;
use crate::error::ShapesError;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct TransferOutcome {
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        descriptor: &VariantDescriptor,
        destination: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<TransferOutcome, ShapesError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ShapesError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("simple-shapes/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ShapesError::Http(err.to_string()))?,
        );

        // Archives run into the gigabytes, so no whole-request deadline; the
        // connect timeout still bounds an unreachable host.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(None)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ShapesError::Http(err.to_string()))?;

        Ok(Self { client })
    }

    fn stream_to_file(
        &self,
        descriptor: &VariantDescriptor,
        destination: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<TransferOutcome, ShapesError> {
        let mut response = self
            .client
            .get(&descriptor.url)
            .send()
            .map_err(|err| ShapesError::Http(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ShapesError::HttpStatus {
                status: response.status().as_u16(),
                url: descriptor.url.clone(),
            });
        }

        let total_bytes = response.content_length().or(descriptor.expected_bytes);

        let mut file = File::create(destination)
            .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut bytes_transferred = 0u64;
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|err| ShapesError::Http(err.to_string()))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .map_err(|err| ShapesError::Filesystem(err.to_string()))?;
            bytes_transferred += read as u64;
            sink.event(ProgressEvent::Transfer {
                bytes_transferred,
                total_bytes,
            });
        }
        file.flush()
            .map_err(|err| ShapesError::Filesystem(err.to_string()))?;

        if let Some(expected) = response.content_length() {
            if bytes_transferred < expected {
                return Err(ShapesError::TruncatedDownload {
                    received: bytes_transferred,
                    expected,
                });
            }
        }

        Ok(TransferOutcome {
            bytes_transferred,
            total_bytes,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        descriptor: &VariantDescriptor,
        destination: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<TransferOutcome, ShapesError> {
        tracing::debug!(url = %descriptor.url, "starting download");
        let outcome = self.stream_to_file(descriptor, destination, sink);
        if outcome.is_err() {
            // A retry must start from a clean staging file.
            let _ = fs::remove_file(destination);
        }
        outcome
    }
}
