use crate::error::FetchError;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
const READ_TIMEOUT: Duration = Duration::from_millis(10_000);
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

pub async fn fetch(url_text: &str) -> Result<String, FetchError> {
    let url = Url::parse(url_text).map_err(|source| FetchError::InvalidUrl {
        url: url_text.to_string(),
        source,
    })?;

    let client = Client::builder()
        .user_agent(concat!("guardian-news/", env!("CARGO_PKG_VERSION")))
        .gzip(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()?;

    debug!(host = url.host_str().unwrap_or(""), path = url.path(), "requesting stories");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    // Stream with a max size limit
    let mut stream = resp.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(FetchError::BodyTooLarge {
                limit: MAX_BODY_BYTES,
            });
        }
        buf.extend_from_slice(&chunk);
    }
    debug!(bytes = buf.len(), "story response received");

    Ok(join_lines(&String::from_utf8_lossy(&buf)))
}

// Lines are joined with no separator, so newlines inside the payload vanish.
fn join_lines(text: &str) -> String {
    text.split(['\r', '\n']).collect()
}
