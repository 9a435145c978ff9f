use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response code: {0}")]
    Status(u16),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}
