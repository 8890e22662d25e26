// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the annotator.
//!
//! Each layer gets its own enum: the pure session model, schema decoding,
//! the HTTP client and configuration. `anyhow` is only used at the
//! application boundary.

/// Errors raised by session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// A point was placed before the point schema arrived from the server.
    #[error("point schema has not been loaded yet")]
    SchemaNotLoaded,

    /// No video is selected, or the server is still loading it.
    #[error("no video is loaded")]
    VideoNotLoaded,

    /// A stored point references a name the schema does not define.
    #[error("unknown point name '{name}' on frame {frame}")]
    UnknownPointName { frame: u32, name: String },

    /// Nothing to remove on this frame.
    #[error("frame {0} has no points")]
    NoPointsOnFrame(u32),
}

/// Errors decoding or validating a point schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema response has no '{0}' entry")]
    MissingKey(String),

    #[error("schema defines no points")]
    Empty,

    #[error("point name '{0}' appears more than once in the schema")]
    DuplicateName(String),

    #[error("malformed schema response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from the annotation server client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The frame payload is not a decodable image.
    #[error("failed to decode frame image: {0}")]
    Image(#[from] image::ImageError),
}

impl ClientError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Connection failures, timeouts and 5xx responses are transient. A 4xx
    /// (e.g. an unknown video path) or an undecodable body points at a
    /// configuration problem and will fail again.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Request(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Decode(_) | ClientError::Schema(_) | ClientError::Image(_) => false,
        }
    }
}

/// Errors reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("failed to read video list {path}: {source}")]
    VideoList {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
