// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Errors reading or writing graphs
#[derive(Debug)]
pub enum Error {
    /// The underlying reader or writer failed
    Io(std::io::Error),
    /// The input is not valid JSON or lacks required fields
    Json(serde_json::Error),
    /// The input is valid JSON but does not describe a valid graph
    Schema(String),
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io(inner) => Some(inner),
            Self::Json(inner) => Some(inner),
            Self::Schema(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => write!(f, "I/O error"),
            Self::Json(_) => write!(f, "malformed graph document"),
            Self::Schema(msg) => write!(f, "invalid graph: {msg}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
