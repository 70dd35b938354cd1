// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan input.

/// Result type alias for floor plan input operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort reading a floor plan document.
///
/// Individual malformed walls, doors or rooms never produce an error; they
/// are skipped and reported as [`crate::InputIssue`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document is not valid JSON.
    #[error("invalid floor plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its top level is not an object.
    #[error("floor plan document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}
