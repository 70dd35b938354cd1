// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the pipeline facade
///
/// The grid, search and visibility stages themselves never fail; unreachable
/// goals and unmatched doors are reported as data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Floor plan input error: {0}")]
    Core(#[from] floorgrid_core::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] floorgrid_geometry::Error),
}
