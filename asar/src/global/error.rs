use std::{io, path::PathBuf};

use thiserror::Error;

/// All errors manifestable within `asar`. Every failure mode gets its own
/// variant, so callers can branch on cause: a missing path, a malformed
/// source and a filesystem failure are different problems.
#[derive(Debug, Error)]
pub enum InternalError {
	/// Malformed envelope, invalid JSON or a header tree schema violation
	#[error("[AsarError::FormatError] {0}")]
	FormatError(String),
	/// The given path does not exist in the header tree
	#[error("[AsarError::NotFoundError] no entry found at: {0}")]
	NotFoundError(String),
	/// The given path resolves to a directory where a file was required
	#[error("[AsarError::IsADirectoryError] {0} is a directory, expected a file")]
	IsADirectoryError(String),
	/// An intermediate path component resolves to a file, not a directory
	#[error("[AsarError::NotADirectoryError] {0} traverses a file as if it were a directory")]
	NotADirectoryError(String),
	/// The extraction destination already exists
	#[error("[AsarError::AlreadyExistsError] destination already exists: {}", .0.display())]
	AlreadyExistsError(PathBuf),
	/// Underlying filesystem or stream failure
	#[error("[AsarError::IOError] {0}")]
	IOError(#[from] io::Error),
	/// Disallowed input, e.g. a non-regular file in a pack source tree
	#[error("[AsarError::ValidationError] {0}")]
	ValidationError(String),
}

impl From<serde_json::Error> for InternalError {
	fn from(err: serde_json::Error) -> Self {
		InternalError::FormatError(err.to_string())
	}
}
