//! Error taxonomy of the data service.

use thiserror::Error;

use crate::model::PersonId;

/// Failures of data service calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("network error: {0}")]
	Network(String),
	/// The service answered with a non-success status.
	#[error("HTTP {status}: {body}")]
	Http {
		/// Status code.
		status: u16,
		/// Response text, possibly empty.
		body: String,
	},
	/// The response body could not be (de)serialized.
	#[error("decode error: {0}")]
	Decode(String),
	/// A relationship from a person to themselves.
	#[error("person {0} cannot be related to themselves")]
	SelfRelationship(PersonId),
	/// The environment lacks something the call needs (no window, no fetch).
	#[error("unsupported: {0}")]
	Unsupported(String),
}
