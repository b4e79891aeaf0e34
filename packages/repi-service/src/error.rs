#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error(transparent)]
	Validation(#[from] repi_domain::ValidationError),
	/// Embedding failed for one query term. `term` names the term so callers
	/// can tell which part of the query broke.
	#[error("Embedding failed for {term:?}: {message}")]
	Embedding { term: String, message: String },
	#[error("Search store error: {message}")]
	SearchStore { message: String },
	#[error("Merge error: {message}")]
	Merge { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<repi_storage::Error> for Error {
	fn from(err: repi_storage::Error) -> Self {
		match err {
			repi_storage::Error::NotFound(message) => Self::NotFound { message },
			repi_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
