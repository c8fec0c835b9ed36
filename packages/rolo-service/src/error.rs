pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Rate limited. Retry after {retry_after_secs}s.")]
	RateLimited { retry_after_secs: u64 },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<rolo_storage::Error> for Error {
	fn from(err: rolo_storage::Error) -> Self {
		match err {
			rolo_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			rolo_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			rolo_storage::Error::NotFound(message) => Self::NotFound { message },
			rolo_storage::Error::Conflict(message) => Self::Conflict { message },
			rolo_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
