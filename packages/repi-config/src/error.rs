pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config {path:?}: {source}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("Config {path:?} is not valid TOML: {source}.")]
	Toml { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid config: {0}")]
	Invalid(String),
}
