use crate::configuration::ConfigurationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PalaverError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Failed to start up: {0}")]
	Startup(#[from] anyhow::Error),
	#[error("IO error while serving requests: {0}")]
	Server(#[from] std::io::Error),
}
