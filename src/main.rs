use crate::commandline::Commandline;
use crate::error::PalaverError;
use clap::Parser;

mod auth;
mod commandline;
mod configuration;
mod connection;
mod context;
mod error;
mod lifecycle;
mod media;
mod message;
mod relay;
mod server;
mod store;
mod utils;

#[tokio::main]
async fn main() -> Result<(), PalaverError> {
	let commandline = Commandline::parse();
	commandline.run().await
}
