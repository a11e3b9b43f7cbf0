#[cfg(test)]
pub mod fake_message_sender;
pub mod infallible_stream;
