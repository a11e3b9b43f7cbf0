use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod broadcast_message;
pub mod client_request;

pub type WebSocketMessage = axum::extract::ws::Message;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
	#[error("Failed to deserialize message with error: {error}, message was: {json}")]
	DeserializationFailed { error: String, json: String },
	#[error("Wrong websocket message type.")]
	WrongMessageType,
}

pub fn serialize_message_to_websocket_message<Message: Serialize>(message: &Message) -> WebSocketMessage {
	let json = serde_json::to_string(message).expect("Failed to serialize message to JSON.");
	WebSocketMessage::Text(json.into())
}

pub fn deserialize_message_from_websocket_message<Message: DeserializeOwned>(
	websocket_message: &WebSocketMessage,
) -> Result<Message, MessageError> {
	match websocket_message {
		WebSocketMessage::Text(json) => {
			serde_json::from_str(json.as_str()).map_err(|error| MessageError::DeserializationFailed {
				error: error.to_string(),
				json: json.to_string(),
			})
		}
		_ => Err(MessageError::WrongMessageType),
	}
}
