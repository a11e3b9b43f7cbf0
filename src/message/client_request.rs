use crate::message::{
	MessageError, WebSocketMessage, deserialize_message_from_websocket_message, serialize_message_to_websocket_message,
};
use crate::server::rest_api::models::MessageResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ClientRequest {
	JoinRoom(JoinRoomRequest),
	Typing(TypingRequest),
	StopTyping(StopTypingRequest),
	NewMessage(NewMessageRequest),
}

macro_rules! client_request_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for ClientRequest {
			fn from(request: $struct_type) -> ClientRequest {
				ClientRequest::$enum_case(request)
			}
		}
	};
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct JoinRoomRequest {
	pub room: Uuid,
}

client_request_from_struct!(JoinRoom, JoinRoomRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TypingRequest {
	pub room: Uuid,
}

client_request_from_struct!(Typing, TypingRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StopTypingRequest {
	pub room: Uuid,
}

client_request_from_struct!(StopTyping, StopTypingRequest);

/// Republication of a message that was already persisted over HTTP. The relay
/// trusts the payload as-is, a fabricated message is rendered by live peers
/// but vanishes on the next history fetch.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NewMessageRequest {
	pub message: MessageResponse,
}

client_request_from_struct!(NewMessage, NewMessageRequest);

impl From<&ClientRequest> for WebSocketMessage {
	fn from(request: &ClientRequest) -> Self {
		serialize_message_to_websocket_message(request)
	}
}

impl TryFrom<&WebSocketMessage> for ClientRequest {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		deserialize_message_from_websocket_message(websocket_message)
	}
}
