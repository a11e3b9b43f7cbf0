use crate::message::{MessageError, WebSocketMessage, deserialize_message_from_websocket_message};
use crate::server::rest_api::models::MessageResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum BroadcastMessage {
	Typing(TypingBroadcast),
	StopTyping(StopTypingBroadcast),
	MessageReceived(MessageReceivedBroadcast),
}

macro_rules! broadcast_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for BroadcastMessage {
			fn from(broadcast: $struct_type) -> BroadcastMessage {
				BroadcastMessage::$enum_case(broadcast)
			}
		}
	};
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TypingBroadcast {
	pub room: Uuid,
}

broadcast_from_struct!(Typing, TypingBroadcast);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StopTypingBroadcast {
	pub room: Uuid,
}

broadcast_from_struct!(StopTyping, StopTypingBroadcast);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MessageReceivedBroadcast {
	pub message: MessageResponse,
}

broadcast_from_struct!(MessageReceived, MessageReceivedBroadcast);

impl TryFrom<&WebSocketMessage> for BroadcastMessage {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		deserialize_message_from_websocket_message(websocket_message)
	}
}

impl From<&BroadcastMessage> for WebSocketMessage {
	fn from(message: &BroadcastMessage) -> Self {
		crate::message::serialize_message_to_websocket_message(message)
	}
}
