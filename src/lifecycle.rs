use crate::connection::receiver::MessageReceiver;
use crate::connection::sender::MessageSender;
use crate::message::broadcast_message::{MessageReceivedBroadcast, StopTypingBroadcast, TypingBroadcast};
use crate::message::client_request::{
	ClientRequest, JoinRoomRequest, NewMessageRequest, StopTypingRequest, TypingRequest,
};
use crate::relay::Rooms;
use crate::relay::connection_id::ConnectionId;
use tracing::{debug, info};

/// Drives one realtime connection until the client goes away. Every event is
/// fire and forget, the client never gets an acknowledgement.
pub async fn run_client(rooms: Rooms, message_sender: MessageSender, mut message_receiver: MessageReceiver) {
	let connection_id = rooms.connect(message_sender);
	info!("Realtime connection {connection_id} established.");

	while let Some(request) = message_receiver.receive().await {
		handle_request(&rooms, connection_id, request).await;
	}

	rooms.disconnect(connection_id);
	info!("Realtime connection {connection_id} closed.");
}

async fn handle_request(rooms: &Rooms, connection_id: ConnectionId, request: ClientRequest) {
	use ClientRequest::*;
	match request {
		JoinRoom(JoinRoomRequest { room }) => {
			debug!("Connection {connection_id} joined room {room}.");
			rooms.join(connection_id, room);
		}
		Typing(TypingRequest { room }) => {
			rooms.broadcast(room, connection_id, TypingBroadcast { room }.into()).await;
		}
		StopTyping(StopTypingRequest { room }) => {
			rooms
				.broadcast(room, connection_id, StopTypingBroadcast { room }.into())
				.await;
		}
		NewMessage(NewMessageRequest { message }) => {
			// The payload is trusted as-is, persistence already happened over HTTP.
			let room = message.chat_id;
			rooms
				.broadcast(room, connection_id, MessageReceivedBroadcast { message }.into())
				.await;
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::connection::receiver::StreamMessageReceiver;
	use crate::message::WebSocketMessage;
	use crate::message::broadcast_message::BroadcastMessage;
	use crate::utils::fake_message_sender::FakeMessageSender;
	use futures_util::stream;
	use uuid::Uuid;

	#[tokio::test]
	async fn should_relay_typing_to_other_connections_in_the_room() {
		let rooms = Rooms::default();
		let room = Uuid::from_u128(7);
		let listener = FakeMessageSender::default();
		let listener_id = rooms.connect(listener.clone().into());
		rooms.join(listener_id, room);

		let requests = vec![
			ClientRequest::JoinRoom(JoinRoomRequest { room }),
			ClientRequest::Typing(TypingRequest { room }),
			ClientRequest::StopTyping(StopTypingRequest { room }),
		];
		run_client(
			rooms.clone(),
			FakeMessageSender::default().into(),
			receiver_for(requests),
		)
		.await;

		assert_eq!(
			vec![
				BroadcastMessage::Typing(TypingBroadcast { room }),
				BroadcastMessage::StopTyping(StopTypingBroadcast { room }),
			],
			listener.broadcast_messages()
		);
	}

	#[tokio::test]
	async fn should_leave_all_rooms_once_the_client_goes_away() {
		let rooms = Rooms::default();
		let room = Uuid::from_u128(7);
		let listener = FakeMessageSender::default();
		let listener_id = rooms.connect(listener.clone().into());
		rooms.join(listener_id, room);

		let client = FakeMessageSender::default();
		run_client(
			rooms.clone(),
			client.clone().into(),
			receiver_for(vec![ClientRequest::JoinRoom(JoinRoomRequest { room })]),
		)
		.await;

		// the client's stream has ended, broadcasts must no longer reach it
		rooms
			.broadcast(room, listener_id, BroadcastMessage::Typing(TypingBroadcast { room }))
			.await;

		assert!(client.broadcast_messages().is_empty());
	}

	fn receiver_for(requests: Vec<ClientRequest>) -> MessageReceiver {
		let messages: Vec<WebSocketMessage> = requests.iter().map(WebSocketMessage::from).collect();
		StreamMessageReceiver::new(stream::iter(messages)).into()
	}
}
