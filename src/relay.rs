use crate::connection::sender::MessageSender;
use crate::message::broadcast_message::BroadcastMessage;
use crate::relay::connection_id::{ConnectionId, ConnectionIdSequence};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub mod connection_id;

/// Ephemeral room membership, keyed by chat uuid. Nothing in here survives a
/// restart, every client rejoins its rooms after reconnecting.
#[derive(Clone, Default)]
pub struct Rooms {
	inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
	connection_id_sequence: ConnectionIdSequence,
	senders: HashMap<ConnectionId, MessageSender>,
	rooms_by_connection: HashMap<ConnectionId, HashSet<Uuid>>,
	connections_by_room: HashMap<Uuid, HashSet<ConnectionId>>,
}

impl Rooms {
	/// Registers a new connection, passing in a sender for broadcasting to it.
	pub fn connect(&self, message_sender: MessageSender) -> ConnectionId {
		let mut inner = self.inner.lock();
		let connection_id = inner.connection_id_sequence.next();
		inner.senders.insert(connection_id, message_sender);
		connection_id
	}

	/// Adds the connection to the room. Joining the same room twice is a no-op.
	pub fn join(&self, connection_id: ConnectionId, room: Uuid) {
		let mut inner = self.inner.lock();
		if !inner.senders.contains_key(&connection_id) {
			return;
		}
		inner.rooms_by_connection.entry(connection_id).or_default().insert(room);
		inner.connections_by_room.entry(room).or_default().insert(connection_id);
	}

	/// Removes the connection from every room it joined.
	pub fn disconnect(&self, connection_id: ConnectionId) {
		let mut inner = self.inner.lock();
		inner.senders.remove(&connection_id);
		let Some(rooms) = inner.rooms_by_connection.remove(&connection_id) else {
			return;
		};
		for room in rooms {
			if let Some(connections) = inner.connections_by_room.get_mut(&room) {
				connections.remove(&connection_id);
				if connections.is_empty() {
					inner.connections_by_room.remove(&room);
				}
			}
		}
	}

	/// Sends the message to every connection in the room except the sender.
	/// Delivery is at most once, failed sends are not retried.
	pub async fn broadcast(&self, room: Uuid, sender_id: ConnectionId, message: BroadcastMessage) {
		let recipients: Vec<MessageSender> = {
			let inner = self.inner.lock();
			let Some(connections) = inner.connections_by_room.get(&room) else {
				return;
			};
			connections
				.iter()
				.filter(|connection_id| **connection_id != sender_id)
				.filter_map(|connection_id| inner.senders.get(connection_id).cloned())
				.collect()
		};

		let sends: Vec<_> = recipients
			.into_iter()
			.map(|recipient| {
				let message = message.clone();
				async move {
					let _ = recipient.send_broadcast_message(message).await;
				}
			})
			.collect();
		futures_util::future::join_all(sends).await;
	}
}
