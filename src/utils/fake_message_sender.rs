use crate::connection::sender::{MessageSender, MessageSenderTrait};
use crate::message::broadcast_message::BroadcastMessage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every broadcast it was sent so tests can assert on deliveries.
#[derive(Clone, Debug, Default)]
pub struct FakeMessageSender {
	broadcasts: Arc<Mutex<Vec<BroadcastMessage>>>,
}

impl FakeMessageSender {
	pub fn broadcast_messages(&self) -> Vec<BroadcastMessage> {
		self.broadcasts.lock().clone()
	}
}

impl From<FakeMessageSender> for MessageSender {
	fn from(fake_message_sender: FakeMessageSender) -> Self {
		Arc::pin(fake_message_sender)
	}
}

#[async_trait]
impl MessageSenderTrait for FakeMessageSender {
	async fn send_broadcast_message(&self, message: BroadcastMessage) -> Result<(), ()> {
		self.broadcasts.lock().push(message);
		Ok(())
	}

	async fn close(&self) {}
}
