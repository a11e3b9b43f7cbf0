use crate::message::client_request::ClientRequest;
use crate::message::{MessageError, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use tracing::debug;

pub type MessageReceiver = Pin<Box<dyn MessageReceiverTrait + Unpin + Send>>;

#[async_trait]
pub trait MessageReceiverTrait {
	/// Receive a request from the client or None once the connection is closed.
	async fn receive(&mut self) -> Option<ClientRequest>;
}

pub struct StreamMessageReceiver<RequestStream> {
	request_stream: RequestStream,
}

#[async_trait]
impl<RequestStream> MessageReceiverTrait for StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send,
{
	async fn receive(&mut self) -> Option<ClientRequest> {
		loop {
			let websocket_message = self.request_stream.next().await?;

			if let WebSocketMessage::Close(_) = websocket_message {
				return None;
			}

			match ClientRequest::try_from(&websocket_message) {
				Ok(client_request) => return Some(client_request),
				// The relay has no error channel, malformed events are dropped.
				Err(MessageError::WrongMessageType) => continue,
				Err(message_error) => {
					debug!("Dropping malformed realtime event: {message_error}");
					continue;
				}
			}
		}
	}
}

impl<RequestStream> StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage>,
{
	pub fn new(request_stream: RequestStream) -> Self {
		Self { request_stream }
	}
}

impl<RequestStream> From<StreamMessageReceiver<RequestStream>> for MessageReceiver
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send + 'static,
{
	fn from(stream_message_receiver: StreamMessageReceiver<RequestStream>) -> Self {
		Box::pin(stream_message_receiver)
	}
}
