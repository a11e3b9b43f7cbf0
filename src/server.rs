use crate::connection::receiver::StreamMessageReceiver;
use crate::connection::sender::SinkMessageSender;
use crate::context::ApplicationContext;
use crate::lifecycle::run_client;
use crate::media::MediaStore;
use crate::relay::Rooms;
use crate::server::rest_api::auth::AuthenticatedUser;
use crate::utils::infallible_stream::InfallibleStream;
use axum::extract::{FromRef, State, WebSocketUpgrade};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub mod rest_api;

#[derive(Clone, FromRef)]
pub struct ServerState {
	pub context: ApplicationContext,
	pub rooms: Rooms,
	pub media_store: MediaStore,
}

pub async fn run_server(application_context: ApplicationContext) -> Result<(), std::io::Error> {
	let address = application_context.configuration.address;
	let media_store = MediaStore::new(&application_context.configuration.uploads_directory);
	media_store.ensure_directory().await?;

	let router = create_router(application_context, Rooms::default(), media_store);
	let listener = TcpListener::bind(address).await?;
	let local_address = listener.local_addr()?;
	info!("Listening on {local_address}.");
	axum::serve(listener, router).await
}

pub fn create_router(application_context: ApplicationContext, rooms: Rooms, media_store: MediaStore) -> Router {
	let uploads_directory = application_context.configuration.uploads_directory.clone();
	let state = ServerState {
		context: application_context,
		rooms,
		media_store,
	};

	Router::new()
		.nest("/api", rest_api::api_router(&state))
		.route(
			"/ws",
			get(websocket).route_layer(from_fn_with_state(state.clone(), rest_api::auth::middleware)),
		)
		.nest_service("/uploads", ServeDir::new(uploads_directory))
		.layer(CorsLayer::permissive())
		.with_state(state)
}

async fn websocket(
	websocket_upgrade: WebSocketUpgrade,
	State(rooms): State<Rooms>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Response {
	info!("User '{}' opened a realtime connection.", user.name);
	websocket_upgrade.on_upgrade(move |websocket| {
		let (sink, stream) = websocket.split();
		let message_sender = SinkMessageSender::new(sink).into();
		let message_receiver = StreamMessageReceiver::new(InfallibleStream::from(stream)).into();
		run_client(rooms, message_sender, message_receiver)
	})
}
