use crate::server::ServerState;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

pub mod auth;
pub mod chats;
pub mod error;
pub mod messages;
pub mod models;

pub fn api_router(state: &ServerState) -> Router<ServerState> {
	let protected = Router::new()
		.route("/chats", post(chats::create_direct_chat).get(chats::list_chats))
		.route("/chats/group", post(chats::create_group_chat))
		.route("/chats/users", get(chats::list_other_users))
		.route("/messages", post(messages::send_message))
		.route("/messages/{chat_id}", get(messages::list_messages))
		.route_layer(from_fn_with_state(state.clone(), auth::middleware));

	Router::new()
		.route("/auth/register", post(auth::register))
		.route("/auth/login", post(auth::login))
		.merge(protected)
}
