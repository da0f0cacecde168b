use crate::modules::contacts::controller::{create_contact, get_contacts};
use crate::state::AppState;
use axum::{Router, routing::post};

pub fn init_contacts_router() -> Router<AppState> {
    Router::new().route("/", post(create_contact).get(get_contacts))
}
