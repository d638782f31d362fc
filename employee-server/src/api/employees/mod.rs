//! Employee API Module
//!
//! | Path | Method | Success |
//! |------|--------|---------|
//! | /api/employees | GET | 200 list |
//! | /api/employees | POST | 201 + Location |
//! | /api/employees/{id} | GET | 200 |
//! | /api/employees/{id} | PUT | 200 |
//! | /api/employees/{id} | DELETE | 204 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Employee router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
