//! REST API surface for timer operations.

use axum::{
    routing::{delete, get},
    Router,
};
use recast_store::{ChannelLookup, RecordingControl, TimerStore};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{
    create_timer, delete_timer, delete_timer_without_id, list_timers, list_timers_bare,
    method_not_supported, update_timer,
};

/// Shared state behind the `/timers` resource.
pub struct TimersApi {
    pub timers: Arc<dyn TimerStore>,
    pub channels: Arc<dyn ChannelLookup>,
    pub recordings: Arc<dyn RecordingControl>,
}

impl TimersApi {
    pub fn new(
        timers: Arc<dyn TimerStore>,
        channels: Arc<dyn ChannelLookup>,
        recordings: Arc<dyn RecordingControl>,
    ) -> Self {
        Self {
            timers,
            channels,
            recordings,
        }
    }

    /// Router for the `/timers` resource.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route(
                "/timers",
                get(list_timers_bare)
                    .post(create_timer)
                    .put(update_timer)
                    .delete(delete_timer_without_id)
                    .fallback(method_not_supported),
            )
            .route("/timers/:id", delete(delete_timer).fallback(method_not_supported))
            .route("/:resource", get(list_timers))
            .layer(CorsLayer::permissive())
            .with_state(self)
    }
}

/// Optional pagination window on listings.
///
/// Windowing activates only when both values are present with
/// `start >= 0` and `limit >= 1`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

/// Form fields accepted by create and update; absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
pub struct TimerForm {
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub aux: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub lifetime: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub stop: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub weekdays: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub timer_id: String,
}
