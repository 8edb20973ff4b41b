//! HTTP request handlers for the timer REST resource.

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use recast_common::Error;
use recast_store::Timer;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::{ListQuery, TimerForm, TimersApi};
use crate::descriptor::{build_descriptor, TimerFields};
use crate::list;
use crate::values;

/// GET `/timers.{json,html,xml}` — the timer list in the requested format.
pub async fn list_timers(
    Path(resource): Path<String>,
    Query(query): Query<ListQuery>,
    State(api): State<Arc<TimersApi>>,
) -> Response {
    let Some(extension) = resource.strip_prefix("timers") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    render_timer_list(api, extension, query).await
}

/// GET `/timers` without a format extension.
pub async fn list_timers_bare(
    Query(query): Query<ListQuery>,
    State(api): State<Arc<TimersApi>>,
) -> Response {
    render_timer_list(api, "", query).await
}

async fn render_timer_list(api: Arc<TimersApi>, extension: &str, query: ListQuery) -> Response {
    let Some((mut format, content_type)) = list::for_extension(extension) else {
        return error_response(Error::UnsupportedFormat(
            "Resources are not available for the selected format. (Use: .json, .html or .xml)"
                .to_string(),
        ));
    };

    api.timers.mark_modified().await;

    if let (Some(start), Some(limit)) = (query.start, query.limit) {
        if start >= 0 && limit >= 1 {
            format.activate_limit(start as usize, limit as usize);
        }
    }

    format.init();
    let total = api.timers.count().await;
    for index in 0..total {
        if let Some(timer) = api.timers.get(index).await {
            let channel = api.channels.channel(&timer.channel_id).unwrap_or_default();
            format.add_timer(&timer, &channel, index);
        }
    }
    format.set_total(total);

    match format.finish() {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            error!("timer list serialization failed: {e}");
            error_response(e)
        }
    }
}

/// POST `/timers` — create a timer from form fields.
pub async fn create_timer(
    State(api): State<Arc<TimersApi>>,
    Form(form): Form<TimerForm>,
) -> Response {
    create_or_update(api, form, false).await
}

/// PUT `/timers` — update the timer named by `timer_id`.
pub async fn update_timer(
    State(api): State<Arc<TimersApi>>,
    Form(form): Form<TimerForm>,
) -> Response {
    create_or_update(api, form, true).await
}

async fn create_or_update(api: Arc<TimersApi>, form: TimerForm, update: bool) -> Response {
    let Some(_edit) = api.timers.try_begin_edit() else {
        return store_busy_response();
    };

    let mut flags = values::convert_flags(&form.flags);
    let aux = values::convert_aux(&form.aux);
    let mut file = values::convert_file(&form.file);
    let mut lifetime = values::convert_lifetime(&form.lifetime);
    let mut priority = values::convert_priority(&form.priority);
    let mut stop = values::convert_stop(&form.stop);
    let mut start = values::convert_start(&form.start);
    let mut weekdays = form.weekdays.clone();
    let mut day = if form.day.is_empty() {
        String::new()
    } else {
        values::convert_day(&form.day)
    };
    let mut channel = values::convert_channel(&form.channel, api.channels.as_ref());
    let existing = match values::convert_timer(&form.timer_id) {
        Some(index) => api.timers.get(index).await.map(|t| (index, t)),
        None => None,
    };

    let mut invalid = Vec::new();
    if !update {
        if !values::is_flags_valid(flags) {
            invalid.push("flags");
        }
        if !values::is_file_valid(&file) {
            invalid.push("file");
        }
        if !values::is_lifetime_valid(lifetime) {
            lifetime = 50;
        }
        if !values::is_priority_valid(priority) {
            priority = 99;
        }
        if !values::is_stop_valid(stop) {
            invalid.push("stop");
        }
        if !values::is_start_valid(start) {
            invalid.push("start");
        }
        if !values::is_weekdays_valid(&weekdays) {
            invalid.push("weekdays");
        }
        if !form.day.is_empty() && !values::is_day_valid(&day) {
            invalid.push("day");
        }
        if channel.is_none() {
            invalid.push("channel");
        }
    } else {
        match &existing {
            None => invalid.push("timer_id"),
            Some((_, original)) => {
                if !values::is_flags_valid(flags) {
                    flags = original.flags;
                }
                if !values::is_file_valid(&file) {
                    file = original.file.clone();
                }
                if !values::is_lifetime_valid(lifetime) {
                    lifetime = original.lifetime;
                }
                if !values::is_priority_valid(priority) {
                    priority = original.priority;
                }
                if !values::is_stop_valid(stop) {
                    stop = original.stop;
                }
                if !values::is_start_valid(start) {
                    start = original.start;
                }
                if !values::is_weekdays_valid(&weekdays) {
                    weekdays = values::weekdays_to_str(original.weekdays);
                }
                if !values::is_day_valid(&day) {
                    day = values::day_from_epoch(original.day);
                }
                if channel.is_none() {
                    channel = api.channels.channel(&original.channel_id);
                }
            }
        }
    }

    if !invalid.is_empty() {
        return error_response(Error::Validation(format!(
            "The following parameters aren't valid: {}!",
            invalid.join(", ")
        )));
    }

    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| {
        existing
            .as_ref()
            .map(|(_, t)| t.channel_id.clone())
            .unwrap_or_default()
    });
    let descriptor = build_descriptor(&TimerFields {
        flags,
        channel_id,
        weekdays,
        day,
        start,
        stop,
        priority,
        lifetime,
        file,
        aux,
    });
    debug!(%descriptor, "built timer descriptor");

    if update {
        let Some((index, mut timer)) = existing else {
            return error_response(Error::NotFound("Timer id invalid!".to_string()));
        };
        if let Err(e) = timer.apply_descriptor(&descriptor) {
            error!("updating timer failed: {e}");
            return error_response(Error::Encoding("updating timer failed!".to_string()));
        }
        timer.set_event_from_schedule(api.channels.as_ref());
        if let Err(e) = api.timers.replace(index, timer).await {
            error!("updating timer failed: {e}");
            return error_response(e);
        }
        api.timers.mark_modified().await;
        info!(index, "timer updated");
        StatusCode::OK.into_response()
    } else {
        let mut timer = match Timer::parse(&descriptor) {
            Ok(t) => t,
            Err(e) => {
                error!("timer creation failed: {e}");
                return error_response(Error::Encoding("Creating timer failed!".to_string()));
            }
        };
        if api.timers.find_equivalent(&timer).await.is_some() {
            error!("timer already defined");
            return error_response(Error::Conflict("Timer already defined!".to_string()));
        }
        timer.set_event_from_schedule(api.channels.as_ref());
        if let Err(e) = api.timers.add(timer).await {
            error!("timer creation failed: {e}");
            return error_response(e);
        }
        api.timers.mark_modified().await;
        info!("timer created");
        StatusCode::OK.into_response()
    }
}

/// DELETE `/timers/:id` — remove a timer, stopping its recording first.
pub async fn delete_timer(
    Path(id): Path<String>,
    State(api): State<Arc<TimersApi>>,
) -> Response {
    let Some(_edit) = api.timers.try_begin_edit() else {
        return store_busy_response();
    };

    let resolved = match values::convert_timer(&id) {
        Some(index) => api.timers.get(index).await.map(|t| (index, t)),
        None => None,
    };
    let Some((index, timer)) = resolved else {
        return error_response(Error::NotFound("Timer id invalid!".to_string()));
    };

    if timer.recording {
        api.recordings.stop(&timer);
        api.recordings.reprocess();
    }
    if let Err(e) = api.timers.remove(index).await {
        error!("deleting timer failed: {e}");
        return error_response(e);
    }
    api.timers.mark_modified().await;
    info!(index, "timer deleted");
    StatusCode::OK.into_response()
}

/// DELETE `/timers` without an id.
pub async fn delete_timer_without_id(State(api): State<Arc<TimersApi>>) -> Response {
    let Some(_edit) = api.timers.try_begin_edit() else {
        return store_busy_response();
    };
    error_response(Error::NotFound("Timer id invalid!".to_string()))
}

/// Methods outside the REST surface.
pub async fn method_not_supported() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        "Only GET, DELETE, POST and PUT methods are supported.",
    )
        .into_response()
}

// Error response helpers

fn store_busy_response() -> Response {
    error_response(Error::StoreBusy(
        "Timers are being edited - try again later".to_string(),
    ))
}

fn error_response(error: Error) -> Response {
    let status = match &error {
        Error::Validation(_) | Error::Conflict(_) | Error::Encoding(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) | Error::UnsupportedFormat(_) => StatusCode::NOT_FOUND,
        Error::StoreBusy(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string()).into_response()
}
