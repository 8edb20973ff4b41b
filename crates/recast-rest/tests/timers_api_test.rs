//! Integration tests for the timer REST API.

use axum::http::StatusCode;
use axum_test::TestServer;
use recast_rest::TimersApi;
use recast_store::{
    Channel, ChannelRegistry, InMemoryTimerStore, RecordingTracker, TimerStore,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct TestContext {
    server: TestServer,
    store: Arc<InMemoryTimerStore>,
    recordings: Arc<RecordingTracker>,
}

/// Create a test server with two channels and empty stores
fn create_test_server() -> TestContext {
    let store = Arc::new(InMemoryTimerStore::new());
    let recordings = Arc::new(RecordingTracker::new());
    let channels = ChannelRegistry::with_channels(vec![
        Channel {
            id: "C1-1-1".to_string(),
            number: 1,
            name: "Main One".to_string(),
        },
        Channel {
            id: "C1-1-2".to_string(),
            number: 2,
            name: "News <24/7>".to_string(),
        },
    ]);
    let api = Arc::new(TimersApi::new(
        store.clone(),
        Arc::new(channels),
        recordings.clone(),
    ));
    TestContext {
        server: TestServer::new(api.router()).unwrap(),
        store,
        recordings,
    }
}

fn timer_form(file: &str, start: &str) -> Value {
    json!({
        "flags": "1",
        "file": file,
        "lifetime": "25",
        "priority": "10",
        "start": start,
        "stop": "2100",
        "weekdays": "-------",
        "day": "2024-3-5",
        "channel": "C1-1-1",
    })
}

#[tokio::test]
async fn test_create_and_list_json() {
    let ctx = create_test_server();

    let response = ctx.server.post("/timers").form(&timer_form("Movie Night", "2000")).await;
    response.assert_status(StatusCode::OK);

    let response = ctx.server.get("/timers.json").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        "application/json; charset=utf-8"
    );

    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 1);
    let timer = &body["timers"][0];
    assert_eq!(timer["id"], "0");
    assert_eq!(timer["filename"], "Movie Night");
    assert_eq!(timer["start"], 2000);
    assert_eq!(timer["stop"], 2100);
    assert_eq!(timer["priority"], 10);
    assert_eq!(timer["lifetime"], 25);
    // zero-padded on the way through the descriptor
    assert_eq!(timer["day"], "2024-03-05");
    assert_eq!(timer["weekdays"], "-------");
    assert_eq!(timer["channel"], 1);
    assert_eq!(timer["channelname"], "Main One");
    assert_eq!(timer["event_id"], -1);
    assert_eq!(timer["is_active"], true);
    assert_eq!(timer["is_recording"], false);
    assert_eq!(timer["is_pending"], false);
}

#[tokio::test]
async fn test_create_rejects_overlong_file() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .post("/timers")
        .form(&timer_form(&"x".repeat(41), "2000"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        response.text(),
        "The following parameters aren't valid: file!"
    );
    assert_eq!(ctx.store.count().await, 0);
}

#[tokio::test]
async fn test_create_reports_all_invalid_fields_at_once() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .post("/timers")
        .form(&json!({
            "flags": "3",
            "file": "Valid",
            "stop": "2100",
            "start": "2515",
            "weekdays": "everyday",
            "day": "2024-3-5",
            "channel": "C1-1-1",
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        response.text(),
        "The following parameters aren't valid: flags, start, weekdays!"
    );
}

#[tokio::test]
async fn test_create_coerces_lifetime_and_priority() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .post("/timers")
        .form(&json!({
            "flags": "1",
            "file": "Defaults",
            "lifetime": "banana",
            "priority": "200",
            "start": "2000",
            "stop": "2100",
            "weekdays": "MTWTF--",
            "channel": "1",
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = ctx.server.get("/timers.json").await.json();
    assert_eq!(body["timers"][0]["lifetime"], 50);
    assert_eq!(body["timers"][0]["priority"], 99);
    assert_eq!(body["timers"][0]["weekdays"], "MTWTF--");
    // a repeating timer carries no day
    assert_eq!(body["timers"][0]["day"], "");
}

#[tokio::test]
async fn test_create_without_day_is_valid() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .post("/timers")
        .form(&json!({
            "flags": "1",
            "file": "No Day",
            "start": "2000",
            "stop": "2100",
            "weekdays": "M------",
            "channel": "C1-1-1",
        }))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.store.count().await, 1);
}

#[tokio::test]
async fn test_create_with_calendar_impossible_day_fails_late() {
    let ctx = create_test_server();

    // month 13 passes the pattern check but not the store's parser
    let mut form = timer_form("Impossible", "2000");
    form["day"] = json!("2024-13-5");
    let response = ctx.server.post("/timers").form(&form).await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Creating timer failed!");
    assert_eq!(ctx.store.count().await, 0);
}

#[tokio::test]
async fn test_create_duplicate_is_rejected() {
    let ctx = create_test_server();

    ctx.server
        .post("/timers")
        .form(&timer_form("First", "2000"))
        .await
        .assert_status(StatusCode::OK);
    let response = ctx
        .server
        .post("/timers")
        .form(&timer_form("Second", "2000"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Timer already defined!");
    assert_eq!(ctx.store.count().await, 1);
}

#[tokio::test]
async fn test_update_with_unknown_timer_id_fails_immediately() {
    let ctx = create_test_server();

    // every other field is invalid too; only timer_id is reported
    let response = ctx
        .server
        .put("/timers")
        .form(&json!({
            "timer_id": "42",
            "flags": "3",
            "file": "",
            "start": "9999",
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        response.text(),
        "The following parameters aren't valid: timer_id!"
    );
}

#[tokio::test]
async fn test_update_falls_back_to_existing_values() {
    let ctx = create_test_server();

    ctx.server
        .post("/timers")
        .form(&timer_form("Original", "2000"))
        .await
        .assert_status(StatusCode::OK);

    let response = ctx
        .server
        .put("/timers")
        .form(&json!({
            "timer_id": "0",
            "flags": "1",
            "file": "Renamed",
            "start": "9999",
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = ctx.server.get("/timers.json").await.json();
    let timer = &body["timers"][0];
    assert_eq!(timer["filename"], "Renamed");
    // invalid start fell back to the stored value
    assert_eq!(timer["start"], 2000);
    assert_eq!(timer["stop"], 2100);
    assert_eq!(timer["priority"], 10);
    assert_eq!(timer["lifetime"], 25);
    assert_eq!(timer["day"], "2024-03-05");
    assert_eq!(timer["channel"], 1);
    assert_eq!(ctx.store.count().await, 1);
}

#[tokio::test]
async fn test_list_window_emits_third_of_five() {
    let ctx = create_test_server();

    for start in ["2000", "2001", "2002", "2003", "2004"] {
        ctx.server
            .post("/timers")
            .form(&timer_form(&format!("Show {start}"), start))
            .await
            .assert_status(StatusCode::OK);
    }

    let response = ctx
        .server
        .get("/timers.json")
        .add_query_param("start", 2)
        .add_query_param("limit", 1)
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 5);
    assert_eq!(body["timers"].as_array().unwrap().len(), 1);
    assert_eq!(body["timers"][0]["start"], 2002);
    assert_eq!(body["timers"][0]["id"], "2");
}

#[tokio::test]
async fn test_list_xml_escapes_and_counts() {
    let ctx = create_test_server();

    let mut form = timer_form("Tom & Jerry", "2000");
    form["channel"] = json!("C1-1-2");
    ctx.server
        .post("/timers")
        .form(&form)
        .await
        .assert_status(StatusCode::OK);

    let response = ctx.server.get("/timers.xml").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type"), "text/xml; charset=utf-8");

    let body = response.text();
    assert!(body.contains("<timers xmlns=\"urn:recast:timers\">"));
    assert!(body.contains("<param name=\"filename\">Tom &amp; Jerry</param>"));
    assert!(body.contains("<param name=\"channelname\">News &lt;24/7&gt;</param>"));
    assert!(body.contains("<param name=\"channel\">2</param>"));
    assert!(body.ends_with("<count>1</count><total>1</total></timers>"));
}

#[tokio::test]
async fn test_list_html_is_a_filename_list() {
    let ctx = create_test_server();

    ctx.server
        .post("/timers")
        .form(&timer_form("Evening News", "2000"))
        .await
        .assert_status(StatusCode::OK);

    let response = ctx.server.get("/timers.html").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type"), "text/html; charset=utf-8");

    let body = response.text();
    assert!(body.contains("<ul>"));
    assert!(body.contains("<li>Evening News"));
}

#[tokio::test]
async fn test_list_rejects_unknown_format() {
    let ctx = create_test_server();

    for path in ["/timers.csv", "/timers"] {
        let response = ctx.server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.text(),
            "Resources are not available for the selected format. (Use: .json, .html or .xml)"
        );
    }
}

#[tokio::test]
async fn test_delete_stops_a_running_recording_first() {
    let ctx = create_test_server();

    ctx.server
        .post("/timers")
        .form(&timer_form("Live Match", "2000"))
        .await
        .assert_status(StatusCode::OK);
    ctx.store.set_recording(0, true).await.unwrap();

    let response = ctx.server.delete("/timers/0").await;
    response.assert_status(StatusCode::OK);

    assert_eq!(ctx.recordings.stopped(), vec!["Live Match".to_string()]);
    assert_eq!(ctx.store.count().await, 0);
}

#[tokio::test]
async fn test_delete_unknown_timer_is_not_found() {
    let ctx = create_test_server();

    for path in ["/timers/9", "/timers/abc"] {
        let response = ctx.server.delete(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "Timer id invalid!");
    }

    let response = ctx.server.delete("/timers").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_bounce_while_store_is_being_edited() {
    let ctx = create_test_server();

    let guard = ctx.store.try_begin_edit().unwrap();

    let response = ctx
        .server
        .post("/timers")
        .form(&timer_form("Blocked", "2000"))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.text(), "Timers are being edited - try again later");

    let response = ctx.server.delete("/timers/0").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    assert_eq!(ctx.store.count().await, 0);

    drop(guard);
    ctx.server
        .post("/timers")
        .form(&timer_form("Unblocked", "2000"))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.store.count().await, 1);
}

#[tokio::test]
async fn test_unsupported_methods_get_501() {
    let ctx = create_test_server();

    let response = ctx.server.patch("/timers").await;
    response.assert_status(StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        response.text(),
        "Only GET, DELETE, POST and PUT methods are supported."
    );
}
