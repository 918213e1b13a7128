//! Server-sent event stream
//!
//! Bridges the broadcast bus onto an SSE response: one named event per
//! bus message with a JSON data line, plus a periodic comment line so
//! idle connections stay open through proxies. Subscribers that lag
//! behind the bus capacity skip the missed events and continue.

use std::convert::Infallible;
use std::time::Duration;

use actix_web::{get, web, HttpResponse};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tracing::warn;

use crate::core::{JukeEvent, Pipeline};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

fn sse_frame(event: &JukeEvent) -> Option<Bytes> {
    let payload = serde_json::to_string(event).ok()?;
    Some(Bytes::from(format!(
        "event: {}\ndata: {}\n\n",
        event.name(),
        payload
    )))
}

/// Subscribe to the live event stream
#[get("")]
pub async fn stream_events(pipeline: web::Data<Pipeline>) -> HttpResponse {
    let rx = pipeline.bus().subscribe();

    let events = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => sse_frame(&event).map(Ok::<_, Infallible>),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "event subscriber lagged");
                None
            }
        }
    });

    let heartbeat = IntervalStream::new(tokio::time::interval(HEARTBEAT_INTERVAL))
        .map(|_| Ok::<_, Infallible>(Bytes::from_static(b": keep-alive\n\n")));

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream::select(events, heartbeat))
}

/// Configure event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(stream_events);
}
