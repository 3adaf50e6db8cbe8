//! Stream events from an SSE endpoint
//!
//! Prints every event until the server stops the stream or the connection
//! cannot be re-established.
//!
//! Run with: cargo run --example stream_events -- http://localhost:8080/events

use sse_client::{Event, EventSource};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/events".to_string());

    println!("SSE Client Example");
    println!("==================\n");
    println!("Connecting to {url}");

    let mut source = EventSource::builder(url)
        .timeout(Duration::from_secs(60))
        .max_retries(Some(10))
        .build()?;

    while let Some(result) = source.next().await {
        match result {
            Ok(event) => print_event(&event),
            Err(e) if e.is_connection_error() => {
                eprintln!("\nConnection lost: {e}");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("\nStream closed (last event id: {:?})", source.last_event_id());
    Ok(())
}

fn print_event(event: &Event) {
    println!("\nReceived event:");
    println!("  Type: {}", event.event_type);
    println!("  Id: {:?}", event.id);
    println!("  Origin: {:?}", event.origin);
    println!("  Data: {}", event.data);
}
