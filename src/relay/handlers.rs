//! HTTP handlers for the mentor endpoints
//!
//! Both mentor endpoints walk the same ordered fallback chain - live
//! stream (streaming endpoint only), one-shot completion, canned reply -
//! so a user-facing chat bubble is always populated. Provider failures
//! never surface as HTTP errors; only malformed client input does.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use futures::StreamExt;
use serde_json::{Value, json};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::AppState;
use super::pacing::{GROUP_DELAY, WordGroups, word_delay};
use crate::fallback;
use crate::provider::{CompletionRequest, Message, Provider, StreamEvent};

/// Provider label reported when a canned reply was served.
const FALLBACK_PROVIDER: &str = "fallback";

/// In-band apology when the response stream itself breaks.
const EMERGENCY_TEXT: &str =
    "I'm sorry - something went wrong while answering. Please try again.";

/// Health check and status endpoint
pub async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.config.provider_label,
        "model": state.config.model,
        "live": state.provider.is_some(),
    }))
}

// ============================================================================
// Request Parsing
// ============================================================================

/// Parse the shared request body `{ message, conversationHistory? }`.
///
/// Parsed from raw bytes so every malformed shape - bad JSON, missing or
/// non-string or empty message - answers 400, not axum's extractor codes.
/// Malformed history entries are skipped; valid ones keep their order.
fn parse_request(body: &Bytes) -> Result<CompletionRequest, &'static str> {
    let body: Value = serde_json::from_slice(body).map_err(|_| "invalid JSON body")?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .ok_or("message is required")?;

    let history: Vec<Message> = body
        .get("conversationHistory")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    Ok(CompletionRequest::new(message).with_history(history))
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

// ============================================================================
// Non-streaming Endpoint
// ============================================================================

/// POST /api/ai-mentor - one JSON payload, completion with canned fallback.
pub async fn mentor_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(message) => return bad_request(message),
    };

    let (response, provider_name) = match &state.provider {
        Some(provider) => match provider.complete(&request).await {
            Ok(text) => (text, provider.name()),
            Err(e) => {
                // Quota-like failures get a clearer log line; the fallback
                // itself is unconditional regardless of error type.
                let detail = e.to_string().to_lowercase();
                if detail.contains("429") || detail.contains("quota") || detail.contains("rate") {
                    tracing::warn!(error = %e, "Completion quota exhausted, serving canned reply");
                } else {
                    tracing::warn!(error = %e, "Completion failed, serving canned reply");
                }
                (fallback::generate(&request.message), FALLBACK_PROVIDER)
            }
        },
        None => (fallback::generate(&request.message), FALLBACK_PROVIDER),
    };

    Json(json!({
        "response": response,
        "timestamp": Utc::now().to_rfc3339(),
        "provider": provider_name,
    }))
    .into_response()
}

// ============================================================================
// Streaming Endpoint
// ============================================================================

/// POST /api/ai-mentor-stream - paced plain-text stream.
///
/// The response commits to 200 before the first tier runs; any failure
/// after that degrades to in-band text, never a status code. The body is
/// fed by a spawned relay task through a channel - a failed send means
/// the client dropped the connection.
pub async fn mentor_stream_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(message) => return bad_request(message),
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    tokio::spawn(run_relay(state, request, tx));

    let stream = ReceiverStream::new(rx).map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk)));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Write failure: the response body was dropped client-side.
struct Disconnected;

async fn write(tx: &mpsc::Sender<String>, chunk: String) -> Result<(), Disconnected> {
    tx.send(chunk).await.map_err(|_| Disconnected)
}

/// Outcome of the streaming tier.
enum StreamOutcome {
    /// Stream ran to completion; the response is fully written.
    Completed,
    /// Provider failed before or during the stream; fall through. Tracks
    /// whether partial live output already reached the client.
    Failed { wrote_partial: bool },
}

/// The fallback chain, tried in order: live stream, one-shot completion,
/// canned reply. Runs detached from the handler; its only output is the
/// response channel.
async fn run_relay(state: AppState, request: CompletionRequest, tx: mpsc::Sender<String>) {
    let outcome: Result<(), Disconnected> = async {
        if let Some(provider) = &state.provider {
            match stream_tier(provider.as_ref(), &request, &tx).await? {
                StreamOutcome::Completed => return Ok(()),
                StreamOutcome::Failed { wrote_partial } => {
                    if wrote_partial {
                        // Partial live output already reached the client;
                        // separate it from the replacement answer.
                        write(&tx, "\n\n".to_string()).await?;
                    }
                }
            }

            match provider.complete(&request).await {
                Ok(text) => return write_paced(&tx, &text).await,
                Err(e) => {
                    tracing::warn!(error = %e, "One-shot completion failed, serving canned reply");
                }
            }
        }

        write_paced(&tx, &fallback::generate(&request.message)).await
    }
    .await;

    if outcome.is_err() {
        tracing::debug!("Client disconnected mid-response");
        // Write failure here means the response channel is closed, so this
        // apology cannot be delivered either; the attempt is kept so the
        // emergency text goes out on any transport whose write failures
        // are recoverable.
        let _ = tx.send(EMERGENCY_TEXT.to_string()).await;
    }
}

/// Tier 1: consume the provider's live stream, flushing word groups with
/// a flat typing delay.
async fn stream_tier(
    provider: &dyn Provider,
    request: &CompletionRequest,
    tx: &mpsc::Sender<String>,
) -> Result<StreamOutcome, Disconnected> {
    let mut rx = match provider.stream(request).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!(error = %e, "Streaming completion failed to start");
            return Ok(StreamOutcome::Failed {
                wrote_partial: false,
            });
        }
    };

    let mut groups = WordGroups::new();
    let mut wrote_partial = false;
    let mut produced_text = false;

    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::TextDelta(delta) => {
                produced_text = true;
                for group in groups.push(&delta) {
                    write(tx, group).await?;
                    wrote_partial = true;
                    tokio::time::sleep(GROUP_DELAY).await;
                }
            }
            StreamEvent::Error(e) => {
                tracing::warn!(error = %e, "Stream interrupted");
                return Ok(StreamOutcome::Failed { wrote_partial });
            }
            StreamEvent::Done => {
                if !produced_text {
                    // A stream that ends without a single fragment counts
                    // as a failure, same as an eager error.
                    tracing::warn!("Stream produced no text");
                    return Ok(StreamOutcome::Failed { wrote_partial });
                }
                if let Some(rest) = groups.finish() {
                    write(tx, rest).await?;
                }
                return Ok(StreamOutcome::Completed);
            }
        }
    }

    // Producer dropped without Done - treat as an interruption.
    Ok(StreamOutcome::Failed { wrote_partial })
}

/// Tiers 2 and 3: write a full text word by word with the length- and
/// punctuation-scaled delays. Chunks concatenate back to `text` exactly.
async fn write_paced(tx: &mpsc::Sender<String>, text: &str) -> Result<(), Disconnected> {
    for (i, word) in text.split(' ').enumerate() {
        tokio::time::sleep(word_delay(word)).await;
        let chunk = if i == 0 {
            word.to_string()
        } else {
            format!(" {word}")
        };
        write(tx, chunk).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MessageRole;

    fn bytes(v: Value) -> Bytes {
        Bytes::from(serde_json::to_vec(&v).unwrap())
    }

    #[test]
    fn test_parse_request_happy_path() {
        let request = parse_request(&bytes(json!({
            "message": "explain lifetimes",
            "conversationHistory": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello!" },
            ],
        })))
        .unwrap();

        assert_eq!(request.message, "explain lifetimes");
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role, MessageRole::User);
        assert_eq!(request.history[1].content, "hello!");
        assert_eq!(request.context, "developer-mentor");
    }

    #[test]
    fn test_parse_request_rejects_missing_message() {
        assert!(parse_request(&bytes(json!({}))).is_err());
        assert!(parse_request(&bytes(json!({ "message": 42 }))).is_err());
        assert!(parse_request(&bytes(json!({ "message": "" }))).is_err());
    }

    #[test]
    fn test_parse_request_rejects_invalid_json() {
        assert!(parse_request(&Bytes::from_static(b"")).is_err());
        assert!(parse_request(&Bytes::from_static(b"not json")).is_err());
    }

    #[test]
    fn test_parse_request_skips_malformed_history() {
        let request = parse_request(&bytes(json!({
            "message": "hello",
            "conversationHistory": [
                { "role": "user", "content": "first" },
                { "role": "narrator" },
                { "role": "assistant", "content": "second" },
            ],
        })))
        .unwrap();

        let contents: Vec<&str> = request.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_paced_reassembles_exactly() {
        let (tx, mut rx) = mpsc::channel(64);
        let text = "Two roads diverged\nin a yellow wood.";
        write_paced(&tx, text).await.map_err(|_| ()).unwrap();
        drop(tx);

        let mut collected = String::new();
        while let Some(chunk) = rx.recv().await {
            collected.push_str(&chunk);
        }
        assert_eq!(collected, text);
    }
}
