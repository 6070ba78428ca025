//! Public chat endpoint used by embedded widgets

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequest, ChatResponse, Json, StreamErrorFrame};
use crate::domain::{
    build_messages, Chatbot, ChatbotId, Conversation, ConversationId, ConversationRepository,
    DomainError, LlmStream, Message, ProviderConfig, StoredMessage, StreamChunk,
};

/// Frames buffered between the relay task and the response body
const RELAY_BUFFER: usize = 32;

/// Streaming replies carry the conversation id here since frames are bare chunks
pub const CONVERSATION_ID_HEADER: HeaderName = HeaderName::from_static("x-conversation-id");

/// POST /api/chat
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let chatbot = load_chatbot(&state, &request.chatbot_id).await?;

    if !chatbot.allows_origin(origin) {
        warn!(chatbot_id = %chatbot.id(), origin = ?origin, "Origin not in chatbot allowlist");
        return Err(DomainError::forbidden("Domain not allowed for this chatbot").into());
    }

    let conversation_id = resolve_conversation(&state, &chatbot, &request).await?;

    info!(
        chatbot_id = %chatbot.id(),
        conversation_id = %conversation_id,
        provider = %chatbot.provider(),
        streaming = request.streaming,
        "Processing chat message"
    );

    let history: Vec<Message> = state
        .conversations
        .recent_messages(&conversation_id, state.history_limit)
        .await?
        .iter()
        .map(StoredMessage::to_message)
        .collect();

    let snippets = state
        .retriever
        .retrieve(chatbot.id(), &request.message)
        .await
        .unwrap_or_else(|e| {
            warn!(chatbot_id = %chatbot.id(), error = %e, "Context retrieval failed, continuing without context");
            Vec::new()
        });

    let config = provider_config(&state, &chatbot)?;
    let messages = build_messages(
        &request.message,
        &history,
        &snippets,
        chatbot.system_prompt(),
    );

    state
        .conversations
        .append_message(StoredMessage::user(conversation_id.clone(), &request.message))
        .await?;

    if request.streaming {
        stream_reply(&state, conversation_id, &messages, &config).await
    } else {
        blocking_reply(&state, conversation_id, &messages, &config).await
    }
}

async fn load_chatbot(state: &AppState, id: &str) -> Result<Chatbot, DomainError> {
    state
        .chatbots
        .get(&ChatbotId::new(id))
        .await?
        .filter(Chatbot::is_active)
        .ok_or_else(|| DomainError::not_found(format!("Chatbot '{}' not found", id)))
}

/// Continue the caller's conversation when it belongs to this chatbot, else start one
async fn resolve_conversation(
    state: &AppState,
    chatbot: &Chatbot,
    request: &ChatRequest,
) -> Result<ConversationId, DomainError> {
    let requested = request
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    if let Some(id) = requested {
        match state.conversations.get(&ConversationId::new(id)).await? {
            Some(existing) if existing.chatbot_id == *chatbot.id() => return Ok(existing.id),
            Some(_) => debug!(conversation_id = %id, "Conversation belongs to another chatbot"),
            None => debug!(conversation_id = %id, "Conversation not found"),
        }
    }

    let conversation = state
        .conversations
        .create(Conversation::new(
            chatbot.id().clone(),
            request.visitor_id.clone(),
        ))
        .await?;

    debug!(conversation_id = %conversation.id, "Started conversation");

    Ok(conversation.id)
}

/// Decrypt the chatbot's key into a per-call provider config
fn provider_config(state: &AppState, chatbot: &Chatbot) -> Result<ProviderConfig, DomainError> {
    let encrypted = chatbot
        .encrypted_api_key()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DomainError::configuration(format!(
                "Chatbot '{}' has no API key configured",
                chatbot.id()
            ))
        })?;

    let mut config = ProviderConfig::new(
        chatbot.provider(),
        chatbot.model(),
        state.cipher.decrypt(encrypted)?,
    );
    config.temperature = chatbot.temperature();
    config.max_tokens = chatbot.max_tokens();

    Ok(config)
}

async fn blocking_reply(
    state: &AppState,
    conversation_id: ConversationId,
    messages: &[Message],
    config: &ProviderConfig,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let reply = state.gateway.chat(messages, config).await?;
    let latency_ms = start.elapsed().as_millis() as u64;

    state
        .conversations
        .append_message(
            StoredMessage::assistant(conversation_id.clone(), &reply.content)
                .with_tokens_used(reply.tokens_used)
                .with_latency_ms(latency_ms),
        )
        .await?;

    Ok(Json(ChatResponse {
        response: reply.content,
        conversation_id: conversation_id.to_string(),
        tokens_used: reply.tokens_used,
    })
    .into_response())
}

async fn stream_reply(
    state: &AppState,
    conversation_id: ConversationId,
    messages: &[Message],
    config: &ProviderConfig,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let mut upstream = state.gateway.stream(messages, config).await?;

    // Failures before the first chunk still get a JSON error response
    let first = match upstream.next().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(e)) => return Err(e.into()),
        None => StreamChunk::done(),
    };

    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(RELAY_BUFFER);
    let conversation_header = conversation_id.to_string();

    tokio::spawn(relay_stream(
        Arc::clone(&state.conversations),
        conversation_id,
        start,
        first,
        upstream,
        tx,
    ));

    let sse = Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default());

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            // Hop-by-hop; hyper drops it on HTTP/2, so only HTTP/1.1 clients see it
            (header::CONNECTION, "keep-alive"),
        ],
        [(CONVERSATION_ID_HEADER, conversation_header)],
        sse,
    )
        .into_response())
}

/// Forward chunks to the client and persist the reply once the terminal chunk arrives.
///
/// Returning early drops `upstream`, which closes the vendor connection.
async fn relay_stream(
    conversations: Arc<dyn ConversationRepository>,
    conversation_id: ConversationId,
    start: Instant,
    first: StreamChunk,
    upstream: LlmStream,
    tx: mpsc::Sender<Result<Event, Infallible>>,
) {
    let mut chunks = stream::iter([Ok(first)]).chain(upstream);
    let mut reply = String::new();

    while let Some(item) = chunks.next().await {
        match item {
            Ok(chunk) if chunk.done => {
                reply.push_str(&chunk.content);

                let latency_ms = start.elapsed().as_millis() as u64;
                let stored = StoredMessage::assistant(conversation_id.clone(), reply)
                    .with_latency_ms(latency_ms);

                if let Err(e) = conversations.append_message(stored).await {
                    warn!(conversation_id = %conversation_id, error = %e, "Failed to persist streamed reply");
                }

                let _ = tx.send(Ok(frame(&chunk))).await;
                return;
            }
            Ok(chunk) => {
                reply.push_str(&chunk.content);

                if tx.send(Ok(frame(&chunk))).await.is_err() {
                    debug!(conversation_id = %conversation_id, "Client went away, abandoning stream");
                    return;
                }
            }
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "Stream failed mid-response");

                let error = StreamErrorFrame {
                    error: ApiError::from(e).message().to_string(),
                };
                let _ = tx.send(Ok(frame(&error))).await;
                return;
            }
        }
    }

    warn!(conversation_id = %conversation_id, "Stream ended without a terminal chunk");
}

fn frame<T: Serialize>(payload: &T) -> Event {
    Event::default().json_data(payload).unwrap_or_default()
}
