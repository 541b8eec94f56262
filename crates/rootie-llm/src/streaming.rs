use std::collections::VecDeque;
use std::fmt::Display;

use anyhow::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::traits::ChatEventStream;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental, non-empty fragment of the assistant reply
    Message {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Outcome of feeding one SSE line to the parser
enum LineOutcome {
    Events(Vec<StreamEvent>),
    Finished,
    Skip,
}

fn parse_line(line_bytes: &[u8]) -> Result<LineOutcome> {
    let Ok(line_str) = std::str::from_utf8(line_bytes) else {
        return Ok(LineOutcome::Skip);
    };
    let line = line_str.trim();

    let Some(data) = line.strip_prefix("data:") else {
        return Ok(LineOutcome::Skip);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(LineOutcome::Finished);
    }

    let chunk = serde_json::from_str::<ChatStreamChunk>(data)
        .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;
    Ok(LineOutcome::Events(chunk.to_stream_events()))
}

/// Parse a chat-completions SSE body into stream events.
///
/// Lines may be split across byte chunks; only `data:` lines are considered and
/// `[DONE]` ends the stream.
pub fn parse_sse_bytes<S, E>(stream: S) -> ChatEventStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        match parse_line(&line_bytes) {
                            Ok(LineOutcome::Events(events)) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Ok(LineOutcome::Finished) => {
                                yield Ok(StreamEvent::Done { finish_reason: None });
                                break 'outer;
                            }
                            Ok(LineOutcome::Skip) => {}
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }
        }

        // Trailing line without a final newline
        if !buffer.is_empty() {
            let line_bytes: Vec<u8> = buffer.drain(..).collect();
            match parse_line(&line_bytes) {
                Ok(LineOutcome::Events(events)) => {
                    for event in events {
                        yield Ok(event);
                    }
                }
                Ok(LineOutcome::Finished) => yield Ok(StreamEvent::Done { finish_reason: None }),
                Ok(LineOutcome::Skip) => {}
                Err(e) => yield Err(e),
            }
        }
    })
}

pub fn parse_chat_sse_stream(response: Response) -> ChatEventStream {
    parse_sse_bytes(response.bytes_stream())
}
