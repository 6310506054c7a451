//! Line-delimited JSON request loop.
//!
//! Each non-blank input line is one request:
//! `{"id": <any>, "tool": "<name>", "arguments": {...}}`. Each request gets
//! exactly one reply line: the response envelope plus the echoed `id`. A line
//! that does not parse still gets a reply (code `INVALID_VALUE`, with the
//! 1-based line number) so callers can match replies to requests by count.

use crate::tools::{ListingTools, ResponseMetadata, ToolError, ToolResponse};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, Write};

#[derive(Clone, Debug, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub id: Value,
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Clone, Debug, Serialize)]
pub struct ToolReply {
    #[serde(skip_serializing_if = "Value::is_null")]
    pub id: Value,
    #[serde(flatten)]
    pub response: ToolResponse,
}

/// Counters reported when the input ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub requests: usize,
    pub failed: usize,
    pub malformed: usize,
}

/// Answer requests from `reader` until end of input.
///
/// I/O errors end the loop; request errors never do.
pub fn serve<R: BufRead, W: Write>(
    tools: &ListingTools<'_>,
    reader: R,
    mut writer: W,
) -> Result<ServeStats> {
    let mut stats = ServeStats::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.with_context(|| format!("reading request line {line_number}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<ToolRequest>(trimmed) {
            Ok(request) => {
                stats.requests += 1;
                let response = tools.call(&request.tool, &request.arguments);
                if !response.success {
                    stats.failed += 1;
                }
                ToolReply {
                    id: request.id,
                    response,
                }
            }
            Err(err) => {
                stats.malformed += 1;
                tracing::warn!(line = line_number, error = %err, "malformed request");
                let error = ToolError::invalid_arguments(format!(
                    "line {line_number}: malformed request: {err}"
                ))
                .with_details(json!({ "line": line_number }));
                ToolReply {
                    id: Value::Null,
                    response: ToolResponse::failed(error, ResponseMetadata::default()),
                }
            }
        };

        serde_json::to_writer(&mut writer, &reply)
            .with_context(|| format!("writing reply for line {line_number}"))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(stats)
}
