use std::{pin::Pin, time::Duration};

use color_eyre::{Result, eyre};
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;

pub type SummaryStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streams a chat completion as plain content deltas. The request uses SSE
/// (`stream: true`); `[DONE]` and empty deltas are swallowed.
pub async fn stream(cfg: &rolo_config::LlmProviderConfig, messages: &[Value]) -> Result<SummaryStream> {
	// Connect timeout only. The body keeps streaming for as long as the model
	// talks, which can outlive any sane total timeout.
	let client = Client::builder().connect_timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
		"stream": true,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?
		.error_for_status()?;
	let deltas = stream_lines(res.bytes_stream()).filter_map(|line| async move {
		match line {
			Ok(line) => parse_summary_line(&line),
			Err(err) => Some(Err(err)),
		}
	});

	Ok(Box::pin(deltas))
}

/// One SSE line to at most one content delta. `None` skips empty lines,
/// non-data lines, `[DONE]`, and role-only chunks.
fn parse_summary_line(line: &str) -> Option<Result<String>> {
	let line = line.trim();

	if line.is_empty() {
		return None;
	}

	let data = line.strip_prefix("data: ")?.trim();

	if data == "[DONE]" {
		return None;
	}

	let chunk: Value = match serde_json::from_str(data) {
		Ok(chunk) => chunk,
		Err(err) => return Some(Err(eyre::eyre!("Failed to parse stream chunk: {err}."))),
	};
	let content = chunk
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("delta"))
		.and_then(|delta| delta.get("content"))
		.and_then(|c| c.as_str())
		.unwrap_or_default();

	if content.is_empty() {
		return None;
	}

	Some(Ok(content.to_string()))
}

fn stream_lines<S, B>(byte_stream: S) -> impl Stream<Item = Result<String>> + Send
where
	S: Stream<Item = reqwest::Result<B>> + Send + 'static,
	B: AsRef<[u8]> + Send,
{
	futures::stream::unfold(
		(Box::pin(byte_stream), String::new()),
		|(mut stream, mut buffer)| async move {
			loop {
				if let Some(newline_pos) = buffer.find('\n') {
					let line = buffer[..newline_pos].to_string();

					buffer = buffer[newline_pos + 1..].to_string();

					if !line.trim().is_empty() {
						return Some((Ok(line), (stream, buffer)));
					}

					continue;
				}

				match stream.next().await {
					Some(Ok(bytes)) => {
						buffer.push_str(&String::from_utf8_lossy(bytes.as_ref()));
					},
					Some(Err(err)) =>
						return Some((
							Err(eyre::eyre!("Stream read error: {err}.")),
							(stream, buffer),
						)),
					None => {
						if !buffer.trim().is_empty() {
							let remaining = std::mem::take(&mut buffer);

							return Some((Ok(remaining), (stream, buffer)));
						}

						return None;
					},
				}
			}
		},
	)
}
