//! Line-buffered JSONL primitive parser (spec §4.2 step 5), grounded on the
//! SSE line-buffering pattern used for the provider's own streaming parser:
//! accumulate chunk bytes into a string buffer, split on complete lines, and
//! carry a partial trailing line into the next chunk.

use aide_core::Primitive;

/// One decoded unit from a provider's raw text stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A primitive event, normalized from the wire's compact `t`/`p` keys.
    Primitive(Primitive),
    /// Free-form text outside of any JSON line (spec §4.2 step 5).
    Voice(String),
    /// A line that looked like JSON but didn't parse as a known primitive.
    /// Skipped; the caller is expected to log it, not abort the stream.
    Malformed(String),
}

/// Accumulates raw provider text across chunks and yields complete lines as
/// [`ParsedLine`]s. The reducer never sees raw wire text — only the
/// normalized [`Primitive`] this parser produces.
#[derive(Debug, Default)]
pub struct LineParser {
    buffer: String,
}

impl LineParser {
    /// A fresh parser with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of raw text, returning every complete line it
    /// completed (including lines that were already partially buffered).
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<ParsedLine> {
        self.buffer.push_str(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim_end_matches('\r').to_string();
            self.buffer.drain(..=pos);
            if let Some(parsed) = parse_line(&line) {
                out.push(parsed);
            }
        }
        out
    }

    /// Flush whatever partial line remains in the buffer (end of stream).
    pub fn finish(&mut self) -> Option<ParsedLine> {
        let remainder = std::mem::take(&mut self.buffer);
        parse_line(remainder.trim())
    }
}

/// Parse one logical line. Blank lines produce nothing; lines that look
/// like a JSON object are treated as a primitive attempt; anything else is
/// voice text.
fn parse_line(line: &str) -> Option<ParsedLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('{') {
        return Some(ParsedLine::Voice(trimmed.to_string()));
    }
    match normalize_and_parse(trimmed) {
        Ok(primitive) => Some(ParsedLine::Primitive(primitive)),
        Err(_) => Some(ParsedLine::Malformed(trimmed.to_string())),
    }
}

/// Remap the wire's compact `{"t": "...", "p": {...}}` shape onto the
/// canonical `{"type": "...", "payload": {...}}` shape [`Primitive`]
/// deserializes from, then parse it.
fn normalize_and_parse(line: &str) -> Result<Primitive, serde_json::Error> {
    let raw: serde_json::Value = serde_json::from_str(line)?;
    let canonical = canonicalize(raw)?;
    serde_json::from_value(canonical)
}

fn canonicalize(raw: serde_json::Value) -> Result<serde_json::Value, serde_json::Error> {
    use serde::de::Error as _;
    use serde_json::{Map, Value};

    let obj = raw.as_object().ok_or_else(|| serde_json::Error::custom("primitive line is not a JSON object"))?;

    if obj.contains_key("type") {
        return Ok(Value::Object(obj.clone()));
    }

    let type_name = obj
        .get("t")
        .and_then(Value::as_str)
        .ok_or_else(|| serde_json::Error::custom("missing \"t\" type tag"))?;
    let payload = obj.get("p").cloned().unwrap_or(Value::Object(Map::new()));

    let mut canonical = Map::new();
    canonical.insert("type".into(), Value::String(type_name.to_string()));
    canonical.insert("payload".into(), payload);
    Ok(Value::Object(canonical))
}
