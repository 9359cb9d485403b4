//! Incremental decoders for the two wire formats.
//!
//! Both transports deliver bytes in arbitrary-sized chunks; these decoders
//! own all buffering so the read loops stay trivial. A chunk may end in
//! the middle of a multi-byte UTF-8 sequence or in the middle of a line;
//! both carry over to the next feed.

/// Prefix of a payload-bearing line on the chunked answer stream.
const DATA_PREFIX: &str = "data: ";

/// Metadata envelope emitted once per run by the server; never content.
const RUN_ID_PREFIX: &str = "data: {\"run_id\":";

/// Marker substituted for literal `\n` escapes in decoded payloads.
const LINE_BREAK: &str = "<br>";

// ── UTF-8 reassembly ─────────────────────────────────────────────────

/// Reassembles UTF-8 text from byte chunks that may split a character.
///
/// An incomplete trailing sequence is held back until the next push;
/// bytes that can never complete a sequence decode to U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8ChunkBuffer {
    pending: Vec<u8>,
}

impl Utf8ChunkBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(_) => {
                    out.push_str(&String::from_utf8_lossy(&self.pending));
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        // Invalid sequence: replace it and move on.
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid + bad);
                        }
                        // Incomplete trailing sequence: keep for next feed.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }
}

// ── Chunked answer stream ────────────────────────────────────────────

/// Decodes the chunked answer body into ordered text fragments.
///
/// Lines arrive `data: `-prefixed; the `run_id` envelope is metadata and
/// never becomes a fragment. Payloads are trimmed, stripped of double
/// quotes, and literal `\n` escapes become `<br>`. An empty payload still
/// emits an empty fragment - a blank line may be server-intended output.
///
/// One decoder serves exactly one response body; it is not restartable.
#[derive(Debug, Default)]
pub struct AnswerLineDecoder {
    utf8: Utf8ChunkBuffer,
    line_buf: String,
}

impl AnswerLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk; returns the fragments it completed, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.line_buf.push_str(&self.utf8.push(bytes));
        let mut fragments = Vec::new();
        while let Some(line_end) = self.line_buf.find('\n') {
            let line: String = self.line_buf.drain(..=line_end).collect();
            if let Some(fragment) = decode_line(line.trim_end_matches('\n')) {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Flush a final unterminated line once the stream has ended.
    pub fn finish(mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.line_buf);
        if tail.is_empty() {
            None
        } else {
            decode_line(&tail)
        }
    }
}

fn decode_line(line: &str) -> Option<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if !line.starts_with(DATA_PREFIX) || line.starts_with(RUN_ID_PREFIX) {
        return None;
    }
    let payload = line[DATA_PREFIX.len()..].trim();
    Some(payload.replace('"', "").replace("\\n", LINE_BREAK))
}

// ── SSE event stream ─────────────────────────────────────────────────

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field when the server names the event type.
    pub event: Option<String>,
    /// All `data:` lines of the event, joined with newlines.
    pub data: String,
}

/// Decodes a `text/event-stream` body into discrete events.
///
/// Events end at a blank line; `:`-prefixed comment lines (the server's
/// keepalive pings) and `id:`/`retry:` fields are skipped. An event with
/// no data line dispatches nothing, matching browser `EventSource`.
#[derive(Debug, Default)]
pub struct SseEventDecoder {
    utf8: Utf8ChunkBuffer,
    line_buf: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseEventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk; returns the events it completed, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.line_buf.push_str(&self.utf8.push(bytes));
        let mut events = Vec::new();
        while let Some(line_end) = self.line_buf.find('\n') {
            let line: String = self.line_buf.drain(..=line_end).collect();
            let line = line.trim_end_matches('\n');
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                if let Some(event) = self.take_event() {
                    events.push(event);
                }
            } else {
                self.field_line(line);
            }
        }
        events
    }

    fn field_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return; // keepalive comment
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            _ => {} // id, retry: not used by this client
        }
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() {
            self.event = None;
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: self.event.take(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_data_lines_emit_nothing() {
        let mut decoder = AnswerLineDecoder::new();
        assert!(decoder.feed(b"event: message\n").is_empty());
        assert!(decoder.feed(b"plain text line\n").is_empty());
        assert!(decoder.feed(b"\n").is_empty());
    }

    #[test]
    fn run_id_envelope_is_suppressed() {
        let mut decoder = AnswerLineDecoder::new();
        let fragments = decoder.feed(b"data: {\"run_id\": \"abc-123\"}\ndata: real content\n");
        assert_eq!(fragments, vec!["real content"]);
    }

    #[test]
    fn quotes_strip_and_escapes_become_breaks() {
        let mut decoder = AnswerLineDecoder::new();
        let fragments = decoder.feed(b"data: \"hello\\nworld\"\n");
        assert_eq!(fragments, vec!["hello<br>world"]);
    }

    #[test]
    fn fragments_preserve_read_order_across_feeds() {
        let mut decoder = AnswerLineDecoder::new();
        assert_eq!(decoder.feed(b"data: A\n"), vec!["A"]);
        assert_eq!(decoder.feed(b"data: B\n"), vec!["B"]);
    }

    #[test]
    fn empty_payload_still_emits_a_fragment() {
        let mut decoder = AnswerLineDecoder::new();
        let fragments = decoder.feed(b"data: \n");
        assert_eq!(fragments, vec![""]);
    }

    #[test]
    fn line_split_across_chunks_reassembles() {
        let mut decoder = AnswerLineDecoder::new();
        assert!(decoder.feed(b"data: hel").is_empty());
        assert_eq!(decoder.feed(b"lo\n"), vec!["hello"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks_decodes_intact() {
        let mut decoder = AnswerLineDecoder::new();
        // "é" is 0xC3 0xA9; split it across two reads.
        assert!(decoder.feed(b"data: caf\xC3").is_empty());
        assert_eq!(decoder.feed(b"\xA9\n"), vec!["café"]);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut decoder = AnswerLineDecoder::new();
        assert_eq!(decoder.feed(b"data: hello\r\n"), vec!["hello"]);
    }

    #[test]
    fn finish_flushes_an_unterminated_tail() {
        let mut decoder = AnswerLineDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
    }

    #[test]
    fn finish_with_no_tail_is_empty() {
        let mut decoder = AnswerLineDecoder::new();
        decoder.feed(b"data: done\n");
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn sse_events_end_at_blank_lines() {
        let mut decoder = SseEventDecoder::new();
        let events = decoder.feed(b"data: first\n\ndata: second\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "first");
        assert_eq!(events[1].data, "second");
    }

    #[test]
    fn sse_multiline_data_joins_with_newlines() {
        let mut decoder = SseEventDecoder::new();
        let events = decoder.feed(b"data: one\ndata: two\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "one\ntwo");
    }

    #[test]
    fn sse_keepalive_comments_dispatch_nothing() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.feed(b": ping\n\n").is_empty());
        let events = decoder.feed(b": ping\ndata: payload\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "payload");
    }

    #[test]
    fn sse_event_field_is_captured() {
        let mut decoder = SseEventDecoder::new();
        let events = decoder.feed(b"event: answer\ndata: hi\n\n");
        assert_eq!(events[0].event.as_deref(), Some("answer"));
    }

    #[test]
    fn sse_event_split_across_chunks_reassembles() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.feed(b"data: par").is_empty());
        assert!(decoder.feed(b"tial\n").is_empty());
        let events = decoder.feed(b"\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "partial");
    }

    #[test]
    fn sse_crlf_framing_is_tolerated() {
        let mut decoder = SseEventDecoder::new();
        let events = decoder.feed(b"data: hello\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn sse_event_without_data_is_dropped() {
        let mut decoder = SseEventDecoder::new();
        assert!(decoder.feed(b"event: noop\n\n").is_empty());
    }
}
