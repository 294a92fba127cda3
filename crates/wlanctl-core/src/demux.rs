// ── Line demultiplexer ──
//
// The only framing logic in the crate. Every line read from the control
// channel is either an unsolicited event or a fragment of the reply to
// the single outstanding command. There are no message IDs on the wire,
// so attribution is purely positional.

use crate::model::{DaemonEvent, EventKind};

/// Prefix shared by all control events, with or without a priority tag.
pub const EVENT_PREFIX: &str = "CTRL-EVENT-";

/// Result of classifying one incoming line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Event(DaemonEvent),
    Reply(ReplyFragment),
    /// The line carries nothing usable; the reason is for logging.
    Discard(&'static str),
}

/// A piece of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyFragment {
    Data(String),
    Terminal(Outcome),
}

/// How a reply ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    EndOfData,
    /// `FAIL`, `FAIL-<reason>` or `UNKNOWN COMMAND`, carried verbatim.
    Fail(String),
}

/// A fully assembled reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub outcome: Outcome,
}

/// Classify `line` given whether a command is currently outstanding.
///
/// Event lines win regardless of `outstanding`. Non-event lines with no
/// command in flight are protocol anomalies and are discarded.
pub fn classify(line: &str, outstanding: bool) -> Classified {
    if let Some(body) = event_body(line) {
        return parse_event(body);
    }

    let text = line.trim();
    if text.is_empty() {
        return Classified::Discard("blank line");
    }
    if !outstanding {
        return Classified::Discard("reply line with no command outstanding");
    }

    Classified::Reply(match text {
        "OK" => ReplyFragment::Terminal(Outcome::Ok),
        "END" => ReplyFragment::Terminal(Outcome::EndOfData),
        "UNKNOWN COMMAND" => ReplyFragment::Terminal(Outcome::Fail(text.to_owned())),
        t if t == "FAIL" || t.starts_with("FAIL-") => {
            ReplyFragment::Terminal(Outcome::Fail(t.to_owned()))
        }
        _ => ReplyFragment::Data(text.to_owned()),
    })
}

/// Strip the event marker: a leading `<tag>` (the daemon's priority
/// prefix) or a bare `CTRL-EVENT-` line.
fn event_body(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix('<') {
        let (tag, body) = rest.split_once('>')?;
        if tag.is_empty() || tag.contains(char::is_whitespace) {
            return None;
        }
        return Some(body);
    }
    line.starts_with(EVENT_PREFIX).then_some(line)
}

fn parse_event(body: &str) -> Classified {
    let body = body.trim();
    let (name, payload) = body
        .split_once(char::is_whitespace)
        .map_or((body, ""), |(name, rest)| (name, rest.trim()));

    if name.is_empty() {
        return Classified::Discard("event marker without an event name");
    }

    Classified::Event(DaemonEvent {
        kind: EventKind::from_name(name),
        payload: payload.to_owned(),
    })
}

/// Accumulates reply fragments for the outstanding command.
#[derive(Debug, Default)]
pub struct ReplyAssembler {
    lines: Vec<String>,
}

impl ReplyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment. Returns the finished reply on a terminal marker.
    pub fn push(&mut self, fragment: ReplyFragment) -> Option<Reply> {
        match fragment {
            ReplyFragment::Data(line) => {
                self.lines.push(line);
                None
            }
            ReplyFragment::Terminal(outcome) => Some(Reply {
                lines: std::mem::take(&mut self.lines),
                outcome,
            }),
        }
    }

    /// Drop any partial reply.
    pub fn reset(&mut self) {
        self.lines.clear();
    }
}
