//! Markup events — turns CanorusML text into a stream of open-tag,
//! close-tag and text events and feeds them to a [`ContentHandler`].
//!
//! The reader owns all position bookkeeping: handlers report failures as
//! a bare [`ErrorKind`] and the reader attaches the line and column of the
//! event that caused them.

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ErrorKind, ImportError, Position};

/// Attributes of an opened element, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing an earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `key`, empty when absent.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Value of `key` when present and non-empty.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Decimal integer value of `key`. Absent or empty values read as 0;
    /// values that are not integers read as 0 and are logged.
    pub fn int(&self, key: &str) -> i32 {
        match self.non_empty(key) {
            None => 0,
            Some(v) => v.trim().parse().unwrap_or_else(|_| {
                warn!("attribute {key}=\"{v}\" is not an integer, using 0");
                0
            }),
        }
    }

    /// Boolean value of `key`: only the literal "1" is true.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

/// Receiver of markup events, called in source order.
pub trait ContentHandler {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<(), ErrorKind>;
    fn end_element(&mut self, name: &str) -> Result<(), ErrorKind>;
    fn characters(&mut self, text: &str) -> Result<(), ErrorKind>;
}

/// Read `input` to the end and feed every event to `handler`.
///
/// Self-closing elements produce a start and an end event. Comments,
/// processing instructions and the XML declaration are skipped. Fails on
/// ill-formed markup, on elements left open at the end of input and on
/// nesting deeper than `max_depth`.
pub fn read_events<H: ContentHandler>(
    input: &str,
    handler: &mut H,
    max_depth: usize,
) -> Result<(), ImportError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut open: Vec<String> = Vec::new();

    loop {
        let start = reader.buffer_position();
        let event = reader.read_event().map_err(|e| {
            ImportError::new(
                ErrorKind::Markup(e.to_string()),
                Some(Position::from_offset(input, reader.buffer_position())),
            )
        })?;
        let fail = |kind: ErrorKind| ImportError::new(kind, Some(event_position(input, start)));

        match event {
            Event::Start(ref e) => {
                let (name, attributes) = element(e).map_err(fail)?;
                check_depth(open.len() + 1, max_depth).map_err(fail)?;
                handler.start_element(&name, &attributes).map_err(fail)?;
                open.push(name);
            }
            Event::Empty(ref e) => {
                let (name, attributes) = element(e).map_err(fail)?;
                check_depth(open.len() + 1, max_depth).map_err(fail)?;
                handler.start_element(&name, &attributes).map_err(fail)?;
                handler.end_element(&name).map_err(fail)?;
            }
            Event::End(ref e) => {
                let name = utf8(e.name().as_ref()).map_err(fail)?;
                open.pop();
                handler.end_element(&name).map_err(fail)?;
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| fail(ErrorKind::Markup(e.to_string())))?;
                handler.characters(&text).map_err(fail)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8(c.into_inner().into_owned())
                    .map_err(|e| fail(ErrorKind::Markup(e.to_string())))?;
                handler.characters(&text).map_err(fail)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.last() {
        return Err(ImportError::new(
            ErrorKind::Markup(format!("unexpected end of input: <{name}> is not closed")),
            Some(Position::from_offset(input, input.len())),
        ));
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn element(e: &BytesStart) -> Result<(String, Attributes), ErrorKind> {
    let name = utf8(e.name().as_ref())?;
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| ErrorKind::Markup(format!("invalid attribute in <{name}>: {err}")))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(|err| {
            ErrorKind::Markup(format!("invalid value of {key} in <{name}>: {err}"))
        })?;
        attributes.insert(key, value.into_owned());
    }
    Ok((name, attributes))
}

fn utf8(bytes: &[u8]) -> Result<String, ErrorKind> {
    std::str::from_utf8(bytes)
        .map(String::from)
        .map_err(|e| ErrorKind::Markup(format!("invalid UTF-8 in name: {e}")))
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), ErrorKind> {
    if depth > max_depth {
        return Err(ErrorKind::Markup(format!(
            "elements nested deeper than {max_depth} levels"
        )));
    }
    Ok(())
}

/// The reader's offset before an event may still sit on whitespace that
/// trimming swallowed; point at the markup itself.
fn event_position(input: &str, offset: usize) -> Position {
    let skipped = input
        .get(offset..)
        .map_or(0, |rest| rest.len() - rest.trim_start().len());
    Position::from_offset(input, offset + skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events as readable strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ContentHandler for Recorder {
        fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<(), ErrorKind> {
            let attrs: Vec<String> = attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.events.push(format!("open {name} [{}]", attrs.join(",")));
            Ok(())
        }

        fn end_element(&mut self, name: &str) -> Result<(), ErrorKind> {
            self.events.push(format!("close {name}"));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<(), ErrorKind> {
            self.events.push(format!("text {text}"));
            Ok(())
        }
    }

    #[test]
    fn empty_elements_open_and_close() {
        let mut rec = Recorder::default();
        read_events(
            r#"<?xml version="1.0"?><a x="1"><!-- c --><b y="&amp;"/>hi</a>"#,
            &mut rec,
            8,
        )
        .unwrap();
        assert_eq!(
            rec.events,
            vec!["open a [x=1]", "open b [y=&]", "close b", "text hi", "close a"]
        );
    }

    #[test]
    fn unclosed_element_is_reported() {
        let mut rec = Recorder::default();
        let err = read_events("<a><b></b>", &mut rec, 8).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Markup(m) if m.contains("<a>")));
    }

    #[test]
    fn mismatched_end_tag_has_position() {
        let mut rec = Recorder::default();
        let err = read_events("<a>\n<b></c></a>", &mut rec, 8).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Markup(_)));
        assert_eq!(err.position().map(|p| p.line), Some(2));
    }

    #[test]
    fn depth_limit() {
        let mut rec = Recorder::default();
        let err = read_events("<a><b><c/></b></a>", &mut rec, 2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Markup(m) if m.contains("deeper")));
    }

    #[test]
    fn handler_errors_carry_event_position() {
        struct Refuse;
        impl ContentHandler for Refuse {
            fn start_element(&mut self, name: &str, _: &Attributes) -> Result<(), ErrorKind> {
                if name == "bad" {
                    return Err(ErrorKind::StructuralPrecondition("no".into()));
                }
                Ok(())
            }
            fn end_element(&mut self, _: &str) -> Result<(), ErrorKind> {
                Ok(())
            }
            fn characters(&mut self, _: &str) -> Result<(), ErrorKind> {
                Ok(())
            }
        }

        let err = read_events("<a>\n\n    <bad/>\n</a>", &mut Refuse, 8).unwrap_err();
        let pos = err.position().unwrap();
        assert_eq!((pos.line, pos.column), (3, 5));
    }

    #[test]
    fn attribute_helpers() {
        let attrs = Attributes::new()
            .with("n", "12")
            .with("bad", "x")
            .with("on", "1")
            .with("off", "true");
        assert_eq!(attrs.int("n"), 12);
        assert_eq!(attrs.int("bad"), 0);
        assert_eq!(attrs.int("missing"), 0);
        assert!(attrs.flag("on"));
        assert!(!attrs.flag("off"));
        assert_eq!(attrs.value("missing"), "");
    }
}
