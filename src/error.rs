//! Import and export errors.

use std::fmt;

use thiserror::Error;

/// Location of an event in the CanorusML source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Byte offset into the input
    pub offset: usize,
}

impl Position {
    /// Compute line and column of a byte offset into `input`.
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What went wrong while importing.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An element appeared without the parent it needs, or inside the
    /// wrong kind of context.
    #[error("{0}")]
    StructuralPrecondition(String),

    /// A voice index recorded during parsing does not name a voice of the
    /// sheet.
    #[error(
        "{referrer} refers to voice index {index}, but sheet '{sheet}' has only {voice_count} voice(s)"
    )]
    UnresolvedReference {
        sheet: String,
        referrer: String,
        index: i32,
        voice_count: usize,
    },

    /// A slur end without a start, or a tie/slur still open when its
    /// voice closes.
    #[error("{0}")]
    MalformedSlurPairing(String),

    #[error("failed to read CanorusML input: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not well-formed markup.
    #[error("malformed markup: {0}")]
    Markup(String),
}

/// An import failure: the error kind and, when known, where it happened.
#[derive(Debug, Error)]
#[error("{kind}{}", at(.position))]
pub struct ImportError {
    kind: ErrorKind,
    position: Option<Position>,
}

fn at(position: &Option<Position>) -> String {
    position.map(|p| format!(" ({p})")).unwrap_or_default()
}

impl ImportError {
    pub fn new(kind: ErrorKind, position: Option<Position>) -> Self {
        Self { kind, position }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The diagnostic without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<ErrorKind> for ImportError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ErrorKind::Io(e).into()
    }
}

/// Failure while writing CanorusML.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write element <{element}>: {message}")]
    Write { element: String, message: String },

    #[error("written document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
