//! # Identifier Ledger
//!
//! A text file with one candidate EUI-64 per line:
//!
//! ```text
//! # EUI-64 range 70B3D5A4E0000000 - 70B3D5A4E00000FF, 2024-01-01 00:00:00 UTC
//! 70B3D5A4E0000000,RESERVED
//! 70B3D5A4E0000001,smenete,1.0.0,1704067200
//! 70B3D5A4E0000002,
//! 70B3D5A4E0000003
//! ```
//!
//! A data line is available iff nothing but whitespace follows its first
//! comma. Comment and blank lines pass through untouched. Every line keeps
//! its original text and line terminator, so rendering an unmodified ledger
//! reproduces the input byte for byte and marking an entry rewrites exactly
//! one line.

use std::fmt;
use std::path::Path;

use devsig_core::Eui64;

use crate::error::PoolError;

/// Annotation appended to an entry when it is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation(String);

impl Annotation {
    /// The annotation written for reserved boundary identifiers.
    pub const RESERVED: &'static str = "RESERVED";

    /// Wrap annotation text.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidAnnotation`] if the text is blank (the entry
    /// would still read as unused) or contains a line break.
    pub fn new(text: impl Into<String>) -> Result<Self, PoolError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PoolError::InvalidAnnotation {
                reason: "annotation is empty".to_string(),
            });
        }
        if text.contains(['\n', '\r']) {
            return Err(PoolError::InvalidAnnotation {
                reason: format!("annotation {text:?} contains a line break"),
            });
        }
        Ok(Self(text))
    }

    /// The annotation text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a ledger line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `#` comment.
    Comment,
    /// Empty or whitespace-only line.
    Blank,
    /// Identifier with no annotation.
    Available(Eui64),
    /// Identifier already issued or reserved.
    Annotated {
        /// The identifier.
        eui: Eui64,
        /// Everything after the first comma.
        annotation: String,
    },
}

impl Entry {
    /// The identifier on a data line.
    pub fn eui(&self) -> Option<Eui64> {
        match self {
            Self::Available(eui) | Self::Annotated { eui, .. } => Some(*eui),
            Self::Comment | Self::Blank => None,
        }
    }
}

/// One line of a ledger with its original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    terminator: &'static str,
    entry: Entry,
}

impl Line {
    /// Line text without its terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed content.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

/// A parsed ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    lines: Vec<Line>,
}

impl Ledger {
    /// Parse ledger text. `source` names the file in errors.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidEntry`] for a data line whose text before the
    /// first comma is not 16 hex digits.
    pub fn parse(source: &Path, text: &str) -> Result<Self, PoolError> {
        let mut lines = Vec::new();
        for (index, raw) in text.split_inclusive('\n').enumerate() {
            let (body, terminator) = if let Some(body) = raw.strip_suffix("\r\n") {
                (body, "\r\n")
            } else if let Some(body) = raw.strip_suffix('\n') {
                (body, "\n")
            } else {
                (raw, "")
            };
            let entry = parse_entry(body).ok_or_else(|| PoolError::InvalidEntry {
                path: source.to_path_buf(),
                line: index + 1,
                text: body.to_string(),
            })?;
            lines.push(Line {
                text: body.to_string(),
                terminator,
                entry,
            });
        }
        Ok(Self { lines })
    }

    /// Render back to text.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.text.len() + 2).sum());
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.terminator);
        }
        out
    }

    /// All lines in file order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Identifiers on data lines, annotated or not, in file order.
    pub fn identifiers(&self) -> impl Iterator<Item = Eui64> + '_ {
        self.lines.iter().filter_map(|l| l.entry.eui())
    }

    /// The first allocatable identifier with its 1-based line number.
    ///
    /// Reserved boundary values are never allocated, even when a
    /// hand-edited ledger leaves them unannotated.
    pub fn first_available(&self) -> Option<(usize, Eui64)> {
        self.lines
            .iter()
            .enumerate()
            .find_map(|(index, line)| match line.entry {
                Entry::Available(eui) if eui.is_reserved() => {
                    tracing::warn!(
                        line = index + 1,
                        eui = %eui,
                        "skipping unannotated reserved identifier"
                    );
                    None
                }
                Entry::Available(eui) => Some((index + 1, eui)),
                _ => None,
            })
    }

    /// Number of allocatable identifiers.
    pub fn available_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l.entry, Entry::Available(eui) if !eui.is_reserved()))
            .count()
    }

    /// Annotate the first unannotated line holding `eui` and return its
    /// 1-based line number, or `None` if there is no such line. All other
    /// lines are left as they are.
    pub fn mark(&mut self, eui: Eui64, annotation: &Annotation) -> Option<usize> {
        let index = self
            .lines
            .iter()
            .position(|l| l.entry == Entry::Available(eui))?;
        let line = &mut self.lines[index];
        let id_part = line
            .text
            .split_once(',')
            .map_or(line.text.as_str(), |(id, _)| id)
            .trim_end();
        let rewritten = format!("{id_part},{annotation}");
        line.text = rewritten;
        line.entry = Entry::Annotated {
            eui,
            annotation: annotation.as_str().to_string(),
        };
        Some(index + 1)
    }
}

fn parse_entry(body: &str) -> Option<Entry> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Some(Entry::Blank);
    }
    if trimmed.starts_with('#') {
        return Some(Entry::Comment);
    }
    let (id, rest) = match trimmed.split_once(',') {
        Some((id, rest)) => (id, rest),
        None => (trimmed, ""),
    };
    let eui: Eui64 = id.trim().parse().ok()?;
    let annotation = rest.trim();
    if annotation.is_empty() {
        Some(Entry::Available(eui))
    } else {
        Some(Entry::Annotated {
            eui,
            annotation: annotation.to_string(),
        })
    }
}
