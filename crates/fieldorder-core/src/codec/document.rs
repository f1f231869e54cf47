//! Locating the default field fragment inside the host configuration file.
//!
//! The host file is `eeschema.json`.  The fragment is stored as a JSON string
//! value under the `"field_names"` key:
//!
//! ```json
//! "drawing": {
//!   "field_names": "(templatefields (field (name \"MPN\") visible))",
//!   ...
//! }
//! ```
//!
//! [`ConfigDocument`] records the exact byte range of that string literal.
//! Saving re-encodes only the literal and splices it into the same range, so
//! every other byte of the file (key order, indentation, unrelated settings)
//! survives unchanged.  A plain structured-text file containing a raw
//! `(templatefields …)` expression is handled the same way.

use std::ops::Range;

use tracing::debug;

use crate::codec::fields::{self, FRAGMENT_HEAD};
use crate::codec::CodecError;
use crate::domain::entry::EntryList;

/// JSON key whose string value holds the fragment.
pub const FIELD_NAMES_KEY: &str = "field_names";

/// How the fragment is embedded in the surrounding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentEncoding {
    /// The span is a JSON string literal (quotes included) whose decoded
    /// value is the fragment text.
    JsonString,
    /// The span is the fragment text itself.
    Raw,
}

/// The full text of a configuration file plus the location of its fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    content: String,
    span: Range<usize>,
    encoding: FragmentEncoding,
}

impl ConfigDocument {
    /// Locates the fragment in `content`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FragmentNotFound`] if the file has neither a
    /// `"field_names"` string member nor a `(templatefields` expression, or
    /// [`CodecError::MalformedEntry`] if the raw expression is unbalanced.
    pub fn from_content(content: String) -> Result<Self, CodecError> {
        let (span, encoding) = match find_json_member(&content, FIELD_NAMES_KEY) {
            Some(span) => (span, FragmentEncoding::JsonString),
            None => (find_raw_fragment(&content)?, FragmentEncoding::Raw),
        };
        debug!(start = span.start, end = span.end, ?encoding, "located field list fragment");
        Ok(Self {
            content,
            span,
            encoding,
        })
    }

    /// The complete file text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Byte range of the fragment (for JSON, the string literal) in [`content`](Self::content).
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn encoding(&self) -> FragmentEncoding {
        self.encoding
    }

    /// Returns the decoded fragment text.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BadStringLiteral`] if the JSON literal contains
    /// an invalid escape.
    pub fn fragment_text(&self) -> Result<String, CodecError> {
        let raw = &self.content[self.span.clone()];
        match self.encoding {
            FragmentEncoding::Raw => Ok(raw.to_string()),
            FragmentEncoding::JsonString => {
                serde_json::from_str::<String>(raw).map_err(|e| CodecError::BadStringLiteral {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Parses the fragment into an [`EntryList`].
    ///
    /// An empty JSON string value is a present-but-empty list.
    ///
    /// # Errors
    ///
    /// Propagates [`fields::parse`] failures.
    pub fn entries(&self) -> Result<EntryList, CodecError> {
        let text = self.fragment_text()?;
        if self.encoding == FragmentEncoding::JsonString && text.trim().is_empty() {
            return Ok(EntryList::new());
        }
        fields::parse(&text)
    }

    /// Returns a new document whose fragment encodes `list`; all bytes
    /// outside the fragment span are copied unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BadStringLiteral`] if JSON encoding fails.
    pub fn with_entries(&self, list: &EntryList) -> Result<ConfigDocument, CodecError> {
        let fragment = fields::serialize(list);
        let replacement = match self.encoding {
            FragmentEncoding::Raw => fragment,
            FragmentEncoding::JsonString => {
                serde_json::to_string(&fragment).map_err(|e| CodecError::BadStringLiteral {
                    reason: e.to_string(),
                })?
            }
        };

        let mut content = String::with_capacity(
            self.content.len() - self.span.len() + replacement.len(),
        );
        content.push_str(&self.content[..self.span.start]);
        content.push_str(&replacement);
        content.push_str(&self.content[self.span.end..]);

        let span = self.span.start..self.span.start + replacement.len();
        Ok(ConfigDocument {
            content,
            span,
            encoding: self.encoding,
        })
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Finds a JSON member `"<key>": "<string>"` and returns the byte range of
/// the value literal (quotes included).
///
/// Walks the text string-literal by string-literal so that a key-like
/// sequence inside some other string value is never mistaken for a key.
fn find_json_member(content: &str, key: &str) -> Option<Range<usize>> {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        let literal = scan_json_string(bytes, i)?;
        let is_key = &content[literal.start + 1..literal.end - 1] == key;
        i = literal.end;
        if !is_key {
            continue;
        }

        let mut j = skip_ws(bytes, literal.end);
        if bytes.get(j) != Some(&b':') {
            continue;
        }
        j = skip_ws(bytes, j + 1);
        if bytes.get(j) == Some(&b'"') {
            return scan_json_string(bytes, j);
        }
    }
    None
}

/// Returns the range of the JSON string literal starting at `start` (which
/// must be a `"`), or `None` if it is unterminated.
fn scan_json_string(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(start..i + 1),
            _ => i += 1,
        }
    }
    None
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Finds a balanced `(templatefields …)` expression.
///
/// Only a marker outside every quoted string counts; one inside a JSON
/// string value cannot be replaced in place without breaking the file.
fn find_raw_fragment(content: &str) -> Result<Range<usize>, CodecError> {
    let start = find_raw_marker(content).ok_or(CodecError::FragmentNotFound)?;
    let bytes = content.as_bytes();

    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => match scan_json_string(bytes, i) {
                Some(literal) => {
                    i = literal.end;
                    continue;
                }
                None => break,
            },
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(start..i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(CodecError::MalformedEntry {
        offset: start,
        reason: "unterminated templatefields list".to_string(),
    })
}

/// Offset of the first unquoted `(templatefields`, if any.
fn find_raw_marker(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = scan_json_string(bytes, i)?.end,
            b'(' => {
                let rest = &content[skip_ws(bytes, i + 1)..];
                if rest.starts_with(FRAGMENT_HEAD)
                    && !rest[FRAGMENT_HEAD.len()..]
                        .starts_with(|c: char| c.is_alphanumeric() || c == '_')
                {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}
