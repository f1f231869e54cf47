//! Parse and serialize the `(templatefields …)` fragment.
//!
//! ```text
//! (templatefields (field (name "MPN") visible) (field (name "DATASHEET") visible url))
//! ```
//!
//! Parsing is strict: an unknown token inside a `(field …)` block, a repeated
//! flag, a missing name or a duplicate name all fail instead of being
//! silently dropped, because dropping entries would change the user's order.

use std::collections::HashSet;

use tracing::debug;

use crate::codec::tokens::{quote, tokenize, Token, TokenKind};
use crate::codec::CodecError;
use crate::domain::entry::{EntryList, FieldEntry, Flag, FlagSet};

/// Head symbol of the whole list.
pub const FRAGMENT_HEAD: &str = "templatefields";
/// Head symbol of one entry.
pub const FIELD_HEAD: &str = "field";
/// Head symbol of the name sub-expression.
pub const NAME_HEAD: &str = "name";

/// Parses fragment text into an [`EntryList`].
///
/// # Errors
///
/// - [`CodecError::FragmentNotFound`] if the text does not start with
///   `(templatefields`.
/// - [`CodecError::MalformedEntry`] for any grammar violation.
/// - [`CodecError::DuplicateName`] if two entries share a name.
///
/// # Examples
///
/// ```rust
/// use fieldorder_core::codec::fields::parse;
///
/// let list = parse(r#"(templatefields (field (name "MPN") visible url))"#).unwrap();
/// let mpn = list.get(0).unwrap();
/// assert_eq!(mpn.name, "MPN");
/// assert!(mpn.flags.visible && mpn.flags.has_url);
/// ```
pub fn parse(fragment: &str) -> Result<EntryList, CodecError> {
    let tokens = tokenize(fragment)?;
    let mut reader = Reader::new(&tokens, fragment.len());

    // The marker is `(` immediately followed by the `templatefields` symbol.
    match (reader.peek_kind(0), reader.peek_kind(1)) {
        (Some(TokenKind::Open), Some(TokenKind::Symbol(head))) if head == FRAGMENT_HEAD => {
            reader.advance(2);
        }
        _ => return Err(CodecError::FragmentNotFound),
    }

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    loop {
        match reader.next() {
            Some(Token {
                kind: TokenKind::Close,
                ..
            }) => break,
            Some(Token {
                kind: TokenKind::Open,
                offset,
            }) => {
                let entry = parse_field(&mut reader, *offset)?;
                if !seen.insert(entry.name.clone()) {
                    return Err(CodecError::DuplicateName { name: entry.name });
                }
                entries.push(entry);
            }
            Some(other) => {
                return Err(CodecError::malformed(
                    other.offset,
                    format!("expected `(field` or `)`, found {}", describe(&other.kind)),
                ))
            }
            None => {
                return Err(CodecError::malformed(
                    reader.end,
                    "unterminated templatefields list",
                ))
            }
        }
    }

    if let Some(extra) = reader.next() {
        return Err(CodecError::malformed(
            extra.offset,
            "unexpected content after templatefields list",
        ));
    }

    debug!(count = entries.len(), "parsed default field list");
    Ok(EntryList::from_entries(entries)?)
}

/// Serializes `list` into fragment text.
///
/// Flags are written in canonical order (`visible`, then `url`); an entry
/// without flags is written as a bare `(field (name "…"))` block.
///
/// # Examples
///
/// ```rust
/// use fieldorder_core::{serialize, EntryList, FieldEntry, FlagSet};
///
/// let list = EntryList::from_entries(vec![
///     FieldEntry::new("MPN", FlagSet::new(true, false)),
///     FieldEntry::new("LINK", FlagSet::new(false, true)),
/// ]).unwrap();
/// assert_eq!(
///     serialize(&list),
///     r#"(templatefields (field (name "MPN") visible) (field (name "LINK") url))"#
/// );
/// ```
pub fn serialize(list: &EntryList) -> String {
    let mut out = String::with_capacity(16 + list.len() * 32);
    out.push('(');
    out.push_str(FRAGMENT_HEAD);
    for entry in list {
        out.push_str(" (");
        out.push_str(FIELD_HEAD);
        out.push_str(" (");
        out.push_str(NAME_HEAD);
        out.push(' ');
        out.push_str(&quote(&entry.name));
        out.push(')');
        for flag in entry.flags.iter() {
            out.push(' ');
            out.push_str(flag.token());
        }
        out.push(')');
    }
    out.push(')');
    out
}

/// Parses one `(field (name "…") flag*)` block.  The opening parenthesis at
/// `open_offset` has already been consumed.
fn parse_field(reader: &mut Reader<'_>, open_offset: usize) -> Result<FieldEntry, CodecError> {
    match reader.next() {
        Some(Token {
            kind: TokenKind::Symbol(head),
            ..
        }) if head == FIELD_HEAD => {}
        _ => return Err(CodecError::malformed(open_offset, "expected `field`")),
    }

    let name = match (reader.next(), reader.next(), reader.next(), reader.next()) {
        (
            Some(Token {
                kind: TokenKind::Open,
                ..
            }),
            Some(Token {
                kind: TokenKind::Symbol(head),
                ..
            }),
            Some(Token {
                kind: TokenKind::Str(name),
                offset,
            }),
            Some(Token {
                kind: TokenKind::Close,
                ..
            }),
        ) if head == NAME_HEAD => {
            if name.trim().is_empty() {
                return Err(CodecError::malformed(*offset, "field name is empty"));
            }
            name.clone()
        }
        _ => {
            return Err(CodecError::malformed(
                open_offset,
                "field block lacks a (name \"…\") expression",
            ))
        }
    };

    let mut flags = FlagSet::NONE;
    loop {
        match reader.next() {
            Some(Token {
                kind: TokenKind::Close,
                ..
            }) => break,
            Some(Token {
                kind: TokenKind::Symbol(word),
                offset,
            }) => {
                let flag = Flag::from_token(word).ok_or_else(|| {
                    CodecError::malformed(*offset, format!("unrecognized token `{word}` in field {name:?}"))
                })?;
                if !flags.insert(flag) {
                    return Err(CodecError::malformed(
                        *offset,
                        format!("flag `{word}` repeated in field {name:?}"),
                    ));
                }
            }
            Some(other) => {
                return Err(CodecError::malformed(
                    other.offset,
                    format!("unexpected {} in field {name:?}", describe(&other.kind)),
                ))
            }
            None => {
                return Err(CodecError::malformed(
                    open_offset,
                    format!("unterminated field {name:?}"),
                ))
            }
        }
    }

    Ok(FieldEntry::new(name, flags))
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Open => "`(`".to_string(),
        TokenKind::Close => "`)`".to_string(),
        TokenKind::Symbol(s) => format!("`{s}`"),
        TokenKind::Str(s) => format!("string {s:?}"),
    }
}

/// Cursor over a token slice.
struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Byte length of the source, used as the offset of "end of input" errors.
    end: usize,
}

impl<'a> Reader<'a> {
    fn new(tokens: &'a [Token], end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
        }
    }

    fn peek_kind(&self, ahead: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }
}
