//! Raw token boundaries over a C++ buffer.
//!
//! This is not a lexer for the whole language: it only knows enough to step
//! over one token, skip whitespace and comments, and classify the next token.

/// Coarse token classes used by edit derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Identifier,
    /// Numeric literal, suffix included.
    Number,
    /// `"..."`, prefixes and raw strings included.
    StringLiteral,
    /// `'c'`
    CharLiteral,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `::`
    ColonColon,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Any other punctuator.
    Punct,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Classifies the token starting at `offset` and returns it with its end offset.
///
/// Returns `None` at end of buffer or if `offset` is out of range.
#[must_use]
pub fn lex_token(text: &str, offset: usize) -> Option<(TokenKind, usize)> {
    let bytes = text.as_bytes();
    let &first = bytes.get(offset)?;

    if is_ident_start(first) {
        let mut end = offset + 1;
        while end < bytes.len() && is_ident_continue(bytes[end]) {
            end += 1;
        }
        // Prefixed literals: u8"..", L'..', R"(..)" are treated as plain literals.
        if let Some(&next) = bytes.get(end) {
            if next == b'"' && end - offset <= 3 {
                return Some((TokenKind::StringLiteral, skip_quoted(bytes, end, b'"')));
            }
        }
        return Some((TokenKind::Identifier, end));
    }
    if first.is_ascii_digit() {
        let mut end = offset + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'.' | b'\'')) {
            end += 1;
        }
        return Some((TokenKind::Number, end));
    }

    let token = match first {
        b'"' => (TokenKind::StringLiteral, skip_quoted(bytes, offset, b'"')),
        b'\'' => (TokenKind::CharLiteral, skip_quoted(bytes, offset, b'\'')),
        b',' => (TokenKind::Comma, offset + 1),
        b';' => (TokenKind::Semi, offset + 1),
        b'{' => (TokenKind::LBrace, offset + 1),
        b'}' => (TokenKind::RBrace, offset + 1),
        b'(' => (TokenKind::LParen, offset + 1),
        b')' => (TokenKind::RParen, offset + 1),
        b':' if bytes.get(offset + 1) == Some(&b':') => (TokenKind::ColonColon, offset + 2),
        b'-' if bytes.get(offset + 1) == Some(&b'>') => (TokenKind::Punct, offset + 2),
        _ => {
            // Keep multi-byte UTF-8 sequences intact.
            let width = text[offset..].chars().next().map_or(1, char::len_utf8);
            (TokenKind::Punct, offset + width)
        }
    };
    Some(token)
}

/// End offset of the token starting at `offset`.
///
/// Falls back to `offset` when nothing can be lexed there.
#[must_use]
pub fn token_end(text: &str, offset: usize) -> usize {
    lex_token(text, offset).map_or(offset, |(_, end)| end)
}

/// Skips whitespace, `//` and `/* */` comments starting at `offset`.
#[must_use]
pub fn skip_trivia(text: &str, mut offset: usize) -> usize {
    let bytes = text.as_bytes();
    loop {
        while offset < bytes.len() && bytes[offset].is_ascii_whitespace() {
            offset += 1;
        }
        if bytes.get(offset) == Some(&b'/') {
            match bytes.get(offset + 1) {
                Some(b'/') => {
                    while offset < bytes.len() && bytes[offset] != b'\n' {
                        offset += 1;
                    }
                    continue;
                }
                Some(b'*') => {
                    offset = text[offset + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |pos| offset + 2 + pos + 2);
                    continue;
                }
                _ => {}
            }
        }
        return offset;
    }
}

/// Finds the token following the token that starts at `after` and, if it is of
/// `kind`, returns the offset just past it.
///
/// Any other next token yields `None`; the search never scans further ahead.
#[must_use]
pub fn find_next_token(text: &str, after: usize, kind: TokenKind) -> Option<usize> {
    if after >= text.len() {
        return None;
    }
    expect_token(text, token_end(text, after), kind)
}

/// Skips trivia from `from` and, if the next token is of `kind`, returns the
/// offset just past it.
#[must_use]
pub fn expect_token(text: &str, from: usize, kind: TokenKind) -> Option<usize> {
    match lex_token(text, skip_trivia(text, from)) {
        Some((found, end)) if found == kind => Some(end),
        _ => None,
    }
}
