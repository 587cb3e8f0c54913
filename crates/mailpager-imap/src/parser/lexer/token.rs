//! Lexical tokens of server responses.

/// One token of a server response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Bare atom such as `OK`, `FETCH` or `\Noselect`.
    Atom(&'a str),
    /// Double-quoted string with escapes resolved.
    QuotedString(String),
    /// Literal payload announced by `{n}`.
    Literal(Vec<u8>),
    /// Unsigned number.
    Number(u32),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Single space.
    Space,
    /// `*` starting an untagged response.
    Asterisk,
    /// `+` starting a continuation request.
    Plus,
    /// `NIL` in any case.
    Nil,
    /// Line terminator.
    Crlf,
    /// No input left.
    Eof,
}

impl Token<'_> {
    /// Short description used in parse error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Atom(_) => "atom",
            Self::QuotedString(_) => "quoted string",
            Self::Literal(_) => "literal",
            Self::Number(_) => "number",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Space => "space",
            Self::Asterisk => "'*'",
            Self::Plus => "'+'",
            Self::Nil => "NIL",
            Self::Crlf => "CRLF",
            Self::Eof => "end of input",
        }
    }
}
