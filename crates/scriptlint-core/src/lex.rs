//! Tokenizer.
//!
//! The lexer produces one token of lookahead on demand. Because it always works on a padded
//! buffer, it may read a few bytes past the logical end without bounds checks; the padding is NUL
//! and never matches anything interesting.
//!
//! Two tokens depend on parser context and are rescanned when the parser asks:
//! - `/` or `/=` where an expression is expected ([`Lexer::reparse_as_regexp`])
//! - `}` ending a template substitution ([`Lexer::skip_in_template`])

use crate::diag_reporter::DiagReporter;
use crate::diag_types::{
    DiagCharacterDisallowedInIdentifiers, DiagUnclosedBlockComment, DiagUnclosedStringLiteral,
    DiagUnclosedTemplate, DiagUnexpectedCharacter, DiagUnexpectedHashCharacter,
};
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;

/// Reserved words the parser treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Keyword {
    Await,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Yield,
}

impl Keyword {
    fn from_bytes(word: &[u8]) -> Option<Keyword> {
        Some(match word {
            b"await" => Keyword::Await,
            b"break" => Keyword::Break,
            b"case" => Keyword::Case,
            b"catch" => Keyword::Catch,
            b"class" => Keyword::Class,
            b"const" => Keyword::Const,
            b"continue" => Keyword::Continue,
            b"debugger" => Keyword::Debugger,
            b"default" => Keyword::Default,
            b"delete" => Keyword::Delete,
            b"do" => Keyword::Do,
            b"else" => Keyword::Else,
            b"export" => Keyword::Export,
            b"extends" => Keyword::Extends,
            b"false" => Keyword::False,
            b"finally" => Keyword::Finally,
            b"for" => Keyword::For,
            b"function" => Keyword::Function,
            b"if" => Keyword::If,
            b"import" => Keyword::Import,
            b"in" => Keyword::In,
            b"instanceof" => Keyword::Instanceof,
            b"let" => Keyword::Let,
            b"new" => Keyword::New,
            b"null" => Keyword::Null,
            b"return" => Keyword::Return,
            b"super" => Keyword::Super,
            b"switch" => Keyword::Switch,
            b"this" => Keyword::This,
            b"throw" => Keyword::Throw,
            b"true" => Keyword::True,
            b"try" => Keyword::Try,
            b"typeof" => Keyword::Typeof,
            b"var" => Keyword::Var,
            b"void" => Keyword::Void,
            b"while" => Keyword::While,
            b"with" => Keyword::With,
            b"yield" => Keyword::Yield,
            _ => return None,
        })
    }
}

/// Operators and delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Punct {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftSquare,
    RightSquare,
    Semicolon,
    Comma,
    Colon,
    Dot,
    DotDotDot,
    Question,
    QuestionDot,
    QuestionQuestion,
    Arrow,
    Equal,
    /// `+=`, `&&=`, `>>>=` and friends.
    CompoundAssign,
    EqualEqual,
    EqualEqualEqual,
    Bang,
    BangEqual,
    BangEqualEqual,
    Plus,
    PlusPlus,
    Minus,
    MinusMinus,
    Star,
    StarStar,
    Slash,
    Percent,
    Less,
    LessEqual,
    LessLess,
    Greater,
    GreaterEqual,
    GreaterGreater,
    GreaterGreaterGreater,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
}

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. Repeats forever once reached.
    EndOfFile,
    /// Identifier, including contextual words such as `async` or `of`.
    Identifier,
    /// `#name`.
    PrivateIdentifier,
    /// Reserved word.
    Keyword(Keyword),
    /// Numeric literal.
    Number,
    /// String literal.
    String,
    /// Template without further substitutions: `` `abc` `` or the tail `` }abc` ``.
    CompleteTemplate,
    /// Template text ending in `${`.
    IncompleteTemplate,
    /// Regular expression literal (only after [`Lexer::reparse_as_regexp`]).
    Regexp,
    /// Operator or delimiter.
    Punct(Punct),
}

/// One token: its kind and byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// Offset of the first byte.
    pub begin: usize,
    /// Offset past the last byte.
    pub end: usize,
    /// Whether a line terminator precedes the token (drives automatic semicolon insertion).
    pub has_leading_newline: bool,
}

/// Pull-based tokenizer over a padded buffer.
#[derive(Clone)]
pub struct Lexer<'code> {
    input: PaddedStringView<'code>,
    bytes: &'code [u8],
    len: usize,
    pos: usize,
    token: Token,
    previous_end: usize,
}

impl<'code> Lexer<'code> {
    /// Start lexing `input` and read the first token.
    pub fn new(input: PaddedStringView<'code>, reporter: &mut dyn DiagReporter<'code>) -> Self {
        let mut lexer = Self {
            input,
            bytes: input.padded_bytes(),
            len: input.len(),
            pos: 0,
            token: Token {
                kind: TokenKind::EndOfFile,
                begin: 0,
                end: 0,
                has_leading_newline: false,
            },
            previous_end: 0,
        };
        lexer.skip_hashbang();
        lexer.skip(reporter);
        lexer
    }

    /// The current token.
    pub fn peek(&self) -> Token {
        self.token
    }

    /// Bytes of the current token.
    pub fn token_text(&self) -> &'code [u8] {
        &self.bytes[self.token.begin..self.token.end]
    }

    /// Span of the current token.
    pub fn token_span(&self) -> SourceCodeSpan<'code> {
        self.span(self.token.begin, self.token.end)
    }

    /// Span of `begin..end`.
    pub fn span(&self, begin: usize, end: usize) -> SourceCodeSpan<'code> {
        SourceCodeSpan::from_range(self.input, begin..end)
    }

    /// The input being lexed.
    pub fn input(&self) -> PaddedStringView<'code> {
        self.input
    }

    /// Offset just past the token before the current one.
    pub fn end_of_previous_token(&self) -> usize {
        self.previous_end
    }

    /// Advance to the next token.
    pub fn skip(&mut self, reporter: &mut dyn DiagReporter<'code>) {
        self.previous_end = self.token.end;
        let mut has_leading_newline = false;
        loop {
            has_leading_newline |= self.skip_trivia(reporter);
            let begin = self.pos;
            if begin >= self.len {
                self.pos = self.len;
                self.token = Token {
                    kind: TokenKind::EndOfFile,
                    begin: self.len,
                    end: self.len,
                    has_leading_newline,
                };
                return;
            }
            if let Some(kind) = self.lex_token(reporter) {
                self.token = Token {
                    kind,
                    begin,
                    end: self.pos,
                    has_leading_newline,
                };
                return;
            }
        }
    }

    /// Rescan the current `/` or `/=` token as a regular expression literal.
    pub fn reparse_as_regexp(&mut self) {
        debug_assert_eq!(self.bytes[self.token.begin], b'/');
        let mut pos = self.token.begin + 1;
        let mut in_class = false;
        while pos < self.len {
            match self.bytes[pos] {
                b'\n' | b'\r' => break,
                b'\\' => {
                    pos += 1;
                    if pos < self.len && !matches!(self.bytes[pos], b'\n' | b'\r') {
                        pos += 1;
                    }
                }
                b'[' => {
                    in_class = true;
                    pos += 1;
                }
                b']' => {
                    in_class = false;
                    pos += 1;
                }
                b'/' if !in_class => {
                    pos += 1;
                    while pos < self.len && is_identifier_ascii_part(self.bytes[pos]) {
                        pos += 1;
                    }
                    break;
                }
                _ => pos += 1,
            }
        }
        self.pos = pos;
        self.token.kind = TokenKind::Regexp;
        self.token.end = pos;
    }

    /// Rescan the current `}` as the continuation of a template which started at
    /// `template_begin`.
    pub fn skip_in_template(
        &mut self,
        template_begin: usize,
        reporter: &mut dyn DiagReporter<'code>,
    ) {
        debug_assert_eq!(self.token.kind, TokenKind::Punct(Punct::RightBrace));
        let begin = self.token.begin;
        self.pos = begin + 1;
        let kind = self.lex_template_body(template_begin, reporter);
        self.token = Token {
            kind,
            begin,
            end: self.pos,
            has_leading_newline: false,
        };
    }

    fn skip_hashbang(&mut self) {
        if self.bytes.starts_with(b"#!") {
            while self.pos < self.len && !matches!(self.bytes[self.pos], b'\n' | b'\r') {
                self.pos += 1;
            }
        }
    }

    /// Skip whitespace and comments. Returns whether a line terminator was skipped.
    fn skip_trivia(&mut self, reporter: &mut dyn DiagReporter<'code>) -> bool {
        let mut newline = false;
        while self.pos < self.len {
            match self.bytes[self.pos] {
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'\n' | b'\r' => {
                    newline = true;
                    self.pos += 1;
                }
                b'/' if self.bytes[self.pos + 1] == b'/' => self.skip_line_comment(),
                b'/' if self.bytes[self.pos + 1] == b'*' => {
                    newline |= self.skip_block_comment(reporter);
                }
                b'<' if self.bytes[self.pos..].starts_with(b"<!--") => self.skip_line_comment(),
                b'-' if newline && self.bytes[self.pos..].starts_with(b"-->") => {
                    self.skip_line_comment()
                }
                byte if byte >= 0x80 => {
                    let (c, width) = self.decode_char(self.pos);
                    if !c.is_whitespace() && c != '\u{feff}' {
                        break;
                    }
                    if is_line_separator(c) {
                        newline = true;
                    }
                    self.pos += width;
                }
                _ => break,
            }
        }
        newline
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.len && !matches!(self.bytes[self.pos], b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    /// Returns whether the comment contains a line terminator.
    fn skip_block_comment(&mut self, reporter: &mut dyn DiagReporter<'code>) -> bool {
        let open = self.pos;
        let body = &self.bytes[open + 2..self.len];
        match body.windows(2).position(|pair| pair == b"*/") {
            Some(close) => {
                let text = &body[..close];
                self.pos = open + 2 + close + 2;
                text.iter().any(|&b| matches!(b, b'\n' | b'\r'))
                    || std::str::from_utf8(text)
                        .map(|s| s.chars().any(is_line_separator))
                        .unwrap_or(false)
            }
            None => {
                reporter.report(
                    DiagUnclosedBlockComment {
                        comment_open: self.span(open, open + 2),
                    }
                    .into(),
                );
                self.pos = self.len;
                false
            }
        }
    }

    /// Lex one token starting at `self.pos`. Returns `None` if the character there was reported
    /// and skipped.
    fn lex_token(&mut self, reporter: &mut dyn DiagReporter<'code>) -> Option<TokenKind> {
        let begin = self.pos;
        let c = self.bytes[begin];
        let b1 = self.bytes[begin + 1];
        let b2 = self.bytes[begin + 2];
        let b3 = self.bytes[begin + 3];

        let punct = |width: usize, punct: Punct, lexer: &mut Self| {
            lexer.pos += width;
            Some(TokenKind::Punct(punct))
        };

        match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'$' | b'_' => {
                self.lex_identifier_tail(reporter);
                let word = &self.bytes[begin..self.pos];
                Some(match Keyword::from_bytes(word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier,
                })
            }
            b'0'..=b'9' => {
                self.lex_number();
                Some(TokenKind::Number)
            }
            b'.' if b1.is_ascii_digit() => {
                self.lex_number();
                Some(TokenKind::Number)
            }
            b'"' | b'\'' => {
                self.lex_string(reporter);
                Some(TokenKind::String)
            }
            b'`' => {
                self.pos += 1;
                Some(self.lex_template_body(begin, reporter))
            }
            b'#' => {
                if self.is_identifier_start_at(begin + 1) {
                    self.pos += 1;
                    self.lex_identifier_tail(reporter);
                    Some(TokenKind::PrivateIdentifier)
                } else {
                    reporter.report(
                        DiagUnexpectedHashCharacter {
                            hash: self.span(begin, begin + 1),
                        }
                        .into(),
                    );
                    self.pos += 1;
                    None
                }
            }
            b'(' => punct(1, Punct::LeftParen, self),
            b')' => punct(1, Punct::RightParen, self),
            b'{' => punct(1, Punct::LeftBrace, self),
            b'}' => punct(1, Punct::RightBrace, self),
            b'[' => punct(1, Punct::LeftSquare, self),
            b']' => punct(1, Punct::RightSquare, self),
            b';' => punct(1, Punct::Semicolon, self),
            b',' => punct(1, Punct::Comma, self),
            b':' => punct(1, Punct::Colon, self),
            b'~' => punct(1, Punct::Tilde, self),
            b'.' => match (b1, b2) {
                (b'.', b'.') => punct(3, Punct::DotDotDot, self),
                _ => punct(1, Punct::Dot, self),
            },
            b'?' => match (b1, b2) {
                (b'?', b'=') => punct(3, Punct::CompoundAssign, self),
                (b'?', _) => punct(2, Punct::QuestionQuestion, self),
                (b'.', digit) if !digit.is_ascii_digit() => punct(2, Punct::QuestionDot, self),
                _ => punct(1, Punct::Question, self),
            },
            b'=' => match (b1, b2) {
                (b'=', b'=') => punct(3, Punct::EqualEqualEqual, self),
                (b'=', _) => punct(2, Punct::EqualEqual, self),
                (b'>', _) => punct(2, Punct::Arrow, self),
                _ => punct(1, Punct::Equal, self),
            },
            b'!' => match (b1, b2) {
                (b'=', b'=') => punct(3, Punct::BangEqualEqual, self),
                (b'=', _) => punct(2, Punct::BangEqual, self),
                _ => punct(1, Punct::Bang, self),
            },
            b'+' => match b1 {
                b'+' => punct(2, Punct::PlusPlus, self),
                b'=' => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Plus, self),
            },
            b'-' => match b1 {
                b'-' => punct(2, Punct::MinusMinus, self),
                b'=' => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Minus, self),
            },
            b'*' => match (b1, b2) {
                (b'*', b'=') => punct(3, Punct::CompoundAssign, self),
                (b'*', _) => punct(2, Punct::StarStar, self),
                (b'=', _) => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Star, self),
            },
            b'/' => match b1 {
                b'=' => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Slash, self),
            },
            b'%' => match b1 {
                b'=' => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Percent, self),
            },
            b'<' => match (b1, b2) {
                (b'<', b'=') => punct(3, Punct::CompoundAssign, self),
                (b'<', _) => punct(2, Punct::LessLess, self),
                (b'=', _) => punct(2, Punct::LessEqual, self),
                _ => punct(1, Punct::Less, self),
            },
            b'>' => match (b1, b2, b3) {
                (b'>', b'>', b'=') => punct(4, Punct::CompoundAssign, self),
                (b'>', b'>', _) => punct(3, Punct::GreaterGreaterGreater, self),
                (b'>', b'=', _) => punct(3, Punct::CompoundAssign, self),
                (b'>', _, _) => punct(2, Punct::GreaterGreater, self),
                (b'=', _, _) => punct(2, Punct::GreaterEqual, self),
                _ => punct(1, Punct::Greater, self),
            },
            b'&' => match (b1, b2) {
                (b'&', b'=') => punct(3, Punct::CompoundAssign, self),
                (b'&', _) => punct(2, Punct::AmpAmp, self),
                (b'=', _) => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Amp, self),
            },
            b'|' => match (b1, b2) {
                (b'|', b'=') => punct(3, Punct::CompoundAssign, self),
                (b'|', _) => punct(2, Punct::PipePipe, self),
                (b'=', _) => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Pipe, self),
            },
            b'^' => match b1 {
                b'=' => punct(2, Punct::CompoundAssign, self),
                _ => punct(1, Punct::Caret, self),
            },
            byte if byte >= 0x80 => {
                let (ch, width) = self.decode_char(begin);
                if ch.is_alphabetic() {
                    self.pos += width;
                    self.lex_identifier_tail(reporter);
                    Some(TokenKind::Identifier)
                } else {
                    self.report_unexpected_character(begin, width, reporter);
                    None
                }
            }
            _ => {
                self.report_unexpected_character(begin, 1, reporter);
                None
            }
        }
    }

    fn report_unexpected_character(
        &mut self,
        begin: usize,
        width: usize,
        reporter: &mut dyn DiagReporter<'code>,
    ) {
        reporter.report(
            DiagUnexpectedCharacter {
                character: self.span(begin, begin + width),
            }
            .into(),
        );
        self.pos = begin + width;
    }

    fn is_identifier_start_at(&self, pos: usize) -> bool {
        if pos >= self.len {
            return false;
        }
        match self.bytes[pos] {
            b'a'..=b'z' | b'A'..=b'Z' | b'$' | b'_' => true,
            byte if byte >= 0x80 => self.decode_char(pos).0.is_alphabetic(),
            _ => false,
        }
    }

    fn lex_identifier_tail(&mut self, reporter: &mut dyn DiagReporter<'code>) {
        while self.pos < self.len {
            let byte = self.bytes[self.pos];
            if is_identifier_ascii_part(byte) {
                self.pos += 1;
                continue;
            }
            if byte < 0x80 {
                break;
            }
            let (c, width) = self.decode_char(self.pos);
            if c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}' {
                self.pos += width;
            } else if c.is_whitespace() || c == '\u{feff}' {
                break;
            } else {
                reporter.report(
                    DiagCharacterDisallowedInIdentifiers {
                        character: self.span(self.pos, self.pos + width),
                    }
                    .into(),
                );
                self.pos += width;
            }
        }
    }

    fn lex_number(&mut self) {
        let bytes = self.bytes;
        if bytes[self.pos] == b'0' && matches!(bytes[self.pos + 1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
        {
            self.pos += 2;
            while self.pos < self.len && is_identifier_ascii_part(bytes[self.pos]) {
                self.pos += 1;
            }
            return;
        }
        let digits = |lexer: &mut Self| {
            while lexer.pos < lexer.len && (bytes[lexer.pos].is_ascii_digit() || bytes[lexer.pos] == b'_') {
                lexer.pos += 1;
            }
        };
        digits(self);
        if bytes[self.pos] == b'.' {
            self.pos += 1;
            digits(self);
        }
        if matches!(bytes[self.pos], b'e' | b'E') {
            let sign = usize::from(matches!(bytes[self.pos + 1], b'+' | b'-'));
            if bytes[self.pos + 1 + sign].is_ascii_digit() {
                self.pos += 1 + sign;
                digits(self);
            }
        }
        if bytes[self.pos] == b'n' {
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, reporter: &mut dyn DiagReporter<'code>) {
        let begin = self.pos;
        let quote = self.bytes[begin];
        self.pos += 1;
        loop {
            if self.pos >= self.len {
                self.pos = self.len;
                break;
            }
            match self.bytes[self.pos] {
                b'\\' => {
                    self.pos += if self.bytes[self.pos + 1..].starts_with(b"\r\n") {
                        3
                    } else {
                        2
                    };
                }
                b'\n' | b'\r' => break,
                byte if byte == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        reporter.report(
            DiagUnclosedStringLiteral {
                string_literal: self.span(begin, self.pos),
            }
            .into(),
        );
    }

    fn lex_template_body(
        &mut self,
        template_begin: usize,
        reporter: &mut dyn DiagReporter<'code>,
    ) -> TokenKind {
        loop {
            if self.pos >= self.len {
                self.pos = self.len;
                reporter.report(
                    DiagUnclosedTemplate {
                        incomplete_template: self.span(template_begin, self.len),
                    }
                    .into(),
                );
                return TokenKind::CompleteTemplate;
            }
            match self.bytes[self.pos] {
                b'`' => {
                    self.pos += 1;
                    return TokenKind::CompleteTemplate;
                }
                b'\\' => self.pos += 2,
                b'$' if self.bytes[self.pos + 1] == b'{' => {
                    self.pos += 2;
                    return TokenKind::IncompleteTemplate;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn decode_char(&self, pos: usize) -> (char, usize) {
        let width = match self.bytes[pos] {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => 1,
        };
        let end = (pos + width).min(self.len);
        match std::str::from_utf8(&self.bytes[pos..end]) {
            Ok(s) => s
                .chars()
                .next()
                .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, end - pos)),
            Err(_) => (char::REPLACEMENT_CHARACTER, 1),
        }
    }
}

fn is_identifier_ascii_part(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'$' || byte == b'_'
}

fn is_line_separator(c: char) -> bool {
    matches!(c, '\u{2028}' | '\u{2029}')
}
