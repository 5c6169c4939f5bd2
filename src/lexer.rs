//! Indentation-aware lexer for tiny Python.
//!
//! The generated parser consumes this as an external token stream. Besides
//! ordinary tokens it synthesizes `Newline` at the end of every logical line
//! and `Indent`/`Dedent` whenever the leading whitespace of a line grows or
//! shrinks. Blank lines, comment-only lines and newlines inside parentheses
//! produce no tokens at all.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{CompileError, LexError};

pub type Spanned<'input> = (usize, Tok<'input>, usize);

const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    // Keywords
    Def,
    If,
    Elif,
    Else,
    While,
    Break,
    Continue,
    Return,
    Print,

    // Literals and names
    Ident(&'input str),
    Number(&'input str),
    Str(&'input str),

    // Operators and punctuation
    Cmp(&'input str),
    Assign,
    Plus,
    Minus,
    LParen,
    RParen,
    Comma,
    Colon,

    // Layout
    Newline,
    Indent,
    Dedent,
}

impl fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Def => f.write_str("'def'"),
            Tok::If => f.write_str("'if'"),
            Tok::Elif => f.write_str("'elif'"),
            Tok::Else => f.write_str("'else'"),
            Tok::While => f.write_str("'while'"),
            Tok::Break => f.write_str("'break'"),
            Tok::Continue => f.write_str("'continue'"),
            Tok::Return => f.write_str("'return'"),
            Tok::Print => f.write_str("'print'"),
            Tok::Ident(name) => write!(f, "identifier '{}'", name),
            Tok::Number(n) => write!(f, "number {}", n),
            Tok::Str(s) => write!(f, "string \"{}\"", s),
            Tok::Cmp(op) => write!(f, "'{}'", op),
            Tok::Assign => f.write_str("'='"),
            Tok::Plus => f.write_str("'+'"),
            Tok::Minus => f.write_str("'-'"),
            Tok::LParen => f.write_str("'('"),
            Tok::RParen => f.write_str("')'"),
            Tok::Comma => f.write_str("','"),
            Tok::Colon => f.write_str("':'"),
            Tok::Newline => f.write_str("end of line"),
            Tok::Indent => f.write_str("indent"),
            Tok::Dedent => f.write_str("dedent"),
        }
    }
}

fn keyword(word: &str) -> Option<Tok<'static>> {
    match word {
        "def" => Some(Tok::Def),
        "if" => Some(Tok::If),
        "elif" => Some(Tok::Elif),
        "else" => Some(Tok::Else),
        "while" => Some(Tok::While),
        "break" => Some(Tok::Break),
        "continue" => Some(Tok::Continue),
        "return" => Some(Tok::Return),
        "print" => Some(Tok::Print),
        _ => None,
    }
}

pub struct Lexer<'input> {
    source: &'input str,
    pos: usize,
    line: usize,
    line_start: usize,
    // Widths of the currently open indentation levels; the bottom is always 0
    indents: Vec<usize>,
    pending: VecDeque<Spanned<'input>>,
    paren_depth: usize,
    at_line_start: bool,
    line_has_tokens: bool,
    finished: bool,
}

impl<'input> Lexer<'input> {
    pub fn new(source: &'input str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            line_start: 0,
            indents: vec![0],
            pending: VecDeque::new(),
            paren_depth: 0,
            at_line_start: true,
            line_has_tokens: false,
            finished: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    fn column(&self, offset: usize) -> usize {
        self.source[self.line_start..offset].chars().count() + 1
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'input str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.pos]
    }

    /// Measures the leading whitespace of a fresh line and queues the
    /// matching `Indent`/`Dedent` tokens. Blank and comment-only lines leave
    /// the indentation stack untouched.
    fn handle_indentation(&mut self) -> Result<(), LexError> {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                _ => break,
            }
            self.advance();
        }
        if matches!(self.peek(), None | Some('\n') | Some('\r') | Some('#')) {
            return Ok(());
        }

        let top = *self.indents.last().unwrap_or(&0);
        if width > top {
            self.indents.push(width);
            self.pending.push_back((self.pos, Tok::Indent, self.pos));
        } else if width < top {
            while width < *self.indents.last().unwrap_or(&0) {
                self.indents.pop();
                self.pending.push_back((self.pos, Tok::Dedent, self.pos));
            }
            if width != *self.indents.last().unwrap_or(&0) {
                return Err(LexError::InconsistentDedent { line: self.line });
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
        let end = self.source.len();
        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.pending.push_back((end, Tok::Newline, end));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending.push_back((end, Tok::Dedent, end));
        }
    }

    fn scan_string(&mut self, start: usize) -> Result<Spanned<'input>, LexError> {
        let line = self.line;
        let column = self.column(start);
        let body_start = self.pos;
        loop {
            match self.peek() {
                None | Some('\n') => return Err(LexError::UnterminatedString { line, column }),
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    if matches!(self.peek(), None | Some('\n')) {
                        return Err(LexError::UnterminatedString { line, column });
                    }
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let body = &self.source[body_start..self.pos];
        self.advance(); // closing quote
        Ok((start, Tok::Str(body), self.pos))
    }

    fn scan_token(&mut self, c: char) -> Result<Spanned<'input>, LexError> {
        let start = self.pos;
        if c.is_ascii_digit() {
            let digits = self.take_while(|c| c.is_ascii_digit());
            return Ok((start, Tok::Number(digits), self.pos));
        }
        if c.is_alphabetic() || c == '_' {
            let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
            let tok = keyword(word).unwrap_or(Tok::Ident(word));
            return Ok((start, tok, self.pos));
        }
        if matches!(c, '<' | '>' | '=' | '!') {
            let op = self.take_while(|c| matches!(c, '<' | '>' | '=' | '!'));
            let tok = if op == "=" { Tok::Assign } else { Tok::Cmp(op) };
            return Ok((start, tok, self.pos));
        }

        let column = self.column(start);
        self.advance();
        let tok = match c {
            '"' => return self.scan_string(start),
            '(' => {
                self.paren_depth += 1;
                Tok::LParen
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                Tok::RParen
            }
            ',' => Tok::Comma,
            ':' => Tok::Colon,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            _ => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    line: self.line,
                    column,
                });
            }
        };
        Ok((start, tok, self.pos))
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result<Spanned<'input>, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Some(Ok(tok));
            }
            if self.finished {
                return None;
            }
            if self.at_line_start && self.paren_depth == 0 {
                self.at_line_start = false;
                if let Err(err) = self.handle_indentation() {
                    self.finished = true;
                    self.pending.clear();
                    return Some(Err(err.into()));
                }
                continue;
            }

            match self.peek() {
                None => self.finish(),
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('#') => {
                    self.take_while(|c| c != '\n');
                }
                Some('\n') => {
                    let start = self.pos;
                    self.advance();
                    if self.paren_depth > 0 {
                        continue;
                    }
                    self.at_line_start = true;
                    if self.line_has_tokens {
                        self.line_has_tokens = false;
                        return Some(Ok((start, Tok::Newline, self.pos)));
                    }
                }
                Some(c) => {
                    self.line_has_tokens = true;
                    return Some(self.scan_token(c).map_err(|err| {
                        self.finished = true;
                        err.into()
                    }));
                }
            }
        }
    }
}
