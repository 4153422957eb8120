//! # Scanner
//!
//! The scanner is responsible for:
//!
//! - reading the source code
//! - producing a stream of tokens.

use crate::utils::Init;

/// ## TokenType
///
/// An enum which represents the different types of tokens.
#[repr(C)]
#[derive(Debug, enum_repr::EnumU8, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
  // Single-character tokens.
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,
  Comma,
  Dot,
  Minus,
  Plus,
  Semicolon,
  Slash,
  Star,
  // One or two character tokens.
  Bang,
  BangEqual,
  Equal,
  EqualEqual,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
  // Literals.
  Identifier,
  String,
  Number,
  // Keywords.
  And,
  Class,
  Else,
  False,
  For,
  Fun,
  If,
  Nil,
  Or,
  Print,
  Return,
  Super,
  This,
  True,
  Var,
  While,
  // Error and EOF.
  Error,
  Eof,
}

/// ## Token
///
/// A struct which represents a token. Tokens are values, not owned
/// references: `lexeme` borrows directly into the source buffer, so a
/// `Token` is only valid while that buffer is alive.
#[derive(Clone)]
pub struct Token<'a> {
  /// The type of the token.
  pub(crate) token_type: TokenType,
  /// The line of the token.
  pub(crate) line: usize,
  /// The lexeme of the token.
  ///
  /// A lexeme is the text that the token represents. For an error token,
  /// this instead holds the (static) error message.
  pub(crate) lexeme: &'a str,
}

impl<'a> Init for Token<'a> {}

impl<'a> Default for Token<'a> {
  fn default() -> Self {
    Self {
      token_type: TokenType::Eof,
      line: 1,
      lexeme: "",
    }
  }
}

/// ## Scanner
///
/// A struct which represents a scanner.
#[derive(Debug)]
pub struct Scanner<'a> {
  /// The source code.
  pub(crate) source: &'a str,
  /// The start position.
  pub(crate) start: usize,
  /// The current position.
  pub(crate) current: usize,
  /// The current line.
  pub(crate) line: usize,
}

impl<'a> Scanner<'a> {
  /// Make a token, specifically from `string`.
  fn string(&mut self) -> Token<'a> {
    // Try finding the closing quote.
    while self.peek() != b'"' && !self.is_at_end() {
      if self.peek() == b'\n' {
        self.line += 1;
      }
      self.advance();
    }

    // Cannot find the closing quote.
    if self.is_at_end() {
      return self.error_token("Unterminated string.");
    }

    self.advance();
    self.make_token(TokenType::String)
  }

  /// Make a token, specifically from `number`.
  fn number(&mut self) -> Token<'a> {
    while self.peek().is_ascii_digit() {
      self.advance();
    }

    // Seeking for a fractional part
    if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
      // Consume the "."
      self.advance();

      // Consume the fractional part
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }

    self.make_token(TokenType::Number)
  }

  /// Scan an identifier or keyword.
  fn identifier(&mut self) -> Token<'a> {
    while is_identifier_continue(self.peek()) {
      self.advance();
    }
    self.make_token(self.identifier_type())
  }

  /// Classify the lexeme just scanned as a keyword or a plain identifier,
  /// using a manually-coded trie over the first one or two bytes and a
  /// literal tail compare, mirroring the reference scanner's dispatch.
  fn identifier_type(&self) -> TokenType {
    let lexeme = self.current_lexeme().as_bytes();
    match lexeme[0] {
      b'a' => self.check_keyword(1, "nd", TokenType::And),
      b'c' => self.check_keyword(1, "lass", TokenType::Class),
      b'e' => self.check_keyword(1, "lse", TokenType::Else),
      b'f' if lexeme.len() > 1 => match lexeme[1] {
        b'a' => self.check_keyword(2, "lse", TokenType::False),
        b'o' => self.check_keyword(2, "r", TokenType::For),
        b'u' => self.check_keyword(2, "n", TokenType::Fun),
        _ => TokenType::Identifier,
      },
      b'i' => self.check_keyword(1, "f", TokenType::If),
      b'n' => self.check_keyword(1, "il", TokenType::Nil),
      b'o' => self.check_keyword(1, "r", TokenType::Or),
      b'p' => self.check_keyword(1, "rint", TokenType::Print),
      b'r' => self.check_keyword(1, "eturn", TokenType::Return),
      b's' => self.check_keyword(1, "uper", TokenType::Super),
      b't' if lexeme.len() > 1 => match lexeme[1] {
        b'h' => self.check_keyword(2, "is", TokenType::This),
        b'r' => self.check_keyword(2, "ue", TokenType::True),
        _ => TokenType::Identifier,
      },
      b'v' => self.check_keyword(1, "ar", TokenType::Var),
      b'w' => self.check_keyword(1, "hile", TokenType::While),
      _ => TokenType::Identifier,
    }
  }

  /// Check whether the lexeme's tail (starting at byte `start`) matches
  /// `rest` exactly; if so the lexeme is the given keyword, otherwise it's
  /// a plain identifier.
  fn check_keyword(&self, start: usize, rest: &str, keyword: TokenType) -> TokenType {
    let lexeme = self.current_lexeme();
    if lexeme.len() == start + rest.len() && &lexeme[start..] == rest {
      keyword
    } else {
      TokenType::Identifier
    }
  }

  fn current_lexeme(&self) -> &'a str {
    &self.source[self.start..self.current]
  }
}

impl<'a> Scanner<'a> {
  /// Make a token.
  fn make_token(&self, token_type: TokenType) -> Token<'a> {
    Token {
      token_type,
      line: self.line,
      lexeme: self.current_lexeme(),
    }
  }

  /// Make an error token.
  fn error_token(&self, message: &'a str) -> Token<'a> {
    Token {
      token_type: TokenType::Error,
      line: self.line,
      lexeme: message,
    }
  }
}

impl<'a> Scanner<'a> {
  /// Scan token from scanner
  pub fn scan_token(&mut self) -> Token<'a> {
    self.skip_white_space();

    // reset start position
    self.start = self.current;

    if self.is_at_end() {
      return self.make_token(TokenType::Eof);
    }

    let c = self.advance();

    if is_identifier_start(c) {
      return self.identifier();
    }
    if c.is_ascii_digit() {
      return self.number();
    }

    match c {
      // mono-character tokens
      b'(' => self.make_token(TokenType::LeftParen),
      b')' => self.make_token(TokenType::RightParen),
      b'{' => self.make_token(TokenType::LeftBrace),
      b'}' => self.make_token(TokenType::RightBrace),
      b';' => self.make_token(TokenType::Semicolon),
      b',' => self.make_token(TokenType::Comma),
      b'.' => self.make_token(TokenType::Dot),
      b'-' => self.make_token(TokenType::Minus),
      b'+' => self.make_token(TokenType::Plus),
      b'/' => self.make_token(TokenType::Slash),
      b'*' => self.make_token(TokenType::Star),
      // possible two-character tokens
      b'!' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::BangEqual)
        } else {
          self.make_token(TokenType::Bang)
        }
      }
      b'=' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::EqualEqual)
        } else {
          self.make_token(TokenType::Equal)
        }
      }
      b'<' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::LessEqual)
        } else {
          self.make_token(TokenType::Less)
        }
      }
      b'>' => {
        if self.match_next(b'=') {
          self.make_token(TokenType::GreaterEqual)
        } else {
          self.make_token(TokenType::Greater)
        }
      }
      // string
      b'"' => self.string(),
      _ => self.error_token("Unexpected character."),
    }
  }
}

impl<'a> Scanner<'a> {
  /// Check if the scanner is at the end of the source code.
  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  /// Get current char, then advance the scanner (one step).
  fn advance(&mut self) -> u8 {
    self.current += 1;
    self.source.as_bytes()[self.current - 1]
  }

  /// Check if the next char matches the expected char.
  ///
  /// If it matches, advance the scanner (one step) immediately.
  fn match_next(&mut self, expected: u8) -> bool {
    if self.is_at_end() {
      return false;
    }
    if self.source.as_bytes()[self.current] != expected {
      return false;
    }
    self.current += 1;
    true
  }

  /// Get current char, without advancing the scanner.
  fn peek(&self) -> u8 {
    if self.is_at_end() {
      return b'\0';
    }
    self.source.as_bytes()[self.current]
  }

  /// Get the next char, without advancing the scanner.
  fn peek_next(&self) -> u8 {
    if self.current + 1 >= self.source.len() {
      return b'\0';
    }
    self.source.as_bytes()[self.current + 1]
  }

  fn skip_white_space(&mut self) {
    loop {
      let c = self.peek();
      match c {
        b' ' | b'\r' | b'\t' => {
          self.advance();
        }
        b'\n' => {
          self.line += 1;
          self.advance();
        }
        b'/' => {
          if self.peek_next() == b'/' {
            while self.peek() != b'\n' && !self.is_at_end() {
              self.advance();
            }
          } else {
            return;
          }
        }
        _ => return,
      }
    }
  }
}

impl<'a> Scanner<'a> {
  /// Bind a new scanner to the source code.
  #[inline]
  pub fn init(src: &'a str) -> Self {
    Self {
      source: src,
      start: 0,
      current: 0,
      line: 1,
    }
  }

  /// Bind a new scanner to the source code.
  #[inline]
  pub fn bind(src: &'a str) -> Self {
    Scanner::init(src)
  }
}

impl<'a> Default for Scanner<'a> {
  fn default() -> Self {
    Scanner::init("")
  }
}

fn is_identifier_start(c: u8) -> bool {
  c.is_ascii_alphabetic() || c == b'_'
}

fn is_identifier_continue(c: u8) -> bool {
  is_identifier_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenType> {
    let mut scanner = Scanner::init(src);
    let mut out = Vec::new();
    loop {
      let token = scanner.scan_token();
      let done = token.token_type == TokenType::Eof;
      out.push(token.token_type);
      if done {
        break;
      }
    }
    out
  }

  #[test]
  fn scans_keywords_not_prefixes() {
    assert_eq!(
      kinds("for forest"),
      vec![TokenType::For, TokenType::Identifier, TokenType::Eof]
    );
    assert_eq!(
      kinds("this that"),
      vec![TokenType::This, TokenType::Identifier, TokenType::Eof]
    );
  }

  #[test]
  fn scans_two_char_operators() {
    assert_eq!(
      kinds("!= == <= >= ="),
      vec![
        TokenType::BangEqual,
        TokenType::EqualEqual,
        TokenType::LessEqual,
        TokenType::GreaterEqual,
        TokenType::Equal,
        TokenType::Eof,
      ]
    );
  }

  #[test]
  fn tracks_line_numbers_across_strings_and_comments() {
    let mut scanner = Scanner::init("\"a\nb\" // comment\n1");
    let string_tok = scanner.scan_token();
    assert_eq!(string_tok.token_type, TokenType::String);
    assert_eq!(string_tok.line, 2);
    let number_tok = scanner.scan_token();
    assert_eq!(number_tok.token_type, TokenType::Number);
    assert_eq!(number_tok.line, 3);
  }

  #[test]
  fn unterminated_string_is_an_error_token() {
    let mut scanner = Scanner::init("\"unterminated");
    let token = scanner.scan_token();
    assert_eq!(token.token_type, TokenType::Error);
    assert_eq!(token.lexeme, "Unterminated string.");
  }

  #[test]
  fn eof_repeats() {
    let mut scanner = Scanner::init("");
    assert_eq!(scanner.scan_token().token_type, TokenType::Eof);
    assert_eq!(scanner.scan_token().token_type, TokenType::Eof);
  }
}
