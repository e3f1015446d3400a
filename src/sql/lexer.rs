//! SQL Lexer (Tokenizer)
//!
//! This module converts query strings into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
    /// The next token is a literal value (after `=`, `DEFAULT`, or inside `VALUES`)
    expect_value: bool,
    in_insert: bool,
    in_values: bool,
    in_join_condition: bool,
    previous: Token,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            expect_value: false,
            in_insert: false,
            in_values: false,
            in_join_condition: false,
            previous: Token::Eof,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.skip_comments();

        let token = match self.read_bare_value() {
            Some(token) => token,
            None => self.scan_token()?,
        };
        self.track(&token);
        Ok(token)
    }

    /// Update the value-position state after emitting `token`
    fn track(&mut self, token: &Token) {
        match token {
            Token::Insert => self.in_insert = true,
            Token::Values if self.in_insert && self.previous != Token::Into => {
                self.in_values = true
            }
            Token::On => self.in_join_condition = true,
            Token::Where => self.in_join_condition = false,
            Token::Semicolon => {
                self.in_insert = false;
                self.in_values = false;
                self.in_join_condition = false;
            }
            _ => {}
        }

        self.expect_value = match token {
            Token::Eq | Token::Neq | Token::Lt | Token::Gt | Token::Lte | Token::Gte => {
                !self.in_join_condition
            }
            Token::Default => true,
            Token::LParen | Token::Comma => self.in_values,
            _ => false,
        };
        self.previous = token.clone();
    }

    /// In value position, read an unquoted run up to whitespace, a delimiter,
    /// a quote or a comparison operator.
    ///
    /// A run that is a whole number becomes a number, a reserved keyword is
    /// left to the regular scanner, and anything else (`2024-01-15`, `12abc`,
    /// `bob@x.io`, `left`) becomes a bare word.
    fn read_bare_value(&mut self) -> Option<Token> {
        if !self.expect_value || self.is_at_end() {
            return None;
        }

        let start = self.position;
        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_whitespace() || Self::ends_bare_value(ch) {
                break;
            }
            self.advance();
        }
        let run: String = self.input[start..self.position].iter().collect();

        let is_word = run
            .chars()
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_')
            && run.chars().all(|c| c.is_alphanumeric() || c == '_');
        let reserved = is_word && Token::from_keyword(&run).map_or(false, |t| t.is_reserved());
        if run.is_empty() || reserved {
            self.position = start;
            return None;
        }

        if run.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(n) = run.parse::<f64>() {
                return Some(Token::NumberLiteral(n));
            }
        }
        Some(Token::Identifier(run))
    }

    fn ends_bare_value(ch: char) -> bool {
        matches!(ch, '(' | ')' | ',' | ';' | '\'' | '"' | '=' | '<' | '>' | '!')
    }

    fn scan_token(&mut self) -> Result<Token> {
        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '.' => Some(Token::Dot),
            '*' => Some(Token::Asterisk),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match ch {
            '-' => {
                self.advance();
                // Negative number
                if !self.is_at_end() && self.current_char().is_ascii_digit() {
                    return match self.read_number()? {
                        Token::NumberLiteral(n) => Ok(Token::NumberLiteral(-n)),
                        other => Ok(other),
                    };
                }
                Err(Error::UnexpectedCharacter('-', self.position - 1))
            }
            '<' => {
                self.advance();
                if !self.is_at_end() {
                    match self.current_char() {
                        '=' => {
                            self.advance();
                            return Ok(Token::Lte);
                        }
                        '>' => {
                            self.advance();
                            return Ok(Token::Neq);
                        }
                        _ => {}
                    }
                }
                Ok(Token::Lt)
            }
            '>' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    return Ok(Token::Gte);
                }
                Ok(Token::Gt)
            }
            '!' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    return Ok(Token::Neq);
                }
                Err(Error::UnexpectedCharacter('!', self.position - 1))
            }
            '\'' | '"' => self.read_string(ch),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            c => Err(Error::UnexpectedCharacter(c, self.position)),
        }
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Skip SQL comments (-- and /* */) and the whitespace after them
    fn skip_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }

            if self.current_char() == '-' && self.peek_char() == Some('-') {
                while !self.is_at_end() && self.current_char() != '\n' {
                    self.advance();
                }
            } else if self.current_char() == '/' && self.peek_char() == Some('*') {
                self.advance(); // skip /
                self.advance(); // skip *
                while !self.is_at_end() {
                    if self.current_char() == '*' && self.peek_char() == Some('/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
            } else {
                return;
            }

            self.skip_whitespace();
        }
    }

    /// Read a quoted string. A doubled quote character stands for one quote.
    fn read_string(&mut self, quote: char) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == quote {
                if self.peek_char() == Some(quote) {
                    value.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(Token::StringLiteral(value));
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::UnterminatedString(start_pos))
    }

    /// Read a number (integer, decimal or scientific notation)
    fn read_number(&mut self) -> Result<Token> {
        let start_pos = self.position;
        let mut value = String::new();
        let mut seen_dot = false;
        let mut seen_exp = false;

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && !seen_exp {
                // `1.` followed by a non-digit is a number then a dot
                match self.peek_char() {
                    Some(next) if next.is_ascii_digit() => {
                        seen_dot = true;
                        value.push(ch);
                        self.advance();
                    }
                    _ => break,
                }
            } else if (ch == 'e' || ch == 'E') && !seen_exp {
                seen_exp = true;
                value.push(ch);
                self.advance();

                if !self.is_at_end() && (self.current_char() == '+' || self.current_char() == '-')
                {
                    value.push(self.current_char());
                    self.advance();
                }
            } else {
                break;
            }
        }

        // A number glued to letters (`12abc`) is not a number
        if !self.is_at_end()
            && (self.current_char().is_alphabetic() || self.current_char() == '_')
        {
            return Err(Error::InvalidNumber(start_pos));
        }

        value
            .parse::<f64>()
            .map(Token::NumberLiteral)
            .map_err(|_| Error::InvalidNumber(start_pos))
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let mut lexer = Lexer::new("SELECT * FROM users");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Asterisk,
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_select_with_where() {
        let mut lexer = Lexer::new("select id, name from users where id = 1");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Identifier("id".to_string()),
                Token::Comma,
                Token::Identifier("name".to_string()),
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Where,
                Token::Identifier("id".to_string()),
                Token::Eq,
                Token::NumberLiteral(1.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new(r#"'hello world' "double" 'it''s'"#);
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::StringLiteral("hello world".to_string()));
        assert_eq!(tokens[1], Token::StringLiteral("double".to_string()));
        assert_eq!(tokens[2], Token::StringLiteral("it's".to_string()));
    }

    #[test]
    fn test_keywords_inside_strings_stay_strings() {
        let mut lexer = Lexer::new("'PRIMARY KEY'");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0], Token::StringLiteral("PRIMARY KEY".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("SELECT 'oops");
        assert_eq!(lexer.tokenize(), Err(Error::UnterminatedString(7)));
    }

    #[test]
    fn test_comparison_operators() {
        let mut lexer = Lexer::new("a < b <= c > d >= e <> f != g");
        let tokens = lexer.tokenize().unwrap();

        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Lte));
        assert!(tokens.contains(&Token::Gt));
        assert!(tokens.contains(&Token::Gte));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Neq).count(), 2);
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("3.14 2.5e3 -7 t.id");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::NumberLiteral(3.14));
        assert_eq!(tokens[1], Token::NumberLiteral(2500.0));
        assert_eq!(tokens[2], Token::NumberLiteral(-7.0));
        assert_eq!(tokens[4], Token::Dot);
    }

    #[test]
    fn test_invalid_number() {
        let mut lexer = Lexer::new("12abc");
        assert_eq!(lexer.tokenize(), Err(Error::InvalidNumber(0)));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("SELECT -- a comment\n* /* another */ FROM users");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Asterisk,
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("SELECT @");
        assert_eq!(lexer.tokenize(), Err(Error::UnexpectedCharacter('@', 7)));
    }

    #[test]
    fn test_bare_runs_in_value_position() {
        let mut lexer = Lexer::new("WHERE d = 2024-01-15 AND n=-3 AND e = bob@x.io AND k > NULL");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[3], Token::Identifier("2024-01-15".to_string()));
        assert_eq!(tokens[7], Token::NumberLiteral(-3.0));
        assert_eq!(tokens[11], Token::Identifier("bob@x.io".to_string()));
        assert_eq!(tokens[15], Token::Null);

        let mut lexer = Lexer::new("INSERT INTO t VALUES (12abc, 'x y'), (7)");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[5], Token::Identifier("12abc".to_string()));
        assert_eq!(tokens[7], Token::StringLiteral("x y".to_string()));
        assert_eq!(tokens[11], Token::NumberLiteral(7.0));
    }

    #[test]
    fn test_join_condition_is_not_a_value() {
        let mut lexer = Lexer::new("ON a.x = b.y WHERE b.z = c.d");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[5], Token::Identifier("b".to_string()));
        assert_eq!(tokens[13], Token::Identifier("c.d".to_string()));
    }
}
