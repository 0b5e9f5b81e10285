//! A single-pass scanner over the raw file text. Tracks brace depth so only
//! top-level declarations are collected; string literals and comments are
//! consumed as opaque units so braces inside them do not confuse the depth
//! tracking.

use crate::ast::{Declaration, ImportModifier, SchemaAst};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: usize },
    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: usize },
    #[error("unbalanced braces at line {line}")]
    UnbalancedBraces { line: usize },
    #[error("expected {expected} on line {line}")]
    Expected { expected: &'static str, line: usize },
}

/// Parse one schema file into its declaration-level view.
pub fn parse(text: &str) -> Result<SchemaAst, ParseError> {
    Scanner::new(text).run()
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    depth: usize,
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            depth: 0,
        }
    }

    fn run(mut self) -> Result<SchemaAst, ParseError> {
        let mut declarations = Vec::new();

        loop {
            self.skip_trivia()?;
            let Some(byte) = self.peek() else { break };

            match byte {
                b'{' => {
                    self.depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    if self.depth == 0 {
                        return Err(ParseError::UnbalancedBraces { line: self.line });
                    }
                    self.depth -= 1;
                    self.pos += 1;
                }
                b'"' | b'\'' => {
                    self.read_string()?;
                }
                _ if is_word_byte(byte) => {
                    let word = self.read_word();
                    if self.depth == 0 {
                        match word {
                            "package" => declarations.push(self.package_declaration()?),
                            "import" => declarations.push(self.import_declaration()?),
                            "service" => declarations.push(self.service_declaration()?),
                            "option" => declarations.push(self.option_declaration()?),
                            _ => {}
                        }
                    }
                }
                _ => self.pos += 1,
            }
        }

        if self.depth != 0 {
            return Err(ParseError::UnbalancedBraces { line: self.line });
        }
        Ok(SchemaAst::new(declarations))
    }

    fn package_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.skip_trivia()?;
        let name = self.read_word();
        if name.is_empty() {
            return Err(ParseError::Expected {
                expected: "package name",
                line: self.line,
            });
        }
        self.expect(b';', "';' after package declaration")?;
        Ok(Declaration::Package(name.to_string()))
    }

    fn import_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.skip_trivia()?;
        let mut modifier = ImportModifier::None;
        if self.peek().is_some_and(is_word_byte) {
            modifier = match self.read_word() {
                "public" => ImportModifier::Public,
                "weak" => ImportModifier::Weak,
                _ => {
                    return Err(ParseError::Expected {
                        expected: "import path string",
                        line: self.line,
                    });
                }
            };
            self.skip_trivia()?;
        }
        if !matches!(self.peek(), Some(b'"' | b'\'')) {
            return Err(ParseError::Expected {
                expected: "import path string",
                line: self.line,
            });
        }
        let path = self.read_string()?;
        self.expect(b';', "';' after import declaration")?;
        Ok(Declaration::Import { path, modifier })
    }

    fn service_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.skip_trivia()?;
        let name = self.read_word();
        if name.is_empty() {
            return Err(ParseError::Expected {
                expected: "service name",
                line: self.line,
            });
        }
        // The body brace is handled by the main loop.
        Ok(Declaration::Service(name.to_string()))
    }

    fn option_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.skip_trivia()?;
        let name = self.option_name()?;
        self.expect(b'=', "'=' in option declaration")?;
        self.skip_trivia()?;
        let value = if matches!(self.peek(), Some(b'"' | b'\'')) {
            self.read_string()?
        } else {
            let word = self.read_word();
            if word.is_empty() {
                return Err(ParseError::Expected {
                    expected: "option value",
                    line: self.line,
                });
            }
            word.to_string()
        };
        self.expect(b';', "';' after option declaration")?;
        Ok(Declaration::Option { name, value })
    }

    /// Option names are plain identifiers or custom options of the form
    /// `(full.name)` with an optional dotted field suffix.
    fn option_name(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some(b'(') {
            self.pos += 1;
            self.skip_trivia()?;
            let inner = self.read_word();
            if inner.is_empty() {
                return Err(ParseError::Expected {
                    expected: "option name",
                    line: self.line,
                });
            }
            self.skip_trivia()?;
            if self.peek() != Some(b')') {
                return Err(ParseError::Expected {
                    expected: "')' in option name",
                    line: self.line,
                });
            }
            self.pos += 1;
            let suffix = self.read_word();
            Ok(format!("({inner}){suffix}"))
        } else {
            let word = self.read_word();
            if word.is_empty() {
                return Err(ParseError::Expected {
                    expected: "option name",
                    line: self.line,
                });
            }
            Ok(word.to_string())
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.peek() != Some(byte) {
            return Err(ParseError::Expected {
                expected,
                line: self.line,
            });
        }
        self.pos += 1;
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_word_byte) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Consume a quoted literal and return its contents, escapes kept as
    /// written.
    fn read_string(&mut self) -> Result<String, ParseError> {
        let start_line = self.line;
        let Some(quote) = self.peek() else {
            return Err(ParseError::UnterminatedString { line: start_line });
        };
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedString { line: start_line }),
                Some(b) if b == quote => {
                    let content = &self.src[start..self.pos];
                    self.pos += 1;
                    return Ok(content.to_string());
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek() == Some(b'\n') {
                        self.line += 1;
                    }
                    if self.peek().is_some() {
                        self.pos += 1;
                    }
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start_line = self.line;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => {
                                return Err(ParseError::UnterminatedComment { line: start_line });
                            }
                            Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(b'\n') => {
                                self.line += 1;
                                self.pos += 1;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}
