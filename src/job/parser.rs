//! Recursive descent parser for job files
//! Converts tokens into calculation [`Inputs`]

use super::lexer::Token;
use super::JobError;
use crate::model::{CutType, Inputs};
use std::ops::Range;

pub type Result<T> = std::result::Result<T, JobError>;

/// Values collected so far, with the span each was set at
#[derive(Default)]
struct Draft {
    machine: Option<String>,
    spindle: Option<String>,
    tool: Option<String>,
    material: Option<String>,
    cut: Option<CutType>,
    aggressiveness: Option<f64>,
    doc: Option<f64>,
    woc: Option<f64>,
    flutes: Option<u32>,
    stickout: Option<f64>,
    hobby: Option<bool>,
}

fn set<T>(slot: &mut Option<T>, value: T, key: &'static str, span: Range<usize>) -> Result<()> {
    if slot.is_some() {
        return Err(JobError::Duplicate { key, span });
    }
    *slot = Some(value);
    Ok(())
}

pub struct Parser {
    tokens: Vec<(Token, logos::Span)>,
    position: usize,
    source_len: usize,
}

impl Parser {
    pub fn new(tokens: Vec<(Token, logos::Span)>, source_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            source_len,
        }
    }

    /// Parse every statement, then check required keys
    pub fn parse(&mut self) -> Result<Inputs> {
        let mut draft = Draft::default();

        loop {
            self.skip_newlines();
            let Some((token, span)) = self.next() else {
                break;
            };
            self.parse_statement(&token, span, &mut draft)?;
            self.end_of_statement()?;
        }

        let required = |value: Option<String>, key: &'static str| {
            value.ok_or(JobError::Missing { key })
        };
        let mut inputs = Inputs::new(
            required(draft.machine, "machine")?,
            required(draft.spindle, "spindle")?,
            required(draft.tool, "tool")?,
            required(draft.material, "material")?,
            draft.cut.unwrap_or_default(),
        );
        if let Some(a) = draft.aggressiveness {
            inputs.aggressiveness = a;
        }
        inputs.doc = draft.doc;
        inputs.woc = draft.woc;
        inputs.flutes = draft.flutes;
        inputs.stickout = draft.stickout;
        inputs.hobby_mode = draft.hobby.unwrap_or(false);
        Ok(inputs)
    }

    fn parse_statement(&mut self, key: &Token, span: Range<usize>, draft: &mut Draft) -> Result<()> {
        self.skip_equals();
        match key {
            Token::Machine => {
                let id = self.expect_id("machine id")?;
                set(&mut draft.machine, id, "machine", span)
            }
            Token::Spindle => {
                let id = self.expect_id("spindle id")?;
                set(&mut draft.spindle, id, "spindle", span)
            }
            Token::Tool => {
                let id = self.expect_id("tool id")?;
                set(&mut draft.tool, id, "tool", span)
            }
            Token::Material => {
                let id = self.expect_id("material id")?;
                set(&mut draft.material, id, "material", span)
            }
            Token::Cut => {
                let value_span = self.peek_span();
                let name = self.expect_id("cut type")?;
                let cut = name.parse::<CutType>().map_err(|e| JobError::InvalidValue {
                    key: "cut",
                    message: e.to_string(),
                    span: value_span,
                })?;
                set(&mut draft.cut, cut, "cut", span)
            }
            Token::Aggressiveness => {
                let value = self.expect_positive("aggressiveness")?;
                set(&mut draft.aggressiveness, value, "aggressiveness", span)
            }
            Token::Doc => {
                let value = self.expect_positive("doc")?;
                set(&mut draft.doc, value, "doc", span)
            }
            Token::Woc => {
                let value = self.expect_positive("woc")?;
                set(&mut draft.woc, value, "woc", span)
            }
            Token::Stickout => {
                let value = self.expect_positive("stickout")?;
                set(&mut draft.stickout, value, "stickout", span)
            }
            Token::Flutes => {
                let value_span = self.peek_span();
                let value = self.expect_number("flute count")?;
                if value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
                    return Err(JobError::InvalidValue {
                        key: "flutes",
                        message: format!("expected a whole number of flutes, got {}", value),
                        span: value_span,
                    });
                }
                set(&mut draft.flutes, value as u32, "flutes", span)
            }
            Token::Hobby => {
                let value = match self.next() {
                    Some((Token::On, _)) => true,
                    Some((Token::Off, _)) => false,
                    Some((other, span)) => {
                        return Err(JobError::Expected {
                            expected: "'on' or 'off'".to_string(),
                            found: other.describe(),
                            span,
                        })
                    }
                    None => return Err(self.eof("'on' or 'off'")),
                };
                set(&mut draft.hobby, value, "hobby", span)
            }
            other => Err(JobError::Expected {
                expected: "a setting name".to_string(),
                found: other.describe(),
                span,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.position)
            .map(|(_, s)| s.clone())
            .unwrap_or(self.source_len..self.source_len)
    }

    fn next(&mut self) -> Option<(Token, Range<usize>)> {
        let item = self.tokens.get(self.position).cloned();
        if item.is_some() {
            self.position += 1;
        }
        item
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(&Token::Newline) {
            self.position += 1;
        }
    }

    fn skip_equals(&mut self) {
        if self.peek() == Some(&Token::Equals) {
            self.position += 1;
        }
    }

    fn end_of_statement(&mut self) -> Result<()> {
        match self.next() {
            None | Some((Token::Newline, _)) => Ok(()),
            Some((other, span)) => Err(JobError::Expected {
                expected: "end of line".to_string(),
                found: other.describe(),
                span,
            }),
        }
    }

    fn eof(&self, expected: &str) -> JobError {
        JobError::UnexpectedEof {
            expected: expected.to_string(),
            span: self.source_len..self.source_len,
        }
    }

    /// Identifier, quoted string or bare number, as text
    fn expect_id(&mut self, expected: &str) -> Result<String> {
        match self.next() {
            Some((Token::Identifier(s), _)) | Some((Token::String(s), _)) => Ok(s),
            Some((Token::Number(n), _)) => Ok(n.to_string()),
            Some((other, span)) => Err(JobError::Expected {
                expected: expected.to_string(),
                found: other.describe(),
                span,
            }),
            None => Err(self.eof(expected)),
        }
    }

    fn expect_number(&mut self, expected: &str) -> Result<f64> {
        match self.next() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((other, span)) => Err(JobError::Expected {
                expected: expected.to_string(),
                found: other.describe(),
                span,
            }),
            None => Err(self.eof(expected)),
        }
    }

    fn expect_positive(&mut self, key: &'static str) -> Result<f64> {
        let span = self.peek_span();
        let value = self.expect_number(key)?;
        if value <= 0.0 {
            return Err(JobError::InvalidValue {
                key,
                message: format!("{} must be positive, got {}", key, value),
                span,
            });
        }
        Ok(value)
    }
}
