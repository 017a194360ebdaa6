use crate::{
    expression::{Expr, ExprId, Operator},
    reference::Ref,
    table::ExprTable,
};
use anyhow::{anyhow, Error, Result};
use log::info;

/// Reads the line-oriented BTOR format, one expression per line:
///
/// ```text
/// <id> <operator> <width> [<operand>...] [<symbol>]
/// ```
///
/// `;` starts a comment running to the end of the line.
pub struct Parser<'a> {
    name: &'a str,
    lineno: usize,
}

fn is_separator(ch: u8) -> bool {
    ch == b' ' || ch == b'\t'
}

fn skip_separators(source: &mut &[u8]) -> bool {
    let n = source.iter().take_while(|&&ch| is_separator(ch)).count();
    *source = &source[n..];
    n > 0
}

fn take_token<'s>(source: &mut &'s [u8]) -> &'s [u8] {
    let n = source.iter().take_while(|&&ch| !is_separator(ch)).count();
    let token = &source[..n];
    *source = &source[n..];
    token
}

fn is_number(token: &[u8]) -> bool {
    match token.first() {
        Some(b'-') => true,
        Some(ch) => ch.is_ascii_digit(),
        None => false,
    }
}

impl<'a> Parser<'a> {
    pub fn new(name: &'a str) -> Self {
        Self { name, lineno: 0 }
    }

    fn error(&self, message: impl std::fmt::Display) -> Error {
        anyhow!("{}:{}: {}", self.name, self.lineno, message)
    }

    // Reads a run of decimal digits starting at the head of `source`.
    fn parse_digits(&self, source: &mut &[u8]) -> Result<u32> {
        let mut value: u32 = 0;
        while let Some(&ch) = source.first() {
            if !ch.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((ch - b'0') as u32))
                .filter(|&v| v <= i32::MAX as u32)
                .ok_or_else(|| self.error("number too large"))?;
            *source = &source[1..];
        }
        Ok(value)
    }

    fn parse_number(&self, token: &[u8]) -> Result<i32> {
        let mut rest = token;
        let negative = rest.first() == Some(&b'-');
        if negative {
            rest = &rest[1..];
            match rest.first() {
                Some(ch) if ch.is_ascii_digit() => {}
                Some(&ch) => {
                    let message = format!("expected digit after '-' but got '0x{:02x}'", ch);
                    return Err(self.error(message));
                }
                None => return Err(self.error("expected digit after '-' but got '0x20'")),
            }
        }
        let value = self.parse_digits(&mut rest)? as i32;
        if !rest.is_empty() {
            return Err(self.error("expected space or new line"));
        }
        Ok(if negative { -value } else { value })
    }

    fn parse_line(&self, mut source: &[u8], table: &mut ExprTable) -> Result<Option<ExprId>> {
        let Some(&first) = source.first() else {
            return Ok(None);
        };
        if is_separator(first) {
            skip_separators(&mut source);
            if source.is_empty() {
                return Ok(None);
            }
            return Err(self.error("expected digit but got '0x20'"));
        }
        if !first.is_ascii_digit() {
            return Err(self.error(format!("expected digit but got '0x{:02x}'", first)));
        }

        let id = self.parse_digits(&mut source)?;
        if !skip_separators(&mut source) {
            return Err(self.error(format!("expected space after index {}", id)));
        }
        if id == 0 {
            return Err(self.error("expected positive index"));
        }

        let n = source.iter().take_while(|ch| ch.is_ascii_lowercase()).count();
        let name = String::from_utf8_lossy(&source[..n]).into_owned();
        source = &source[n..];
        if !skip_separators(&mut source) {
            return Err(self.error(format!("expected space after '{}'", name)));
        }
        let op = Operator::from_name(&name);

        let mut width: Option<u32> = None;
        let mut operands = Vec::new();
        let mut symbol = None;
        while !source.is_empty() {
            let token = take_token(&mut source);
            skip_separators(&mut source);
            let last = source.is_empty();

            if width.is_some() && operands.is_empty() && op.has_payload() {
                symbol = Some(token.to_vec());
                if !last {
                    return Err(self.error("expected new line after payload"));
                }
                break;
            }

            if is_number(token) {
                let value = self.parse_number(token)?;
                match width {
                    None if value <= 0 => return Err(self.error("expected positive width")),
                    None => width = Some(value as u32),
                    Some(_) if operands.len() == 3 => {
                        return Err(self.error("more than three operands"))
                    }
                    Some(_) => operands.push(value),
                }
            } else if width.is_none() {
                return Err(self.error("width missing"));
            } else if last {
                symbol = Some(token.to_vec());
            } else {
                return Err(self.error(format!("expected digit but got '{}'", token[0] as char)));
            }
        }

        let Some(width) = width else {
            return Err(self.error("width missing"));
        };
        if !table.insert(id, Expr::new(op, width, operands, symbol)) {
            return Err(self.error(format!("expression {} defined twice", id)));
        }
        Ok(Some(id))
    }

    /// Parses `source` into a fresh expression table.
    ///
    /// ```
    /// use deltabtor_rust::Parser;
    /// let table = Parser::new("<input>").parse("1 var 8 x\n2 root 8 1\n").unwrap();
    /// assert_eq!(table.size(), 3);
    /// assert_eq!(table.max_width(), 8);
    /// ```
    pub fn parse(mut self, source: impl AsRef<[u8]>) -> Result<ExprTable> {
        let mut table = ExprTable::new();
        let mut defined = Vec::new();
        for line in source.as_ref().split(|&ch| ch == b'\n') {
            self.lineno += 1;
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let line = match line.iter().position(|&ch| ch == b';') {
                Some(pos) => &line[..pos],
                None => line,
            };
            let n = line.iter().rev().take_while(|&&ch| is_separator(ch)).count();
            if let Some(id) = self.parse_line(&line[..line.len() - n], &mut table)? {
                defined.push((id, self.lineno));
            }
        }

        // References may point forward, so they are checked once all
        // expressions are known.
        for (id, lineno) in defined {
            let expr = table.expr(id);
            for (pos, &operand) in expr.operands.iter().enumerate() {
                if !expr.is_reference(pos) {
                    continue;
                }
                let child = Ref::new(operand).id();
                if child == 0 || table.get(child).is_none() {
                    self.lineno = lineno;
                    return Err(self.error(format!(
                        "expression {} references undefined expression {}",
                        id, operand
                    )));
                }
            }
        }
        info!("parsed {} expressions", table.ids().count());
        Ok(table)
    }
}
