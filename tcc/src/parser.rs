use std::collections::HashMap;

use crate::error::{CompileError, Result};
use crate::token::{Token, TokenKind};

const VAR_START_ADDR: u16 = 0x0100;

struct Symbol {
    address: u16,
}

/// Recursive-descent parser and one-pass code generator: every rule emits
/// its assembly text directly as it recognizes a construct, the same way a
/// single walk over the grammar would.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symbols: HashMap<String, Symbol>,
    next_var_addr: u16,
    label_counter: u32,
    output: Vec<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser {
            tokens,
            pos: 0,
            symbols: HashMap::new(),
            next_var_addr: VAR_START_ADDR,
            label_counter: 0,
            output: Vec::new(),
        }
    }

    pub fn compile(mut self) -> Result<Vec<String>> {
        while self.current().kind != TokenKind::Eof {
            self.statement()?;
        }
        if self.output.last().map_or(true, |l| !l.contains("HALT")) {
            self.emit("HALT");
        }
        Ok(self.output)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        if self.current().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {:?}, got {:?}",
                kind,
                self.current().kind
            )))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.current().line, message)
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn emit_label_def(&mut self, label: &str) {
        self.emit(format!("{}:", label));
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    fn statement(&mut self) -> Result<()> {
        match self.current().kind {
            TokenKind::Var => self.var_declaration(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Identifier if self.peek().kind == TokenKind::Assign => self.assignment(),
            TokenKind::LBrace => {
                self.advance();
                while self.current().kind != TokenKind::RBrace
                    && self.current().kind != TokenKind::Eof
                {
                    self.statement()?;
                }
                self.expect(TokenKind::RBrace)
            }
            _ => self.expression_statement(),
        }
    }

    fn var_declaration(&mut self) -> Result<()> {
        self.expect(TokenKind::Var)?;
        if self.current().kind != TokenKind::Identifier {
            return Err(self.error("expected variable name"));
        }
        let name = self.current().text.clone();
        self.advance();

        if self.symbols.contains_key(&name) {
            return Err(self.error("variable already declared"));
        }
        let address = self.next_var_addr;
        self.next_var_addr += 1;
        self.symbols.insert(name, Symbol { address });

        if self.check(TokenKind::Assign) {
            self.expression()?;
            self.emit(format!("STORE 0x{:04X}", address));
        }

        self.expect(TokenKind::Semicolon)
    }

    fn assignment(&mut self) -> Result<()> {
        let name = self.current().text.clone();
        self.advance();

        let address = self
            .symbols
            .get(&name)
            .map(|s| s.address)
            .ok_or_else(|| self.error("undefined variable"))?;

        self.expect(TokenKind::Assign)?;
        self.expression()?;
        self.emit(format!("STORE 0x{:04X}", address));
        self.expect(TokenKind::Semicolon)
    }

    fn if_statement(&mut self) -> Result<()> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        self.expression()?;
        self.expect(TokenKind::RParen)?;

        let if_id = self.label_counter;
        let else_label = format!("IF_ELSE_{}", if_id);
        let end_label = format!("IF_END_{}", if_id);
        self.label_counter += 2;

        self.emit(format!("JZ {}", else_label));
        self.statement()?;

        if self.current().kind == TokenKind::Else {
            self.advance();
            self.emit(format!("JMP {}", end_label));
            self.emit_label_def(&else_label);
            self.statement()?;
            self.emit_label_def(&end_label);
        } else {
            self.emit_label_def(&else_label);
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<()> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;

        let loop_start = self.new_label();
        let loop_end = self.new_label();

        self.emit_label_def(&loop_start);
        self.expression()?;
        self.expect(TokenKind::RParen)?;

        self.emit(format!("JZ {}", loop_end));
        self.statement()?;
        self.emit(format!("JMP {}", loop_start));
        self.emit_label_def(&loop_end);
        Ok(())
    }

    fn expression_statement(&mut self) -> Result<()> {
        if self.current().kind != TokenKind::Semicolon {
            self.expression()?;
        }
        self.expect(TokenKind::Semicolon)
    }

    fn expression(&mut self) -> Result<()> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<()> {
        self.term()?;
        loop {
            let mnemonic = match self.current().kind {
                TokenKind::Equals => "EQ",
                TokenKind::NotEquals => "NEQ",
                TokenKind::Less => "LT",
                TokenKind::Greater => "GT",
                TokenKind::LessEqual => "LTE",
                TokenKind::GreaterEqual => "GTE",
                _ => break,
            };
            self.advance();
            self.term()?;
            self.emit(mnemonic);
        }
        Ok(())
    }

    fn term(&mut self) -> Result<()> {
        self.multiplicative()?;
        loop {
            let mnemonic = match self.current().kind {
                TokenKind::Plus => "ADD",
                TokenKind::Minus => "SUB",
                _ => break,
            };
            self.advance();
            self.multiplicative()?;
            self.emit(mnemonic);
        }
        Ok(())
    }

    fn multiplicative(&mut self) -> Result<()> {
        self.factor()?;
        loop {
            let mnemonic = match self.current().kind {
                TokenKind::Star => "MUL",
                TokenKind::Slash => "DIV",
                _ => break,
            };
            self.advance();
            self.factor()?;
            self.emit(mnemonic);
        }
        Ok(())
    }

    fn factor(&mut self) -> Result<()> {
        match self.current().kind {
            TokenKind::Eof => Err(self.error("unexpected end of file")),
            TokenKind::Number => {
                let text = self.current().text.clone();
                match text.parse::<u32>() {
                    Ok(value) if value <= 0xFF => {
                        self.emit(format!("PUSH {}", text));
                        self.advance();
                        Ok(())
                    }
                    _ => Err(self.error(format!("integer literal '{}' overflows a byte", text))),
                }
            }
            TokenKind::Identifier => {
                let name = self.current().text.clone();
                self.advance();
                if self.current().kind == TokenKind::LParen {
                    self.function_call(&name)
                } else {
                    let address = self
                        .symbols
                        .get(&name)
                        .map(|s| s.address)
                        .ok_or_else(|| self.error(format!("undefined variable '{}'", name)))?;
                    self.emit(format!("LOAD 0x{:04X}", address));
                    Ok(())
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(TokenKind::RParen)
            }
            other => Err(self.error(format!(
                "expected number, variable, or expression, got {:?}",
                other
            ))),
        }
    }

    fn function_call(&mut self, name: &str) -> Result<()> {
        let syscall_id = builtin_syscall(name)
            .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;

        self.expect(TokenKind::LParen)?;
        if self.current().kind != TokenKind::RParen && self.current().kind != TokenKind::Eof {
            self.expression()?;
            while self.check(TokenKind::Comma) {
                if self.current().kind == TokenKind::RParen || self.current().kind == TokenKind::Eof
                {
                    return Err(self.error("expected expression after comma"));
                }
                self.expression()?;
            }
        }
        self.expect(TokenKind::RParen)?;

        if name == "halt" {
            self.emit("SYS 0x00");
            self.emit("HALT");
        } else {
            self.emit(format!("SYS 0x{:02X}", syscall_id));
        }
        Ok(())
    }
}

const EOF: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
    line: 0,
};

fn builtin_syscall(name: &str) -> Option<u8> {
    match name {
        "draw_pixel" => Some(0x10),
        "draw_line" => Some(0x11),
        "fill_rect" => Some(0x12),
        "refresh" => Some(0x13),
        "print_char" => Some(0x01),
        "read_char" => Some(0x02),
        "halt" => Some(0x00),
        _ => None,
    }
}
