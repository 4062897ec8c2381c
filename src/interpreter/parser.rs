use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{BinaryNode, FunctionNode, Literal, Node, NodeList, TernaryNode};
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::interpreter::symbols::{grammar, Infix, Prefix, Statement, Symbol, SymbolTable, UNARY_POWER};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("SyntaxError: {message} (line {line})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            message: message.into(),
            line,
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(format!("SyntaxError: {}", self.message))
            .with_code("E0101")
            .with_line(self.line);
        if !self.span.is_dummy() {
            diagnostic = diagnostic.with_label(Label::primary(self.span, ""));
        }
        diagnostic
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone)]
enum Payload {
    None,
    Name(Rc<str>),
    Literal(Literal),
}

/// The cursor's view of the next token: the grammar symbol it resolved to
/// plus the token's own data for names and literals.
#[derive(Debug, Clone)]
struct Lookahead {
    symbol: &'static Symbol,
    payload: Payload,
    line: usize,
    span: Span,
}

impl Lookahead {
    fn id(&self) -> &'static str {
        self.symbol.id
    }
}

pub struct Parser<'t> {
    grammar: &'static SymbolTable,
    tokens: &'t [Token],
    position: usize,
    current: Lookahead,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> ParseResult<Self> {
        let grammar = grammar();
        let mut parser = Self {
            grammar,
            tokens,
            position: 0,
            current: Lookahead {
                symbol: grammar.end(),
                payload: Payload::None,
                line: 1,
                span: Span::dummy(),
            },
        };
        parser.advance(None)?;
        Ok(parser)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current.line, self.current.span)
    }

    fn end_of_input(&self) -> Lookahead {
        let (line, span) = match self.tokens.last() {
            Some(last) => (last.line, Span::new(last.span.end, last.span.end)),
            None => (1, Span::new(0, 0)),
        };
        Lookahead {
            symbol: self.grammar.end(),
            payload: Payload::None,
            line,
            span,
        }
    }

    fn resolve(&self, token: &Token) -> ParseResult<Lookahead> {
        let (symbol, payload) = match &token.kind {
            TokenKind::Name(name) => match self.grammar.get(name) {
                Some(symbol) => (symbol, Payload::None),
                None => (self.grammar.name(), Payload::Name(Rc::from(name.as_str()))),
            },
            TokenKind::Operator(op) => match self.grammar.get(op) {
                Some(symbol) => (symbol, Payload::None),
                None => {
                    return Err(ParseError::new(
                        format!("Unknown operator '{}'", op),
                        token.line,
                        token.span,
                    ))
                }
            },
            TokenKind::String(text) => (self.grammar.literal(), Payload::Literal(Literal::String(Rc::from(text.as_str())))),
            TokenKind::Number(number) => (self.grammar.literal(), Payload::Literal(Literal::Number(*number))),
        };
        Ok(Lookahead {
            symbol,
            payload,
            line: token.line,
            span: token.span,
        })
    }

    /// Consume the current lookahead, checking its id when `expected` is
    /// given, and return it.
    fn advance(&mut self, expected: Option<&str>) -> ParseResult<Lookahead> {
        if let Some(expected) = expected {
            if self.current.id() != expected {
                return Err(self.error(format!("Expected '{}', got '{}'", expected, self.current.id())));
            }
        }

        let next = match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                let next = self.resolve(token)?;
                trace!(symbol = next.id(), line = next.line, "advance");
                next
            }
            None => self.end_of_input(),
        };

        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at(&self, id: &str) -> bool {
        self.current.id() == id
    }

    /// Take the current lookahead as a plain name, or fail with `message`.
    fn name(&mut self, message: &str) -> ParseResult<Rc<str>> {
        let Payload::Name(name) = &self.current.payload else {
            return Err(self.error(message));
        };
        let name = Rc::clone(name);
        self.advance(None)?;
        Ok(name)
    }

    pub fn expression(&mut self, rbp: u8) -> ParseResult<Node> {
        let token = self.advance(None)?;
        let mut left = self.prefix(token)?;
        while rbp < self.current.symbol.lbp {
            let token = self.advance(None)?;
            left = self.infix(token, left)?;
        }
        Ok(left)
    }

    pub fn statement(&mut self) -> ParseResult<Node> {
        if let Some(behavior) = self.current.symbol.statement {
            let token = self.advance(None)?;
            return self.statement_with(behavior, token);
        }

        let expression = self.expression(0)?;

        if let Node::Function(FunctionNode { name: Some(name), line, .. }) = &expression {
            let (name, line) = (Rc::clone(name), *line);
            if self.at(";") {
                self.advance(None)?;
            }
            return Ok(Node::assignment("let", Node::name(name, line), expression, line));
        }

        if !expression.is_assignment() && !expression.is_call() {
            return Err(ParseError::new("Bad expression statement", expression.line(), self.current.span));
        }
        self.advance(Some(";"))?;
        Ok(expression)
    }

    pub fn statements(&mut self) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        while !self.at("}") && !self.at("(end)") {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    pub fn block(&mut self) -> ParseResult<Node> {
        let token = self.advance(Some("{"))?;
        let behavior = token.symbol.statement;
        match behavior {
            Some(behavior @ Statement::Block) => self.statement_with(behavior, token),
            _ => Err(ParseError::new("Expected a block", token.line, token.span)),
        }
    }

    fn prefix(&mut self, token: Lookahead) -> ParseResult<Node> {
        let line = token.line;
        let Some(behavior) = token.symbol.prefix else {
            return Err(ParseError::new(
                format!("Unexpected '{}'", token.id()),
                line,
                token.span,
            ));
        };

        match behavior {
            Prefix::Constant(constant) => Ok(Node::literal(constant.literal(), line)),
            Prefix::Name => match token.payload {
                Payload::Name(name) => Ok(Node::name(name, line)),
                _ => Err(ParseError::new("Expected a variable name", line, token.span)),
            },
            Prefix::Literal => match token.payload {
                Payload::Literal(value) => Ok(Node::literal(value, line)),
                _ => Err(ParseError::new("Expected a literal", line, token.span)),
            },
            Prefix::Unary => {
                let operand = self.expression(UNARY_POWER)?;
                Ok(Node::unary(token.id(), operand, line))
            }
            Prefix::Group => {
                let inner = self.expression(0)?;
                self.advance(Some(")"))?;
                Ok(inner)
            }
            Prefix::Function => self.function(line),
            Prefix::ArrayLiteral => {
                let mut elements = Vec::new();
                while !self.at("]") {
                    let spread = self.at("...");
                    let element = if spread {
                        self.spread()?
                    } else {
                        self.expression(0)?
                    };
                    elements.push(element);
                    // A spread entry may omit its trailing comma.
                    if self.at(",") {
                        self.advance(None)?;
                    } else if !spread {
                        break;
                    }
                }
                self.advance(Some("]"))?;
                Ok(Node::unary("[", Node::list("[", elements, line), line))
            }
            Prefix::RecordLiteral => {
                let mut entries = Vec::new();
                while !self.at("}") {
                    let spread = self.at("...");
                    let entry = if spread {
                        self.spread()?
                    } else {
                        self.record_entry()?
                    };
                    entries.push(entry);
                    // A spread entry may omit its trailing comma.
                    if self.at(",") {
                        self.advance(None)?;
                    } else if !spread {
                        break;
                    }
                }
                self.advance(Some("}"))?;
                Ok(Node::unary("{", Node::list("{", entries, line), line))
            }
        }
    }

    fn spread(&mut self) -> ParseResult<Node> {
        let token = self.advance(Some("..."))?;
        let target = self.expression(0)?;
        Ok(Node::unary("...", target, token.line))
    }

    fn record_entry(&mut self) -> ParseResult<Node> {
        let line = self.current.line;
        let key = match &self.current.payload {
            Payload::Name(name) => Node::name(Rc::clone(name), line),
            Payload::Literal(literal @ Literal::String(_)) => Node::literal(literal.clone(), line),
            _ => return Err(self.error("Bad property name")),
        };
        self.advance(None)?;
        self.advance(Some(":"))?;
        let value = self.expression(0)?;
        Ok(Node::binary(":", key, value, line))
    }

    fn function(&mut self, line: usize) -> ParseResult<Node> {
        let name = if matches!(self.current.payload, Payload::Name(_)) {
            Some(self.name("Expected a function name")?)
        } else {
            None
        };

        self.advance(Some("("))?;
        let mut parameters = Vec::new();
        if !self.at(")") {
            loop {
                let parameter_line = self.current.line;
                let parameter = self.name("Expected a parameter name")?;
                parameters.push(Node::name(parameter, parameter_line));
                if !self.at(",") {
                    break;
                }
                self.advance(Some(","))?;
            }
        }
        self.advance(Some(")"))?;

        self.advance(Some("{"))?;
        let mut body = self.statements()?;
        let end_line = self.current.line;
        self.advance(Some("}"))?;

        if body.last().map(Node::op) != Some("return") {
            body.push(Node::statement("return", Node::literal(Literal::Undefined, end_line), end_line));
        }

        Ok(Node::Function(FunctionNode {
            name,
            parameters: NodeList {
                op: "parameters",
                children: parameters,
                line,
            },
            body: NodeList {
                op: "body",
                children: body,
                line,
            },
            line,
        }))
    }

    fn infix(&mut self, token: Lookahead, left: Node) -> ParseResult<Node> {
        let line = token.line;
        let id = token.id();
        let lbp = token.symbol.lbp;
        let Some(behavior) = token.symbol.infix else {
            return Err(ParseError::new(format!("Missing operator before '{}'", id), line, token.span));
        };

        match behavior {
            Infix::Left => {
                let right = self.expression(lbp)?;
                Ok(Node::binary(id, left, right, line))
            }
            Infix::Right => {
                let right = self.expression(lbp - 1)?;
                Ok(Node::binary(id, left, right, line))
            }
            Infix::Assignment => {
                let assignable = matches!(&left, Node::Name(_) | Node::Binary(BinaryNode { op: "." | "[", .. }));
                if !assignable {
                    return Err(ParseError::new("Bad lvalue", line, token.span));
                }
                let right = self.expression(lbp - 1)?;
                Ok(Node::assignment(id, left, right, line))
            }
            Infix::Conditional => {
                let then = self.expression(0)?;
                self.advance(Some(":"))?;
                let otherwise = self.expression(0)?;
                Ok(Node::ternary(id, left, then, otherwise, line))
            }
            Infix::Dot => {
                let key_line = self.current.line;
                let key = self.name("Expected a property name")?;
                Ok(Node::binary(id, left, Node::name(key, key_line), line))
            }
            Infix::Index => {
                let key = self.expression(0)?;
                self.advance(Some("]"))?;
                Ok(Node::binary(id, left, key, line))
            }
            Infix::Call => {
                let callable = matches!(
                    &left,
                    Node::Name(_)
                        | Node::Function(_)
                        | Node::Binary(BinaryNode { op: "." | "[" | "(" | "&&" | "||", .. })
                        | Node::Ternary(TernaryNode { op: "?" | "(", .. })
                );
                if !callable {
                    return Err(ParseError::new("Expected a variable name", left.line(), token.span));
                }

                let mut arguments = Vec::new();
                if !self.at(")") {
                    loop {
                        arguments.push(self.expression(0)?);
                        if !self.at(",") {
                            break;
                        }
                        self.advance(Some(","))?;
                    }
                }
                self.advance(Some(")"))?;
                let arguments = Node::list("(", arguments, line);

                match left {
                    Node::Binary(BinaryNode {
                        op: "." | "[",
                        left: target,
                        right: key,
                        ..
                    }) => Ok(Node::ternary(id, *target, *key, arguments, line)),
                    callee => Ok(Node::binary(id, callee, arguments, line)),
                }
            }
        }
    }

    fn statement_with(&mut self, behavior: Statement, token: Lookahead) -> ParseResult<Node> {
        let line = token.line;
        match behavior {
            Statement::Block => {
                let children = self.statements()?;
                self.advance(Some("}"))?;
                Ok(Node::block(children, line))
            }
            Statement::Throw => {
                let value = self.expression(0)?;
                self.advance(Some(";"))?;
                Ok(Node::statement("throw", value, line))
            }
            Statement::Let => {
                let name_line = self.current.line;
                let name = Node::name(self.name("Expected a new variable name")?, name_line);
                if self.at(";") {
                    self.advance(None)?;
                    return Ok(Node::assignment("let", name, Node::literal(Literal::Undefined, line), line));
                }
                self.advance(Some("="))?;
                let value = self.expression(0)?;
                self.advance(Some(";"))?;
                Ok(Node::assignment("let", name, value, line))
            }
            Statement::If => {
                self.advance(Some("("))?;
                let condition = self.expression(0)?;
                self.advance(Some(")"))?;
                let then = self.block()?;
                let otherwise = if self.at("else") {
                    self.advance(None)?;
                    if self.at("if") {
                        self.statement()?
                    } else {
                        self.block()?
                    }
                } else {
                    Node::block(Vec::new(), line)
                };
                Ok(Node::ternary("if", condition, then, otherwise, line))
            }
            Statement::Try => {
                let body = self.block()?;
                self.advance(Some("catch"))?;
                self.advance(Some("("))?;
                let binding_line = self.current.line;
                let binding = self.name("Expected a catch binding name")?;
                self.advance(Some(")"))?;
                let handler = self.block()?;
                Ok(Node::ternary("try", body, Node::name(binding, binding_line), handler, line))
            }
            Statement::Return => {
                if self.at(";") {
                    self.advance(None)?;
                    self.expect_block_end()?;
                    return Ok(Node::statement("return", Node::literal(Literal::Undefined, line), line));
                }
                let value = self.expression(0)?;
                self.advance(Some(";"))?;
                Ok(Node::statement("return", value, line))
            }
            Statement::Break | Statement::Continue => {
                self.advance(Some(";"))?;
                self.expect_block_end()?;
                Ok(Node::statement(token.id(), Node::literal(Literal::Undefined, line), line))
            }
            Statement::While => {
                self.advance(Some("("))?;
                let condition = self.expression(0)?;
                self.advance(Some(")"))?;
                let body = self.block()?;
                Ok(Node::statement("while", Node::binary("while", condition, body, line), line))
            }
        }
    }

    /// A jump must be the last statement of its block.
    fn expect_block_end(&self) -> ParseResult<()> {
        if self.at("}") || self.at("(end)") {
            Ok(())
        } else {
            Err(self.error("Unreachable statement"))
        }
    }
}

/// Parse a whole program.
pub fn parse(tokens: &[Token]) -> ParseResult<Vec<Node>> {
    let mut parser = Parser::new(tokens)?;
    let statements = parser.statements()?;
    parser.advance(Some("(end)"))?;
    debug!(tokens = tokens.len(), statements = statements.len(), "parsed program");
    Ok(statements)
}

/// Parse a single expression, optionally terminated by `;`.
pub fn parse_expression(tokens: &[Token]) -> ParseResult<Node> {
    let mut parser = Parser::new(tokens)?;
    let expression = parser.expression(0)?;
    if parser.at(";") {
        parser.advance(None)?;
    }
    parser.advance(Some("(end)"))?;
    Ok(expression)
}
