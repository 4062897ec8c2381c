//! The grammar: a frozen table from grammar id to parse behaviors.
//!
//! Each symbol owns a left binding power and up to three behaviors: a
//! prefix behavior (the symbol starts an expression), an infix behavior
//! (the symbol continues one) and a statement behavior (the symbol starts a
//! statement). A symbol without any behavior is a terminal.

use indexmap::IndexMap;
use std::sync::OnceLock;

use crate::ast::Literal;

/// Operand power for prefix operators such as `-` and `typeof`.
pub const UNARY_POWER: u8 = 70;

/// Values of the keyword constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    True,
    False,
    Null,
    Undefined,
}

impl Constant {
    pub fn literal(self) -> Literal {
        match self {
            Constant::True => Literal::Boolean(true),
            Constant::False => Literal::Boolean(false),
            Constant::Null => Literal::Null,
            Constant::Undefined => Literal::Undefined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Constant(Constant),
    Name,
    Literal,
    /// One operand at `UNARY_POWER`.
    Unary,
    Group,
    Function,
    ArrayLiteral,
    RecordLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    /// Right operand parsed at the symbol's own power.
    Left,
    /// Right operand parsed one below the symbol's power.
    Right,
    Assignment,
    Conditional,
    Dot,
    Index,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Block,
    Let,
    If,
    While,
    Try,
    Throw,
    Return,
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub id: &'static str,
    pub lbp: u8,
    pub prefix: Option<Prefix>,
    pub infix: Option<Infix>,
    pub statement: Option<Statement>,
}

impl Symbol {
    fn terminal(id: &'static str) -> Self {
        Self {
            id,
            lbp: 0,
            prefix: None,
            infix: None,
            statement: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.prefix.is_none() && self.infix.is_none() && self.statement.is_none()
    }
}

/// Registers symbols in declaration order; later declarations may raise a
/// symbol's power and attach further behaviors.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    symbols: IndexMap<&'static str, Symbol>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn symbol(&mut self, id: &'static str, power: u8) -> &mut Symbol {
        let symbol = self.symbols.entry(id).or_insert_with(|| Symbol::terminal(id));
        if power >= symbol.lbp {
            symbol.lbp = power;
        }
        symbol
    }

    pub fn terminal(&mut self, id: &'static str) -> &mut Self {
        self.symbol(id, 0);
        self
    }

    pub fn constant(&mut self, id: &'static str, value: Constant) -> &mut Self {
        self.symbol(id, 0).prefix = Some(Prefix::Constant(value));
        self
    }

    pub fn infix(&mut self, id: &'static str, power: u8) -> &mut Self {
        self.infix_with(id, power, Infix::Left)
    }

    pub fn infix_right(&mut self, id: &'static str, power: u8) -> &mut Self {
        self.infix_with(id, power, Infix::Right)
    }

    pub fn infix_with(&mut self, id: &'static str, power: u8, behavior: Infix) -> &mut Self {
        self.symbol(id, power).infix = Some(behavior);
        self
    }

    pub fn prefix(&mut self, id: &'static str) -> &mut Self {
        self.prefix_with(id, Prefix::Unary)
    }

    pub fn prefix_with(&mut self, id: &'static str, behavior: Prefix) -> &mut Self {
        self.symbol(id, 0).prefix = Some(behavior);
        self
    }

    pub fn statement(&mut self, id: &'static str, behavior: Statement) -> &mut Self {
        self.symbol(id, 0).statement = Some(behavior);
        self
    }

    pub fn build(&mut self) -> SymbolTable {
        let symbols = std::mem::take(&mut self.symbols);
        let pseudo = |id: &'static str| symbols.get(id).copied().unwrap_or_else(|| Symbol::terminal(id));
        SymbolTable {
            name: pseudo("(name)"),
            literal: pseudo("(literal)"),
            end: pseudo("(end)"),
            symbols,
        }
    }
}

/// The frozen grammar.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: IndexMap<&'static str, Symbol>,
    name: Symbol,
    literal: Symbol,
    end: Symbol,
}

impl SymbolTable {
    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// The symbol given to identifiers that are not grammar words.
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    /// The symbol given to string and number tokens.
    pub fn literal(&self) -> &Symbol {
        &self.literal
    }

    pub fn end(&self) -> &Symbol {
        &self.end
    }
}

fn declare_grammar() -> SymbolTable {
    let mut grammar = GrammarBuilder::new();

    for id in ["(end)", ":", ";", ")", "]", "}", ",", "else", "catch", "..."] {
        grammar.terminal(id);
    }

    grammar
        .prefix_with("(name)", Prefix::Name)
        .prefix_with("(literal)", Prefix::Literal)
        .constant("true", Constant::True)
        .constant("false", Constant::False)
        .constant("null", Constant::Null)
        .constant("undefined", Constant::Undefined);

    grammar
        .infix_with("=", 10, Infix::Assignment)
        .infix_with("?", 20, Infix::Conditional)
        .infix_right("&&", 30)
        .infix_right("||", 30);

    for id in ["===", "!==", "<", "<=", ">", ">="] {
        grammar.infix_right(id, 40);
    }

    grammar
        .infix("+", 50)
        .infix("-", 50)
        .infix("*", 60)
        .infix("/", 60)
        .infix("**", 70)
        .infix_with(".", 80, Infix::Dot)
        .infix_with("[", 80, Infix::Index)
        .infix_with("(", 80, Infix::Call);

    grammar
        .prefix("-")
        .prefix("typeof")
        .prefix_with("(", Prefix::Group)
        .prefix_with("function", Prefix::Function)
        .prefix_with("[", Prefix::ArrayLiteral)
        .prefix_with("{", Prefix::RecordLiteral);

    grammar
        .statement("{", Statement::Block)
        .statement("throw", Statement::Throw)
        .statement("let", Statement::Let)
        .statement("if", Statement::If)
        .statement("try", Statement::Try)
        .statement("return", Statement::Return)
        .statement("break", Statement::Break)
        .statement("continue", Statement::Continue)
        .statement("while", Statement::While);

    grammar.build()
}

/// The shared grammar, built on first use.
pub fn grammar() -> &'static SymbolTable {
    static GRAMMAR: OnceLock<SymbolTable> = OnceLock::new();
    GRAMMAR.get_or_init(declare_grammar)
}
