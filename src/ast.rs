use std::fmt;
use std::rc::Rc;

/// A compile-time constant carried by a `LiteralNode`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(Rc<str>),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
            Literal::Undefined => write!(f, "undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    pub value: Literal,
    pub line: usize,
}

/// Binary operators, `let`/`=` bindings, `.`/`[` access, plain calls,
/// record entries (`:`) and the `while` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryNode {
    pub op: &'static str,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub is_assignment: bool,
    pub line: usize,
}

/// Prefix operators, spread entries and array/record literals.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryNode {
    pub op: &'static str,
    pub value: Box<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameNode {
    pub identifier: Rc<str>,
    pub line: usize,
}

/// `cond ? a : b`, `if`, `try` and method calls.
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryNode {
    pub op: &'static str,
    pub first: Box<Node>,
    pub second: Box<Node>,
    pub third: Box<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: Option<Rc<str>>,
    pub parameters: NodeList,
    pub body: NodeList,
    pub line: usize,
}

/// Blocks, `return`, `throw`, `while`, `break` and `continue`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementNode {
    pub op: &'static str,
    pub value: Box<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeList {
    pub op: &'static str,
    pub children: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(LiteralNode),
    Binary(BinaryNode),
    Unary(UnaryNode),
    Name(NameNode),
    Ternary(TernaryNode),
    Function(FunctionNode),
    Statement(StatementNode),
    List(NodeList),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Literal(node) => node.line,
            Node::Binary(node) => node.line,
            Node::Unary(node) => node.line,
            Node::Name(node) => node.line,
            Node::Ternary(node) => node.line,
            Node::Function(node) => node.line,
            Node::Statement(node) => node.line,
            Node::List(node) => node.line,
        }
    }

    /// The grammar id that produced this node.
    pub fn op(&self) -> &'static str {
        match self {
            Node::Literal(_) => "(literal)",
            Node::Name(_) => "(name)",
            Node::Function(_) => "function",
            Node::Binary(node) => node.op,
            Node::Unary(node) => node.op,
            Node::Ternary(node) => node.op,
            Node::Statement(node) => node.op,
            Node::List(node) => node.op,
        }
    }

    pub fn literal(value: Literal, line: usize) -> Node {
        Node::Literal(LiteralNode { value, line })
    }

    pub fn name(identifier: impl Into<Rc<str>>, line: usize) -> Node {
        Node::Name(NameNode {
            identifier: identifier.into(),
            line,
        })
    }

    pub fn binary(op: &'static str, left: Node, right: Node, line: usize) -> Node {
        Node::Binary(BinaryNode {
            op,
            left: Box::new(left),
            right: Box::new(right),
            is_assignment: false,
            line,
        })
    }

    pub fn assignment(op: &'static str, left: Node, right: Node, line: usize) -> Node {
        Node::Binary(BinaryNode {
            op,
            left: Box::new(left),
            right: Box::new(right),
            is_assignment: true,
            line,
        })
    }

    pub fn unary(op: &'static str, value: Node, line: usize) -> Node {
        Node::Unary(UnaryNode {
            op,
            value: Box::new(value),
            line,
        })
    }

    pub fn ternary(op: &'static str, first: Node, second: Node, third: Node, line: usize) -> Node {
        Node::Ternary(TernaryNode {
            op,
            first: Box::new(first),
            second: Box::new(second),
            third: Box::new(third),
            line,
        })
    }

    pub fn statement(op: &'static str, value: Node, line: usize) -> Node {
        Node::Statement(StatementNode {
            op,
            value: Box::new(value),
            line,
        })
    }

    pub fn list(op: &'static str, children: Vec<Node>, line: usize) -> Node {
        Node::List(NodeList { op, children, line })
    }

    /// `{ }` with the given statements, as produced by the block handler.
    pub fn block(children: Vec<Node>, line: usize) -> Node {
        Node::statement("{", Node::list("{", children, line), line)
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Node::Binary(BinaryNode { is_assignment: true, .. }))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Node::Binary(BinaryNode { op: "(", .. }) | Node::Ternary(TernaryNode { op: "(", .. }))
    }
}
