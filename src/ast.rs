use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeOp {
    And,
    Or,
}

/// A function parameter as written in source: `name` or `name: Contract`.
/// An omitted contract means `Any`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub contract: Option<TypeContract>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// A struct field declaration: `name: Contract` with an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub contract: TypeContract,
    pub default: Option<Expr>,
}

/// A type as written in source. Contracts are parsed alongside expressions
/// and converted to runtime types at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeContract {
    Elementary(String),
    /// `(A, B) -> R`
    Invocable(Vec<TypeContract>, Box<TypeContract>),
    /// `[E]`
    Collection(Box<TypeContract>),
    /// `[K: V]`
    Map(Box<TypeContract>, Box<TypeContract>),
    /// `A | B` / `A & B`
    Binary(Box<TypeContract>, TypeOp, Box<TypeContract>),
    /// `{ field: Contract, ... }` — only valid in definable positions
    /// (`as`/`is` operands and `type` definitions).
    Defined(Vec<(String, TypeContract)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Group(Box<Expr>),
    Variable(String),
    /// `name = value` or `target.name = value` — `context` present iff the
    /// assignment target is a dotted access.
    Assignment {
        context: Option<Box<Expr>>,
        name: String,
        value: Box<Expr>,
    },
    Invocation(Box<Expr>, Vec<Expr>),
    /// Dotted field access: `target.field`
    Context(Box<Expr>, String),
    TypeCast(Box<Expr>, TypeContract),
    TypeCheck(Box<Expr>, TypeContract),
    /// Both branches produce a value; the trailing result expression is
    /// lifted out of the branch block at parse time.
    IfElse {
        condition: Box<Expr>,
        if_branch: Vec<Stmt>,
        if_result: Box<Expr>,
        else_branch: Vec<Stmt>,
        else_result: Box<Expr>,
    },
    FuncDef {
        params: Vec<Parameter>,
        return_type: Option<TypeContract>,
        body: Rc<Stmt>,
    },
    /// Indexing: `target[index]`
    Access(Box<Expr>, Box<Expr>),
    Collection(Vec<Expr>),
    Map(Vec<MapEntry>),
    Str(String),
    Char(char),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Declaration {
        mutable: bool,
        name: String,
        declared_type: Option<TypeContract>,
        value: Expr,
    },
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    StructDef {
        name: String,
        fields: Vec<FieldDef>,
    },
    TypeDef {
        name: String,
        contract: TypeContract,
    },
    /// `extend Target { let name = ... }` — registers each member against
    /// the target type in the extension registry.
    Extend {
        target: String,
        members: Vec<Stmt>,
    },
}

impl fmt::Display for TypeContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeContract::Elementary(name) => write!(f, "{}", name),
            TypeContract::Invocable(args, ret) => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "({}) -> {}", parts.join(", "), ret)
            }
            TypeContract::Collection(elem) => write!(f, "[{}]", elem),
            TypeContract::Map(key, value) => write!(f, "[{}: {}]", key, value),
            TypeContract::Binary(lhs, op, rhs) => {
                let sym = match op {
                    TypeOp::And => "&",
                    TypeOp::Or => "|",
                };
                write!(f, "{} {} {}", lhs, sym, rhs)
            }
            TypeContract::Defined(parts) => {
                let rendered: Vec<String> =
                    parts.iter().map(|(n, c)| format!("{}: {}", n, c)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(i) => write!(f, "{}", i),
            Expr::Float(x) => write!(f, "{:?}", x),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Char(c) => write!(f, "'{}'", c),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Group(inner) => write!(f, "({})", inner),
            Expr::Binary(lhs, op, rhs) => {
                let sym = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    BinaryOp::Mod => "%",
                    BinaryOp::Eq => "==",
                    BinaryOp::Neq => "!=",
                    BinaryOp::Lt => "<",
                    BinaryOp::Gt => ">",
                    BinaryOp::Lte => "<=",
                    BinaryOp::Gte => ">=",
                    BinaryOp::And => "and",
                    BinaryOp::Or => "or",
                };
                write!(f, "{} {} {}", lhs, sym, rhs)
            }
            Expr::Unary(op, rhs) => {
                let sym = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Pos => "+",
                    UnaryOp::Not => "!",
                };
                write!(f, "{}{}", sym, rhs)
            }
            Expr::Assignment {
                context,
                name,
                value,
            } => match context {
                Some(ctx) => write!(f, "{}.{} = {}", ctx, name, value),
                None => write!(f, "{} = {}", name, value),
            },
            Expr::Invocation(target, args) => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", target, parts.join(", "))
            }
            Expr::Context(target, field) => write!(f, "{}.{}", target, field),
            Expr::TypeCast(expr, contract) => write!(f, "{} as {}", expr, contract),
            Expr::TypeCheck(expr, contract) => write!(f, "{} is {}", expr, contract),
            Expr::IfElse {
                condition,
                if_result,
                else_result,
                ..
            } => write!(
                f,
                "if {} -> {} else -> {}",
                condition, if_result, else_result
            ),
            Expr::FuncDef {
                params,
                return_type,
                ..
            } => {
                let parts: Vec<String> = params
                    .iter()
                    .map(|p| match &p.contract {
                        Some(c) => format!("{}: {}", p.name, c),
                        None => p.name.clone(),
                    })
                    .collect();
                match return_type {
                    Some(ret) => write!(f, "({}) -> {} => ...", parts.join(", "), ret),
                    None => write!(f, "({}) -> ...", parts.join(", ")),
                }
            }
            Expr::Access(target, index) => write!(f, "{}[{}]", target, index),
            Expr::Collection(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Expr::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{}: {}", e.key, e.value))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
