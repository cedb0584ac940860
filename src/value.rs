/// Core Opal runtime value type and associated utilities.
///
/// Lives in its own module so the type lattice, the evaluator and the
/// built-in registrations can all import it without tangling.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Stmt;
use crate::interpreter::Context;
use crate::types::{self, Signature, Type};

// ---------------------------------------------------------------------------
// EvalError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Runtime error: {0}")]
    Error(String),
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("Illegal number of arguments for function {name}: expected {expected}, received {received}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("Expected {expected} for parameter {name} and got {got}")]
    ParameterTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },
    #[error("Function '{name}' did not return a value of type {expected}, instead was {got}")]
    ReturnTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },
    #[error("Cannot assign value of type {got} to '{name}' of type {expected}")]
    AssignmentTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },
    #[error("Cannot reassign immutable variable '{0}'")]
    ImmutableAssignment(String),
    /// Internal signal: a `return` statement unwinding to its function
    /// frame. Caught by the invocation machinery, never surfaces.
    #[error("return outside of a function")]
    Return(Box<Value>),
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Value {
    pub ty: Rc<Type>,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
pub enum Payload {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Function(Rc<FunctionValue>),
    /// Struct instance: ordered field → value. Shared so that field
    /// assignment through one handle is visible through all.
    Instance(Rc<RefCell<Vec<(String, Value)>>>),
    Collection(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Unit,
    /// The process stdout sink.
    Output,
}

pub type NativeFn = Rc<dyn Fn(&Context) -> Result<Value, EvalError>>;

pub enum FunctionBody {
    Ast(Rc<Stmt>),
    Native(NativeFn),
}

pub struct FunctionValue {
    /// Christened on declaration; anonymous until then.
    pub name: RefCell<Option<String>>,
    pub signature: Signature,
    pub body: FunctionBody,
    /// The defining scope, captured by reference.
    pub closure: Context,
}

impl FunctionValue {
    pub fn display_name(&self) -> String {
        self.name.borrow().clone().unwrap_or_else(|| "Function".to_string())
    }

    /// Display signature, e.g. `add(Int, Int) => Int`.
    pub fn display(&self) -> String {
        format!("{}{}", self.display_name(), self.signature)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.display())
    }
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Ast(_) => write!(f, "<body>"),
            FunctionBody::Native(_) => write!(f, "<native>"),
        }
    }
}

/// Structural equality on payloads; functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a == b,
            (Payload::Str(a), Payload::Str(b)) => a == b,
            (Payload::Char(a), Payload::Char(b)) => a == b,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Unit, Payload::Unit) => true,
            (Payload::Output, Payload::Output) => true,
            (Payload::Function(a), Payload::Function(b)) => Rc::ptr_eq(a, b),
            (Payload::Instance(a), Payload::Instance(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Payload::Collection(a), Payload::Collection(b)) => a == b,
            (Payload::Map(a), Payload::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn int(i: i64) -> Value {
        Value {
            ty: types::int(),
            payload: Payload::Int(i),
        }
    }

    pub fn float(f: f64) -> Value {
        Value {
            ty: types::float(),
            payload: Payload::Float(f),
        }
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value {
            ty: types::string(),
            payload: Payload::Str(s.into()),
        }
    }

    pub fn char(c: char) -> Value {
        Value {
            ty: types::char(),
            payload: Payload::Char(c),
        }
    }

    pub fn boolean(b: bool) -> Value {
        Value {
            ty: types::boolean(),
            payload: Payload::Bool(b),
        }
    }

    pub fn unit() -> Value {
        Value {
            ty: types::unit(),
            payload: Payload::Unit,
        }
    }

    pub fn output() -> Value {
        Value {
            ty: types::output(),
            payload: Payload::Output,
        }
    }

    pub fn function(func: FunctionValue) -> Value {
        let ty = Rc::new(Type::Function(func.signature.clone()));
        Value {
            ty,
            payload: Payload::Function(Rc::new(func)),
        }
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Human-readable representation of a value.
pub fn repr(val: &Value) -> String {
    match &val.payload {
        Payload::Int(i) => i.to_string(),
        Payload::Float(f) => format!("{:?}", f),
        Payload::Str(s) => s.clone(),
        Payload::Char(c) => c.to_string(),
        Payload::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Payload::Unit => "()".to_string(),
        Payload::Output => "<output>".to_string(),
        Payload::Function(f) => format!("<fn {}>", f.display()),
        Payload::Instance(fields) => {
            let parts: Vec<String> = fields
                .borrow()
                .iter()
                .map(|(k, v)| format!("{}: {}", k, repr_inner(v)))
                .collect();
            format!("{}({})", val.ty.name(), parts.join(", "))
        }
        Payload::Collection(items) => {
            let parts: Vec<String> = items.iter().map(repr_inner).collect();
            format!("[{}]", parts.join(", "))
        }
        Payload::Map(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", repr_inner(k), repr_inner(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

/// Like `repr` but strings and chars get quoted — used inside collections,
/// maps and instances.
fn repr_inner(val: &Value) -> String {
    match &val.payload {
        Payload::Str(s) => format!("\"{}\"", s),
        Payload::Char(c) => format!("'{}'", c),
        _ => repr(val),
    }
}

/// Returns the display string for the REPL — `None` for `Unit` (silent).
pub fn display(val: &Value) -> Option<String> {
    match val.payload {
        Payload::Unit => None,
        _ => Some(repr(val)),
    }
}
