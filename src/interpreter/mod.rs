use crate::ast::Stmt;
use crate::value::{EvalError, Value};

mod builtins;
mod context;
mod eval;
mod exec;
mod ops;

pub use context::{Context, Extension, Variable};

/// Tree-walking evaluator. Owns the root context; the parser and the type
/// lattice are pure transformations over immutable input.
pub struct Interpreter {
    stmts: Vec<Stmt>,
    root: Context,
}

impl Interpreter {
    /// Construct with the default built-ins registered at root.
    pub fn new(stmts: Vec<Stmt>) -> Interpreter {
        let root = Context::root();
        builtins::init(&root);
        builtins::init_ints(&root);
        Interpreter { stmts, root }
    }

    /// An interpreter with no statements yet — for REPL reuse.
    pub fn empty() -> Interpreter {
        Interpreter::new(Vec::new())
    }

    /// Replace the statement list without clearing the root context, so
    /// definitions persist between REPL inputs.
    pub fn reset_lines(&mut self, stmts: Vec<Stmt>) {
        self.stmts = stmts;
    }

    pub fn root(&self) -> &Context {
        &self.root
    }

    /// Evaluate the top-level statements in order. In script mode the
    /// results of expression statements are collected; otherwise only
    /// explicitly returned values. A top-level `return` ends the run.
    pub fn exec(&self, script_mode: bool) -> Result<Vec<Value>, EvalError> {
        let mut results = Vec::new();
        for stmt in &self.stmts {
            match self.exec_stmt(&self.root, stmt) {
                Ok(value) => {
                    if script_mode && matches!(stmt, Stmt::Expression(_)) {
                        results.push(value);
                    }
                }
                Err(EvalError::Return(value)) => {
                    if !script_mode {
                        results.push(*value);
                    }
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }
}
