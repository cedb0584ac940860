/// Pipeline orchestration: source text → tokens → AST → values, with
/// per-stage timing, plus the session type the REPL drives.
use std::time::{Duration, Instant};

use crate::ast::Stmt;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;

pub fn parse_source(source: &str) -> Result<Vec<Stmt>, String> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| e.to_string())?;
    let mut parser = Parser::new(tokens);
    let (stmts, errors) = parser.parse();
    match errors.into_iter().next() {
        Some(e) => Err(e.to_string()),
        None => Ok(stmts),
    }
}

/// Run `code` through the full pipeline. Lex and parse errors go to stderr
/// prefixed with the file name; execution is then skipped and the exec
/// duration reported as zero.
pub fn execute(
    file_name: Option<&str>,
    code: &str,
    script_mode: bool,
) -> (Vec<Value>, Duration, Duration, Duration) {
    let file = file_name.unwrap_or("Unknown File");

    let start = Instant::now();
    let tokens = match Lexer::new(code).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Syntax errors found in {}:", file);
            eprintln!("{}", e);
            return (Vec::new(), start.elapsed(), Duration::ZERO, Duration::ZERO);
        }
    };
    let lex_time = start.elapsed();

    let start = Instant::now();
    let mut parser = Parser::new(tokens);
    let (stmts, errors) = parser.parse();
    let parse_time = start.elapsed();

    if !errors.is_empty() {
        eprintln!("Syntax errors found in {}:", file);
        for e in &errors {
            eprintln!("{}", e);
        }
        return (Vec::new(), lex_time, parse_time, Duration::ZERO);
    }

    let start = Instant::now();
    let evaluator = Interpreter::new(stmts);
    let results = match evaluator.exec(script_mode) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{}", e);
            Vec::new()
        }
    };
    let exec_time = start.elapsed();

    (results, lex_time, parse_time, exec_time)
}

/// One parser + one evaluator reused across inputs; the root context
/// persists, so definitions survive between lines.
pub struct ReplSession {
    parser: Parser,
    evaluator: Interpreter,
}

impl ReplSession {
    pub fn new() -> ReplSession {
        ReplSession {
            parser: Parser::empty(),
            evaluator: Interpreter::empty(),
        }
    }

    pub fn run(&mut self, input: &str) -> Result<Vec<Value>, String> {
        let tokens = Lexer::new(input).tokenize().map_err(|e| e.to_string())?;
        self.parser.reset(tokens);
        let (stmts, errors) = self.parser.parse();
        if !errors.is_empty() {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(rendered.join("\n"));
        }
        self.evaluator.reset_lines(stmts);
        self.evaluator.exec(true).map_err(|e| e.to_string())
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        ReplSession::new()
    }
}
