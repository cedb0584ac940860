use super::*;
use crate::ast::{BinaryOp, UnaryOp};
use crate::value::{repr, Payload};

impl Interpreter {
    pub(super) fn eval_binary(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
    ) -> Result<Value, EvalError> {
        match op {
            BinaryOp::Add => op_add(left, right),
            BinaryOp::Sub => op_sub(left, right),
            BinaryOp::Mul => op_mul(left, right),
            BinaryOp::Div => op_div(left, right),
            BinaryOp::Mod => op_mod(left, right),
            BinaryOp::Eq => Ok(Value::boolean(left == right)),
            BinaryOp::Neq => Ok(Value::boolean(left != right)),
            BinaryOp::Lt => op_compare(&left, &right, "<"),
            BinaryOp::Gt => op_compare(&left, &right, ">"),
            BinaryOp::Lte => op_compare(&left, &right, "<="),
            BinaryOp::Gte => op_compare(&left, &right, ">="),
            // `and`/`or` are short-circuited before operand evaluation
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        }
    }

    pub(super) fn eval_unary(&self, op: UnaryOp, value: Value) -> Result<Value, EvalError> {
        match (op, &value.payload) {
            (UnaryOp::Neg, Payload::Int(i)) => Ok(Value::int(-i)),
            (UnaryOp::Neg, Payload::Float(f)) => Ok(Value::float(-f)),
            (UnaryOp::Pos, Payload::Int(_)) | (UnaryOp::Pos, Payload::Float(_)) => Ok(value),
            (UnaryOp::Not, Payload::Bool(b)) => Ok(Value::boolean(!b)),
            (UnaryOp::Not, _) => Err(EvalError::Error(format!(
                "Operator '!' requires a Boolean operand, got {}",
                value.ty.name()
            ))),
            _ => Err(EvalError::Error(format!(
                "Unary operator requires a numeric operand, got {}",
                value.ty.name()
            ))),
        }
    }
}

// Mixed Int/Float arithmetic promotes to Float. A String left operand of
// `+` stringifies the right one (the `plus` built-in's semantics).

fn op_add(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => Ok(Value::int(x + y)),
        (Payload::Float(x), Payload::Float(y)) => Ok(Value::float(x + y)),
        (Payload::Int(x), Payload::Float(y)) => Ok(Value::float(*x as f64 + y)),
        (Payload::Float(x), Payload::Int(y)) => Ok(Value::float(x + *y as f64)),
        (Payload::Str(x), _) => Ok(Value::string(format!("{}{}", x, repr(&b)))),
        _ => Err(EvalError::Error(format!(
            "Operator '+' does not support {} and {}",
            a.ty.name(),
            b.ty.name()
        ))),
    }
}

fn op_sub(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => Ok(Value::int(x - y)),
        (Payload::Float(x), Payload::Float(y)) => Ok(Value::float(x - y)),
        (Payload::Int(x), Payload::Float(y)) => Ok(Value::float(*x as f64 - y)),
        (Payload::Float(x), Payload::Int(y)) => Ok(Value::float(x - *y as f64)),
        _ => Err(EvalError::Error(format!(
            "Operator '-' does not support {} and {}",
            a.ty.name(),
            b.ty.name()
        ))),
    }
}

fn op_mul(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => Ok(Value::int(x * y)),
        (Payload::Float(x), Payload::Float(y)) => Ok(Value::float(x * y)),
        (Payload::Int(x), Payload::Float(y)) => Ok(Value::float(*x as f64 * y)),
        (Payload::Float(x), Payload::Int(y)) => Ok(Value::float(x * *y as f64)),
        _ => Err(EvalError::Error(format!(
            "Operator '*' does not support {} and {}",
            a.ty.name(),
            b.ty.name()
        ))),
    }
}

fn op_div(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => {
            if *y == 0 {
                Err(EvalError::Error("Division by zero".to_string()))
            } else {
                Ok(Value::int(x / y))
            }
        }
        (Payload::Float(x), Payload::Float(y)) => {
            if *y == 0.0 {
                Err(EvalError::Error("Division by zero".to_string()))
            } else {
                Ok(Value::float(x / y))
            }
        }
        (Payload::Int(x), Payload::Float(y)) => Ok(Value::float(*x as f64 / y)),
        (Payload::Float(x), Payload::Int(y)) => Ok(Value::float(x / *y as f64)),
        _ => Err(EvalError::Error(format!(
            "Operator '/' does not support {} and {}",
            a.ty.name(),
            b.ty.name()
        ))),
    }
}

fn op_mod(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => {
            if *y == 0 {
                Err(EvalError::Error("Division by zero".to_string()))
            } else {
                Ok(Value::int(x % y))
            }
        }
        _ => Err(EvalError::Error(format!(
            "Operator '%' does not support {} and {}",
            a.ty.name(),
            b.ty.name()
        ))),
    }
}

fn op_compare(a: &Value, b: &Value, op: &str) -> Result<Value, EvalError> {
    let result = match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => compare(x, y, op),
        (Payload::Float(x), Payload::Float(y)) => compare(x, y, op),
        (Payload::Int(x), Payload::Float(y)) => compare(&(*x as f64), y, op),
        (Payload::Float(x), Payload::Int(y)) => compare(x, &(*y as f64), op),
        (Payload::Str(x), Payload::Str(y)) => compare(x, y, op),
        (Payload::Char(x), Payload::Char(y)) => compare(x, y, op),
        _ => {
            return Err(EvalError::Error(format!(
                "Operator '{}' does not support {} and {}",
                op,
                a.ty.name(),
                b.ty.name()
            )))
        }
    };
    Ok(Value::boolean(result))
}

fn compare<T: PartialOrd>(x: &T, y: &T, op: &str) -> bool {
    match op {
        "<" => x < y,
        ">" => x > y,
        "<=" => x <= y,
        ">=" => x >= y,
        _ => unreachable!(),
    }
}
