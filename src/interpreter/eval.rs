use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::*;
use crate::ast::{BinaryOp, Expr, TypeContract};
use crate::types::{self, Param, Signature, Type};
use crate::value::{repr, FunctionBody, FunctionValue, Payload};

impl Interpreter {
    pub fn eval_expr(&self, ctx: &Context, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(i) => Ok(Value::int(*i)),
            Expr::Float(f) => Ok(Value::float(*f)),
            Expr::Str(s) => Ok(Value::string(s.clone())),
            Expr::Char(c) => Ok(Value::char(*c)),
            Expr::Bool(b) => Ok(Value::boolean(*b)),
            Expr::Variable(name) => ctx
                .lookup(name)
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Expr::Group(inner) => self.eval_expr(ctx, inner),
            Expr::Unary(op, rhs) => {
                let value = self.eval_expr(ctx, rhs)?;
                self.eval_unary(*op, value)
            }
            Expr::Binary(lhs, BinaryOp::And, rhs) => self.eval_logical(ctx, lhs, rhs, true),
            Expr::Binary(lhs, BinaryOp::Or, rhs) => self.eval_logical(ctx, lhs, rhs, false),
            Expr::Binary(lhs, op, rhs) => {
                let left = self.eval_expr(ctx, lhs)?;
                let right = self.eval_expr(ctx, rhs)?;
                self.eval_binary(*op, left, right)
            }
            Expr::Assignment {
                context: None,
                name,
                value,
            } => {
                let val = self.eval_expr(ctx, value)?;
                ctx.assign(name, val.clone())?;
                Ok(val)
            }
            Expr::Assignment {
                context: Some(target),
                name,
                value,
            } => {
                let obj = self.eval_expr(ctx, target)?;
                let val = self.eval_expr(ctx, value)?;
                self.assign_field(ctx, &obj, name, val)
            }
            Expr::Invocation(target, args) => {
                if let Expr::Context(obj_expr, field) = target.as_ref() {
                    let obj = self.eval_expr(ctx, obj_expr)?;
                    let mut arg_vals = Vec::with_capacity(args.len());
                    for a in args {
                        arg_vals.push(self.eval_expr(ctx, a)?);
                    }
                    return self.invoke_member(ctx, obj, field, arg_vals);
                }
                let callee = self.eval_expr(ctx, target)?;
                let mut arg_vals = Vec::with_capacity(args.len());
                for a in args {
                    arg_vals.push(self.eval_expr(ctx, a)?);
                }
                self.invoke_value(&callee, arg_vals)
            }
            Expr::Context(target, field) => {
                let obj = self.eval_expr(ctx, target)?;
                self.eval_member(ctx, &obj, field)
            }
            Expr::TypeCast(inner, contract) => self.eval_cast(ctx, inner, contract),
            Expr::TypeCheck(inner, contract) => {
                let value = self.eval_expr(ctx, inner)?;
                let target = types::from_contract(contract, ctx);
                Ok(Value::boolean(target.accepts(&value.ty, ctx)))
            }
            Expr::IfElse {
                condition,
                if_branch,
                if_result,
                else_branch,
                else_result,
            } => {
                let cond = self.eval_expr(ctx, condition)?;
                let Payload::Bool(chosen) = cond.payload else {
                    return Err(EvalError::Error(format!(
                        "if condition must be a Boolean, got {}",
                        cond.ty.name()
                    )));
                };
                let (branch, result) = if chosen {
                    (if_branch, if_result)
                } else {
                    (else_branch, else_result)
                };
                let scope = ctx.enter_scope("if");
                for stmt in branch {
                    self.exec_stmt(&scope, stmt)?;
                }
                self.eval_expr(&scope, result)
            }
            Expr::FuncDef {
                params,
                return_type,
                body,
            } => self.eval_func_def(ctx, params, return_type, body),
            Expr::Access(target, index) => {
                let target = self.eval_expr(ctx, target)?;
                let index = self.eval_expr(ctx, index)?;
                self.eval_access(&target, &index)
            }
            Expr::Collection(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for e in elems {
                    values.push(self.eval_expr(ctx, e)?);
                }
                let elem_ty = common_type(&values);
                Ok(Value {
                    ty: Rc::new(Type::Collection(elem_ty)),
                    payload: Payload::Collection(values),
                })
            }
            Expr::Map(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for entry in entries {
                    let key = self.eval_expr(ctx, &entry.key)?;
                    let value = self.eval_expr(ctx, &entry.value)?;
                    pairs.push((key, value));
                }
                let keys: Vec<Value> = pairs.iter().map(|(k, _)| k.clone()).collect();
                let values: Vec<Value> = pairs.iter().map(|(_, v)| v.clone()).collect();
                Ok(Value {
                    ty: Rc::new(Type::Map(common_type(&keys), common_type(&values))),
                    payload: Payload::Map(pairs),
                })
            }
        }
    }

    fn eval_logical(
        &self,
        ctx: &Context,
        lhs: &Expr,
        rhs: &Expr,
        is_and: bool,
    ) -> Result<Value, EvalError> {
        let op_name = if is_and { "and" } else { "or" };
        let left = self.eval_expr(ctx, lhs)?;
        let Payload::Bool(lb) = left.payload else {
            return Err(EvalError::Error(format!(
                "Operator '{}' requires Boolean operands, got {}",
                op_name,
                left.ty.name()
            )));
        };
        // Short-circuit
        if is_and && !lb {
            return Ok(Value::boolean(false));
        }
        if !is_and && lb {
            return Ok(Value::boolean(true));
        }
        let right = self.eval_expr(ctx, rhs)?;
        let Payload::Bool(rb) = right.payload else {
            return Err(EvalError::Error(format!(
                "Operator '{}' requires Boolean operands, got {}",
                op_name,
                right.ty.name()
            )));
        };
        Ok(Value::boolean(rb))
    }

    fn eval_func_def(
        &self,
        ctx: &Context,
        params: &[crate::ast::Parameter],
        return_type: &Option<TypeContract>,
        body: &Rc<crate::ast::Stmt>,
    ) -> Result<Value, EvalError> {
        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(params.len());
        for p in params {
            if !seen.insert(p.name.clone()) {
                return Err(EvalError::Error(format!(
                    "Duplicate parameter name '{}'",
                    p.name
                )));
            }
            let ty = match &p.contract {
                Some(contract) => types::from_contract(contract, ctx),
                None => types::any(),
            };
            parameters.push(Param {
                name: p.name.clone(),
                ty,
            });
        }
        let return_type = match return_type {
            Some(contract) => types::from_contract(contract, ctx),
            None => types::any(),
        };
        Ok(Value::function(FunctionValue {
            name: RefCell::new(None),
            signature: Signature {
                parameters,
                return_type,
            },
            body: FunctionBody::Ast(Rc::clone(body)),
            closure: ctx.clone(),
        }))
    }

    fn eval_cast(
        &self,
        ctx: &Context,
        inner: &Expr,
        contract: &TypeContract,
    ) -> Result<Value, EvalError> {
        let value = self.eval_expr(ctx, inner)?;
        let target = types::from_contract(contract, ctx);
        // Numeric payload conversion comes before structural acceptance.
        match (&*target, &value.payload) {
            (Type::Empty(name), Payload::Int(i)) if name == "Float" => {
                return Ok(Value::float(*i as f64));
            }
            (Type::Empty(name), Payload::Float(f)) if name == "Int" => {
                return Ok(Value::int(*f as i64));
            }
            _ => {}
        }
        if target.accepts(&value.ty, ctx) {
            Ok(Value {
                ty: target,
                payload: value.payload,
            })
        } else {
            Err(EvalError::Error(format!(
                "Cannot cast {} to {}",
                value.ty.name(),
                target.name()
            )))
        }
    }

    fn eval_access(&self, target: &Value, index: &Value) -> Result<Value, EvalError> {
        match &target.payload {
            Payload::Collection(items) => {
                let Payload::Int(i) = index.payload else {
                    return Err(EvalError::Error(format!(
                        "Collection index must be an Int, got {}",
                        index.ty.name()
                    )));
                };
                if i < 0 || i as usize >= items.len() {
                    return Err(EvalError::Error(format!(
                        "Index {} out of bounds for collection of length {}",
                        i,
                        items.len()
                    )));
                }
                Ok(items[i as usize].clone())
            }
            Payload::Map(entries) => entries
                .iter()
                .find(|(k, _)| k == index)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| {
                    EvalError::Error(format!("Key {} not found in map", repr(index)))
                }),
            _ => Err(EvalError::Error(format!(
                "Cannot index value of type {}",
                target.ty.name()
            ))),
        }
    }

    /// Dotted field access without invocation: a struct-instance field,
    /// else an extension value, else a receiver-style function in scope.
    fn eval_member(&self, ctx: &Context, obj: &Value, field: &str) -> Result<Value, EvalError> {
        if let Payload::Instance(fields) = &obj.payload {
            if let Some((_, v)) = fields.borrow().iter().find(|(k, _)| k == field) {
                return Ok(v.clone());
            }
        }
        if let Some(ext) = ctx.find_extension(&obj.ty, field) {
            return Ok(ext);
        }
        if let Some(candidate) = ctx.lookup(field) {
            if is_receiver_fn(&candidate, obj, ctx) {
                return Ok(candidate);
            }
        }
        Err(EvalError::Error(format!(
            "Unknown member '{}' on {}",
            field,
            obj.ty.name()
        )))
    }

    /// Method-style dispatch for `x.f(args)`: (a) a callable property of
    /// the instance, (b) an extension registered for `x`'s type, (c) a
    /// context function whose first parameter is `this` and accepts `x`'s
    /// type — for all three the receiver is prepended when the callee's
    /// first parameter is named `this`.
    fn invoke_member(
        &self,
        ctx: &Context,
        obj: Value,
        field: &str,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        if let Payload::Instance(fields) = &obj.payload {
            let member = fields
                .borrow()
                .iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.clone());
            if let Some(member) = member {
                if let Payload::Function(func) = &member.payload {
                    let args = prepend_receiver(func, obj, args);
                    return self.call_function(func, args);
                }
                return Err(EvalError::Error(format!(
                    "Cannot invoke '{}' of type {}",
                    field,
                    member.ty.name()
                )));
            }
        }
        if let Some(ext) = ctx.find_extension(&obj.ty, field) {
            if let Payload::Function(func) = &ext.payload {
                let args = prepend_receiver(func, obj, args);
                return self.call_function(func, args);
            }
            return Err(EvalError::Error(format!(
                "Cannot invoke '{}' of type {}",
                field,
                ext.ty.name()
            )));
        }
        if let Some(candidate) = ctx.lookup(field) {
            if is_receiver_fn(&candidate, &obj, ctx) {
                if let Payload::Function(func) = &candidate.payload {
                    let args = prepend_receiver(func, obj, args);
                    return self.call_function(func, args);
                }
            }
        }
        Err(EvalError::Error(format!(
            "Unknown member '{}' on {}",
            field,
            obj.ty.name()
        )))
    }

    pub(super) fn invoke_value(
        &self,
        callee: &Value,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        match &callee.payload {
            Payload::Function(func) => self.call_function(func, args),
            _ => Err(EvalError::Error(format!(
                "Cannot invoke value of type {}",
                callee.ty.name()
            ))),
        }
    }

    /// Invoke a function value: arity check, fresh child scope of the
    /// defining scope, per-argument acceptance checks, parameter binding,
    /// receiver binding, body execution, return-type check. The `return`
    /// signal is caught here and only here.
    pub fn call_function(
        &self,
        func: &Rc<FunctionValue>,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let sig = &func.signature;
        if args.len() != sig.parameters.len() {
            return Err(EvalError::ArityMismatch {
                name: func.display_name(),
                expected: sig.parameters.len(),
                received: args.len(),
            });
        }

        let scope = func.closure.enter_scope(func.display());
        for (i, (param, arg)) in sig.parameters.iter().zip(args.into_iter()).enumerate() {
            if !param.ty.accepts(&arg.ty, &scope) {
                return Err(EvalError::ParameterTypeMismatch {
                    name: param.name.clone(),
                    expected: param.ty.name(),
                    got: arg.ty.name(),
                });
            }
            if i == 0 && param.name == "this" {
                scope.set_receiver(Some(arg.clone()));
            }
            scope.define_parameter(param.name.clone(), arg);
        }

        let result = match &func.body {
            FunctionBody::Ast(stmt) => self.exec_stmt(&scope, stmt),
            FunctionBody::Native(native) => native(&scope),
        };

        let value = match result {
            Ok(v) => v,
            Err(EvalError::Return(v)) => *v,
            Err(e) => return Err(e),
        };

        if !sig.return_type.accepts(&value.ty, &scope) {
            return Err(EvalError::ReturnTypeMismatch {
                name: func.display_name(),
                expected: sig.return_type.name(),
                got: value.ty.name(),
            });
        }
        Ok(value)
    }

    fn assign_field(
        &self,
        ctx: &Context,
        obj: &Value,
        field: &str,
        value: Value,
    ) -> Result<Value, EvalError> {
        let Payload::Instance(fields) = &obj.payload else {
            return Err(EvalError::Error(format!(
                "Cannot assign field '{}' on value of type {}",
                field,
                obj.ty.name()
            )));
        };
        if let Type::Struct(st) = &*obj.ty {
            let property = st.get_property(field).ok_or_else(|| {
                EvalError::Error(format!("Unknown field '{}' on {}", field, st.name))
            })?;
            if !property.ty.accepts(&value.ty, ctx) {
                return Err(EvalError::AssignmentTypeMismatch {
                    name: field.to_string(),
                    expected: property.ty.name(),
                    got: value.ty.name(),
                });
            }
        }
        let mut fields = fields.borrow_mut();
        match fields.iter_mut().find(|(k, _)| k == field) {
            Some((_, slot)) => {
                *slot = value.clone();
                Ok(value)
            }
            None => Err(EvalError::Error(format!(
                "Unknown field '{}' on {}",
                field,
                obj.ty.name()
            ))),
        }
    }
}

fn is_receiver_fn(candidate: &Value, obj: &Value, ctx: &Context) -> bool {
    let Payload::Function(func) = &candidate.payload else {
        return false;
    };
    match func.signature.parameters.first() {
        Some(first) => first.name == "this" && first.ty.accepts(&obj.ty, ctx),
        None => false,
    }
}

fn prepend_receiver(func: &Rc<FunctionValue>, obj: Value, mut args: Vec<Value>) -> Vec<Value> {
    let takes_this = func
        .signature
        .parameters
        .first()
        .map(|p| p.name == "this")
        .unwrap_or(false);
    if takes_this {
        args.insert(0, obj);
    }
    args
}

/// The common element type of a literal: all equal → that type, else `Any`.
fn common_type(values: &[Value]) -> Rc<Type> {
    match values.first() {
        None => types::any(),
        Some(first) => {
            if values.iter().all(|v| *v.ty == *first.ty) {
                first.ty.clone()
            } else {
                types::any()
            }
        }
    }
}
