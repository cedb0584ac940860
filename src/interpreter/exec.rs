use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::ast::{FieldDef, Stmt, TypeContract};
use crate::types::{self, Param, Property, Signature, StructType, Type};
use crate::value::{FunctionBody, FunctionValue, NativeFn, Payload};

impl Interpreter {
    pub fn exec_stmt(&self, ctx: &Context, stmt: &Stmt) -> Result<Value, EvalError> {
        match stmt {
            Stmt::Expression(expr) => self.eval_expr(ctx, expr),
            Stmt::Declaration {
                mutable,
                name,
                declared_type,
                value,
            } => {
                let val = self.eval_expr(ctx, value)?;
                christen(&val, name);
                let declared = match declared_type {
                    Some(contract) => types::from_contract(contract, ctx),
                    None => val.ty.clone(),
                };
                if !declared.accepts(&val.ty, ctx) {
                    return Err(EvalError::AssignmentTypeMismatch {
                        name: name.clone(),
                        expected: declared.name(),
                        got: val.ty.name(),
                    });
                }
                ctx.define_variable(Variable {
                    name: name.clone(),
                    mutable: *mutable,
                    declared_type: declared,
                    value: val,
                });
                Ok(Value::unit())
            }
            Stmt::Block(stmts) => {
                let scope = ctx.enter_scope("block");
                let mut last = Value::unit();
                for s in stmts {
                    last = self.exec_stmt(&scope, s)?;
                }
                Ok(last)
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(ctx, e)?,
                    None => Value::unit(),
                };
                Err(EvalError::Return(Box::new(value)))
            }
            Stmt::StructDef { name, fields } => self.exec_struct_def(ctx, name, fields),
            Stmt::TypeDef { name, contract } => self.exec_type_def(ctx, name, contract),
            Stmt::Extend { target, members } => self.exec_extend(ctx, target, members),
        }
    }

    /// Register a struct type and its constructor. The constructor takes
    /// every field without a default, in declaration order.
    fn exec_struct_def(
        &self,
        ctx: &Context,
        name: &str,
        fields: &[FieldDef],
    ) -> Result<Value, EvalError> {
        let mut properties = Vec::with_capacity(fields.len());
        for field in fields {
            let ty = types::from_contract(&field.contract, ctx);
            let default = match &field.default {
                Some(expr) => {
                    let val = self.eval_expr(ctx, expr)?;
                    if !ty.accepts(&val.ty, ctx) {
                        return Err(EvalError::AssignmentTypeMismatch {
                            name: field.name.clone(),
                            expected: ty.name(),
                            got: val.ty.name(),
                        });
                    }
                    Some(val)
                }
                None => None,
            };
            properties.push(Property {
                name: field.name.clone(),
                ty,
                default,
            });
        }

        let struct_ty = Rc::new(Type::Struct(StructType::new(name, properties.clone())));

        let parameters: Vec<Param> = properties
            .iter()
            .filter(|p| p.default.is_none())
            .map(|p| Param {
                name: p.name.clone(),
                ty: p.ty.clone(),
            })
            .collect();
        let instance_ty = struct_ty.clone();
        let native: NativeFn = Rc::new(move |scope: &Context| {
            let Type::Struct(st) = &*instance_ty else {
                unreachable!();
            };
            let mut values = Vec::with_capacity(st.properties.len());
            for p in &st.properties {
                let value = match &p.default {
                    Some(default) => default.clone(),
                    None => scope.find_parameter(&p.name).ok_or_else(|| {
                        EvalError::Error(format!("Missing constructor argument '{}'", p.name))
                    })?,
                };
                values.push((p.name.clone(), value));
            }
            Ok(Value {
                ty: instance_ty.clone(),
                payload: Payload::Instance(Rc::new(RefCell::new(values))),
            })
        });
        let constructor = Value::function(FunctionValue {
            name: RefCell::new(Some(name.to_string())),
            signature: Signature {
                parameters,
                return_type: struct_ty.clone(),
            },
            body: FunctionBody::Native(native),
            closure: ctx.clone(),
        });

        if let Type::Struct(st) = &*struct_ty {
            *st.constructor.borrow_mut() = Some(constructor.clone());
        }
        ctx.define_type(name, struct_ty);
        ctx.define_variable(Variable {
            name: name.to_string(),
            mutable: false,
            declared_type: constructor.ty.clone(),
            value: constructor,
        });
        Ok(Value::unit())
    }

    fn exec_type_def(
        &self,
        ctx: &Context,
        name: &str,
        contract: &TypeContract,
    ) -> Result<Value, EvalError> {
        let resolved = types::from_contract(contract, ctx);
        let named = match &*resolved {
            Type::Defined { parts, .. } => Rc::new(Type::Defined {
                name: name.to_string(),
                parts: parts.clone(),
            }),
            _ => resolved,
        };
        ctx.define_type(name, named);
        Ok(Value::unit())
    }

    fn exec_extend(
        &self,
        ctx: &Context,
        target: &str,
        members: &[Stmt],
    ) -> Result<Value, EvalError> {
        let target_ty = ctx
            .find_type(target)
            .unwrap_or_else(|| Rc::new(Type::Empty(target.to_string())));
        for member in members {
            let Stmt::Declaration { name, value, .. } = member else {
                return Err(EvalError::Error(
                    "extend blocks may only contain declarations".to_string(),
                ));
            };
            let val = self.eval_expr(ctx, value)?;
            christen(&val, name);
            ctx.register_extension(Extension {
                target: target_ty.clone(),
                name: name.clone(),
                value: val,
            });
        }
        Ok(Value::unit())
    }
}

/// Name an anonymous function after the binding it lands in.
fn christen(val: &Value, name: &str) {
    if let Payload::Function(func) = &val.payload {
        let mut slot = func.name.borrow_mut();
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
    }
}
