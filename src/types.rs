/// Opal runtime type representation.
///
/// A single binary relation `accepts` defines the structural subtype
/// lattice; it is used uniformly for assignment, argument binding, return
/// checking and `is` tests. Types live behind `Rc` handles — variables and
/// registries store handles, never embedded copies, so identity stays
/// stable across scope walks and recursive definitions stay cheap.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{TypeContract, TypeOp};
use crate::interpreter::Context;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Nominal type with no structure; `Any` is the top element.
    Empty(String),
    Struct(StructType),
    Function(Signature),
    Union(Rc<Type>, Rc<Type>),
    Intersection(Rc<Type>, Rc<Type>),
    /// Structural shape: every named field must be satisfied by a struct
    /// property or a registered extension.
    Defined {
        name: String,
        parts: Vec<(String, Rc<Type>)>,
    },
    Collection(Rc<Type>),
    Map(Rc<Type>, Rc<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: Rc<Type>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: String,
    /// Preserves declaration order of properties...
    pub properties: Vec<Property>,
    /// ...while this keeps lookup constant.
    positions: HashMap<String, usize>,
    /// Filled in once the constructor function value exists.
    pub constructor: RefCell<Option<Value>>,
}

impl StructType {
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> StructType {
        let positions = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        StructType {
            name: name.into(),
            properties,
            positions,
            constructor: RefCell::new(None),
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.positions.get(name).map(|&i| &self.properties[i])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Rc<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub parameters: Vec<Param>,
    pub return_type: Rc<Type>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.ty.name()).collect();
        write!(f, "({}) => {}", params.join(", "), self.return_type.name())
    }
}

impl Type {
    pub fn name(&self) -> String {
        match self {
            Type::Empty(name) => name.clone(),
            Type::Struct(st) => st.name.clone(),
            Type::Function(sig) => sig.to_string(),
            Type::Union(a, b) => format!("{} | {}", a.name(), b.name()),
            Type::Intersection(a, b) => format!("{} & {}", a.name(), b.name()),
            Type::Defined { name, parts } => {
                if name.is_empty() {
                    let rendered: Vec<String> = parts
                        .iter()
                        .map(|(field, ty)| format!("{}: {}", field, ty.name()))
                        .collect();
                    format!("{{{}}}", rendered.join(", "))
                } else {
                    name.clone()
                }
            }
            Type::Collection(elem) => format!("[{}]", elem.name()),
            Type::Map(key, value) => format!("[{}: {}]", key.name(), value.name()),
        }
    }

    /// `self.accepts(other)` — can a value of type `other` be used where
    /// `self` is required?
    pub fn accepts(&self, other: &Type, ctx: &Context) -> bool {
        match self {
            Type::Empty(name) => {
                if name == "Any" {
                    return true;
                }
                match other {
                    Type::Empty(other_name) => name == other_name,
                    _ => false,
                }
            }
            Type::Struct(st) => {
                let Type::Struct(other_st) = other else {
                    return false;
                };
                // Must have all of the properties, with acceptable types.
                st.properties.iter().all(|p| {
                    other_st
                        .get_property(&p.name)
                        .map(|other_p| p.ty.accepts(&other_p.ty, ctx))
                        .unwrap_or(false)
                })
            }
            Type::Function(sig) => {
                let Type::Function(other_sig) = other else {
                    return false;
                };
                sig.parameters.len() == other_sig.parameters.len()
                    && sig
                        .parameters
                        .iter()
                        .zip(&other_sig.parameters)
                        .all(|(a, b)| a.ty.accepts(&b.ty, ctx))
                    && sig.return_type.accepts(&other_sig.return_type, ctx)
            }
            Type::Union(a, b) => a.accepts(other, ctx) || b.accepts(other, ctx),
            Type::Intersection(a, b) => a.accepts(other, ctx) && b.accepts(other, ctx),
            Type::Defined { parts, .. } => {
                for (field, part_ty) in parts {
                    if let Type::Struct(st) = other {
                        if let Some(p) = st.get_property(field) {
                            if part_ty.accepts(&p.ty, ctx) {
                                continue;
                            }
                        }
                    }
                    match ctx.find_extension(other, field) {
                        Some(ext) if part_ty.accepts(&ext.ty, ctx) => continue,
                        _ => return false,
                    }
                }
                true
            }
            Type::Collection(elem) => {
                let Type::Collection(other_elem) = other else {
                    return false;
                };
                elem.accepts(other_elem, ctx)
            }
            Type::Map(key, value) => {
                let Type::Map(other_key, other_value) = other else {
                    return false;
                };
                key.accepts(other_key, ctx) && value.accepts(other_value, ctx)
            }
        }
    }
}

/// Convert a parsed type contract to a runtime type. Elementary names
/// resolve through the context's type registry; an unknown name falls back
/// to a fresh nominal placeholder so forward references stay usable.
pub fn from_contract(contract: &TypeContract, ctx: &Context) -> Rc<Type> {
    match contract {
        TypeContract::Elementary(name) => ctx
            .find_type(name)
            .unwrap_or_else(|| Rc::new(Type::Empty(name.clone()))),
        TypeContract::Invocable(args, ret) => {
            let parameters = args
                .iter()
                .enumerate()
                .map(|(i, arg)| Param {
                    name: format!("arg{}", i),
                    ty: from_contract(arg, ctx),
                })
                .collect();
            Rc::new(Type::Function(Signature {
                parameters,
                return_type: from_contract(ret, ctx),
            }))
        }
        TypeContract::Collection(elem) => Rc::new(Type::Collection(from_contract(elem, ctx))),
        TypeContract::Map(key, value) => Rc::new(Type::Map(
            from_contract(key, ctx),
            from_contract(value, ctx),
        )),
        TypeContract::Binary(lhs, op, rhs) => {
            let a = from_contract(lhs, ctx);
            let b = from_contract(rhs, ctx);
            match op {
                TypeOp::And => Rc::new(Type::Intersection(a, b)),
                TypeOp::Or => Rc::new(Type::Union(a, b)),
            }
        }
        TypeContract::Defined(contract_parts) => {
            let parts = contract_parts
                .iter()
                .map(|(field, part)| (field.clone(), from_contract(part, ctx)))
                .collect();
            Rc::new(Type::Defined {
                name: String::new(),
                parts,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in type handles
// ---------------------------------------------------------------------------
// Nominal identity is by name, so handing out fresh handles is safe.

pub fn any() -> Rc<Type> {
    Rc::new(Type::Empty("Any".to_string()))
}

pub fn unit() -> Rc<Type> {
    Rc::new(Type::Empty("Unit".to_string()))
}

pub fn int() -> Rc<Type> {
    Rc::new(Type::Empty("Int".to_string()))
}

pub fn float() -> Rc<Type> {
    Rc::new(Type::Empty("Float".to_string()))
}

pub fn boolean() -> Rc<Type> {
    Rc::new(Type::Empty("Boolean".to_string()))
}

pub fn string() -> Rc<Type> {
    Rc::new(Type::Empty("String".to_string()))
}

pub fn char() -> Rc<Type> {
    Rc::new(Type::Empty("Char".to_string()))
}

pub fn output() -> Rc<Type> {
    Rc::new(Type::Empty("Output".to_string()))
}
