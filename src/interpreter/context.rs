/// Lexically-nested scopes.
///
/// A `Context` is a cheap handle onto a scope record; entering a scope
/// returns a child handle, dropping it exits. Variables, parameters and
/// types live in separate namespaces; lookups walk parent links.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::types::Type;
use crate::value::{EvalError, Value};

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub mutable: bool,
    pub declared_type: Rc<Type>,
    pub value: Value,
}

/// A value registered against a specific type and member name, consulted
/// during `Defined` acceptance and dotted dispatch.
#[derive(Debug, Clone)]
pub struct Extension {
    pub target: Rc<Type>,
    pub name: String,
    pub value: Value,
}

struct Scope {
    label: String,
    parent: Option<Context>,
    variables: HashMap<String, Variable>,
    /// Function parameters — a namespace distinct from locals.
    parameters: HashMap<String, Value>,
    types: HashMap<String, Rc<Type>>,
    extensions: Vec<Extension>,
    /// Bound only for function-body scopes whose first parameter is `this`.
    receiver: Option<Value>,
}

#[derive(Clone)]
pub struct Context {
    scope: Rc<RefCell<Scope>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<scope {}>", self.scope.borrow().label)
    }
}

impl Context {
    pub fn root() -> Context {
        Context {
            scope: Rc::new(RefCell::new(Scope {
                label: "<root>".to_string(),
                parent: None,
                variables: HashMap::new(),
                parameters: HashMap::new(),
                types: HashMap::new(),
                extensions: Vec::new(),
                receiver: None,
            })),
        }
    }

    pub fn enter_scope(&self, label: impl Into<String>) -> Context {
        Context {
            scope: Rc::new(RefCell::new(Scope {
                label: label.into(),
                parent: Some(self.clone()),
                variables: HashMap::new(),
                parameters: HashMap::new(),
                types: HashMap::new(),
                extensions: Vec::new(),
                receiver: None,
            })),
        }
    }

    pub fn label(&self) -> String {
        self.scope.borrow().label.clone()
    }

    // -----------------------------------------------------------------------
    // Variables
    // -----------------------------------------------------------------------

    pub fn define_variable(&self, var: Variable) {
        self.scope
            .borrow_mut()
            .variables
            .insert(var.name.clone(), var);
    }

    pub fn find_variable(&self, name: &str) -> Option<Variable> {
        let scope = self.scope.borrow();
        if let Some(var) = scope.variables.get(name) {
            return Some(var.clone());
        }
        scope.parent.as_ref().and_then(|p| p.find_variable(name))
    }

    /// Resolve a name to a value: parameters shadow variables, inner scopes
    /// shadow outer ones.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        if let Some(val) = scope.parameters.get(name) {
            return Some(val.clone());
        }
        if let Some(var) = scope.variables.get(name) {
            return Some(var.value.clone());
        }
        scope.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Reassign an existing variable, enforcing mutability and the declared
    /// type.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let var = self
            .find_variable(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))?;
        if !var.mutable {
            return Err(EvalError::ImmutableAssignment(name.to_string()));
        }
        if !var.declared_type.accepts(&value.ty, self) {
            return Err(EvalError::AssignmentTypeMismatch {
                name: name.to_string(),
                expected: var.declared_type.name(),
                got: value.ty.name(),
            });
        }
        self.set_variable_value(name, value);
        Ok(())
    }

    fn set_variable_value(&self, name: &str, value: Value) {
        let mut scope = self.scope.borrow_mut();
        if let Some(var) = scope.variables.get_mut(name) {
            var.value = value;
            return;
        }
        let parent = scope.parent.clone();
        drop(scope);
        if let Some(parent) = parent {
            parent.set_variable_value(name, value);
        }
    }

    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    pub fn define_parameter(&self, name: impl Into<String>, value: Value) {
        self.scope
            .borrow_mut()
            .parameters
            .insert(name.into(), value);
    }

    pub fn find_parameter(&self, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        if let Some(val) = scope.parameters.get(name) {
            return Some(val.clone());
        }
        scope.parent.as_ref().and_then(|p| p.find_parameter(name))
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    pub fn define_type(&self, name: impl Into<String>, ty: Rc<Type>) {
        self.scope.borrow_mut().types.insert(name.into(), ty);
    }

    pub fn find_type(&self, name: &str) -> Option<Rc<Type>> {
        let scope = self.scope.borrow();
        if let Some(ty) = scope.types.get(name) {
            return Some(ty.clone());
        }
        scope.parent.as_ref().and_then(|p| p.find_type(name))
    }

    // -----------------------------------------------------------------------
    // Extensions
    // -----------------------------------------------------------------------

    pub fn register_extension(&self, ext: Extension) {
        self.scope.borrow_mut().extensions.push(ext);
    }

    /// Find an extension named `name` whose registered type accepts
    /// `value_ty`, walking outward.
    pub fn find_extension(&self, value_ty: &Type, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        for ext in &scope.extensions {
            if ext.name == name && ext.target.accepts(value_ty, self) {
                return Some(ext.value.clone());
            }
        }
        scope
            .parent
            .as_ref()
            .and_then(|p| p.find_extension(value_ty, name))
    }

    // -----------------------------------------------------------------------
    // Receiver
    // -----------------------------------------------------------------------

    pub fn set_receiver(&self, value: Option<Value>) {
        self.scope.borrow_mut().receiver = value;
    }

    pub fn receiver(&self) -> Option<Value> {
        self.scope.borrow().receiver.clone()
    }
}
