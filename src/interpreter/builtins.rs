/// Root-context built-ins: the primitive type registry, the `out` channel,
/// and the receiver-style core functions.
use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::types::{self, Param, Signature, Type};
use crate::value::{repr, FunctionBody, FunctionValue, NativeFn, Payload};

pub fn init(ctx: &Context) {
    ctx.define_type("Any", types::any());
    ctx.define_type("Unit", types::unit());
    ctx.define_type("Int", types::int());
    ctx.define_type("Float", types::float());
    ctx.define_type("Boolean", types::boolean());
    ctx.define_type("String", types::string());
    ctx.define_type("Char", types::char());
    ctx.define_type("Output", types::output());

    ctx.define_variable(Variable {
        name: "out".to_string(),
        mutable: false,
        declared_type: types::output(),
        value: Value::output(),
    });

    // plus(this: String, other: Any) -> String — stringifies `other`
    define_fn(
        ctx,
        "plus",
        vec![("this", types::string()), ("other", types::any())],
        types::string(),
        Rc::new(|scope: &Context| {
            let this = parameter(scope, "this")?;
            let other = parameter(scope, "other")?;
            let Payload::Str(s) = &this.payload else {
                return Err(EvalError::Error(
                    "plus: receiver must be a String".to_string(),
                ));
            };
            Ok(Value::string(format!("{}{}", s, repr(&other))))
        }),
    );

    // write(this: Output, value: Any) -> Unit
    define_fn(
        ctx,
        "write",
        vec![("this", types::output()), ("value", types::any())],
        types::unit(),
        Rc::new(|scope: &Context| {
            let value = parameter(scope, "value")?;
            print!("{}", repr(&value));
            Ok(Value::unit())
        }),
    );

    // equals(this: Any, other: Any) -> Boolean — structural equality
    define_fn(
        ctx,
        "equals",
        vec![("this", types::any()), ("other", types::any())],
        types::boolean(),
        Rc::new(|scope: &Context| {
            let this = parameter(scope, "this")?;
            let other = parameter(scope, "other")?;
            Ok(Value::boolean(this == other))
        }),
    );
}

/// Int methods, registered as extensions so `1.add(2)` dispatches without
/// colliding with the polymorphic `equals` above.
pub fn init_ints(ctx: &Context) {
    int_extension(ctx, "add", types::int(), |x, y| Ok(Value::int(x + y)));
    int_extension(ctx, "minus", types::int(), |x, y| Ok(Value::int(x - y)));
    int_extension(ctx, "times", types::int(), |x, y| Ok(Value::int(x * y)));
    int_extension(ctx, "divide", types::int(), |x, y| {
        if y == 0 {
            Err(EvalError::Error("Division by zero".to_string()))
        } else {
            Ok(Value::int(x / y))
        }
    });
    int_extension(ctx, "equals", types::boolean(), |x, y| {
        Ok(Value::boolean(x == y))
    });
}

fn int_extension(
    ctx: &Context,
    name: &str,
    return_type: Rc<Type>,
    op: fn(i64, i64) -> Result<Value, EvalError>,
) {
    let native: NativeFn = Rc::new(move |scope: &Context| {
        let this = parameter(scope, "this")?;
        let other = parameter(scope, "other")?;
        let (Payload::Int(x), Payload::Int(y)) = (&this.payload, &other.payload) else {
            return Err(EvalError::Error(
                "Int method arguments must be Ints".to_string(),
            ));
        };
        op(*x, *y)
    });
    let value = function_value(
        ctx,
        name,
        vec![("this", types::int()), ("other", types::int())],
        return_type,
        native,
    );
    ctx.register_extension(Extension {
        target: types::int(),
        name: name.to_string(),
        value,
    });
}

fn function_value(
    ctx: &Context,
    name: &str,
    params: Vec<(&str, Rc<Type>)>,
    return_type: Rc<Type>,
    native: NativeFn,
) -> Value {
    let parameters = params
        .into_iter()
        .map(|(pname, ty)| Param {
            name: pname.to_string(),
            ty,
        })
        .collect();
    Value::function(FunctionValue {
        name: RefCell::new(Some(name.to_string())),
        signature: Signature {
            parameters,
            return_type,
        },
        body: FunctionBody::Native(native),
        closure: ctx.clone(),
    })
}

fn define_fn(
    ctx: &Context,
    name: &str,
    params: Vec<(&str, Rc<Type>)>,
    return_type: Rc<Type>,
    native: NativeFn,
) {
    let value = function_value(ctx, name, params, return_type, native);
    ctx.define_variable(Variable {
        name: name.to_string(),
        mutable: false,
        declared_type: value.ty.clone(),
        value,
    });
}

fn parameter(scope: &Context, name: &str) -> Result<Value, EvalError> {
    scope
        .find_parameter(name)
        .ok_or_else(|| EvalError::Error(format!("Missing parameter '{}'", name)))
}
