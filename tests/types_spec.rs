/// Spec tests for the Opal type lattice.
///
/// `accepts` is exercised directly on hand-built types; a fresh interpreter
/// provides the context (type registry + extension registry) the relation
/// consults.
use std::rc::Rc;

use opal::interpreter::Interpreter;
use opal::types::{self, Param, Property, Signature, StructType, Type};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn struct_of(name: &str, fields: &[(&str, Rc<Type>)]) -> Rc<Type> {
    let properties = fields
        .iter()
        .map(|(field, ty)| Property {
            name: field.to_string(),
            ty: ty.clone(),
            default: None,
        })
        .collect();
    Rc::new(Type::Struct(StructType::new(name, properties)))
}

fn fn_of(params: &[Rc<Type>], ret: Rc<Type>) -> Rc<Type> {
    let parameters = params
        .iter()
        .enumerate()
        .map(|(i, ty)| Param {
            name: format!("arg{}", i),
            ty: ty.clone(),
        })
        .collect();
    Rc::new(Type::Function(Signature {
        parameters,
        return_type: ret,
    }))
}

fn defined_of(parts: &[(&str, Rc<Type>)]) -> Rc<Type> {
    Rc::new(Type::Defined {
        name: String::new(),
        parts: parts
            .iter()
            .map(|(field, ty)| (field.to_string(), ty.clone()))
            .collect(),
    })
}

fn concrete_samples() -> Vec<Rc<Type>> {
    vec![
        types::any(),
        types::int(),
        types::float(),
        types::string(),
        types::boolean(),
        types::unit(),
        Rc::new(Type::Collection(types::int())),
        Rc::new(Type::Map(types::string(), types::int())),
        fn_of(&[types::int()], types::int()),
        struct_of("Point", &[("x", types::int()), ("y", types::int())]),
    ]
}

// ---------------------------------------------------------------------------
// Lattice laws
// ---------------------------------------------------------------------------

#[test]
fn accepts_is_reflexive_on_concrete_types() {
    let interp = Interpreter::empty();
    for ty in concrete_samples() {
        assert!(
            ty.accepts(&ty, interp.root()),
            "{} should accept itself",
            ty.name()
        );
    }
}

#[test]
fn any_is_the_top_element() {
    let interp = Interpreter::empty();
    let any = types::any();
    for ty in concrete_samples() {
        assert!(any.accepts(&ty, interp.root()), "Any should accept {}", ty.name());
    }
}

#[test]
fn nominal_acceptance_is_by_name() {
    let interp = Interpreter::empty();
    assert!(types::int().accepts(&types::int(), interp.root()));
    assert!(!types::int().accepts(&types::string(), interp.root()));
    // A nominal type never accepts a structural one
    let point = struct_of("Point", &[("x", types::int())]);
    assert!(!types::int().accepts(&point, interp.root()));
}

#[test]
fn union_introduction() {
    let interp = Interpreter::empty();
    let root = interp.root();
    // A.accepts(X) implies Union(A, B).accepts(X), in either position
    let union = Rc::new(Type::Union(types::int(), types::string()));
    assert!(union.accepts(&types::int(), root));
    assert!(union.accepts(&types::string(), root));
    assert!(!union.accepts(&types::boolean(), root));
}

#[test]
fn intersection_elimination() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let both = Rc::new(Type::Intersection(types::any(), types::int()));
    assert!(both.accepts(&types::int(), root));
    // Intersection(A, B).accepts(X) implies both accept X
    assert!(types::any().accepts(&types::int(), root));
    assert!(types::int().accepts(&types::int(), root));

    let neither = Rc::new(Type::Intersection(types::int(), types::string()));
    assert!(!neither.accepts(&types::int(), root));
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[test]
fn struct_width_subtyping() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let named = struct_of("Named", &[("name", types::string())]);
    let person = struct_of(
        "Person",
        &[("name", types::string()), ("age", types::int())],
    );
    // Extra properties on `other` preserve acceptance
    assert!(named.accepts(&person, root));
    assert!(!person.accepts(&named, root));
}

#[test]
fn struct_property_types_must_be_accepted() {
    let interp = Interpreter::empty();
    let a = struct_of("A", &[("x", types::int())]);
    let b = struct_of("B", &[("x", types::string())]);
    assert!(!a.accepts(&b, interp.root()));
}

#[test]
fn struct_property_positions_follow_declaration_order() {
    let point = StructType::new(
        "Point",
        vec![
            Property {
                name: "x".to_string(),
                ty: types::int(),
                default: None,
            },
            Property {
                name: "y".to_string(),
                ty: types::int(),
                default: None,
            },
        ],
    );
    assert_eq!(point.get_property("x").unwrap().name, "x");
    assert_eq!(point.get_property("y").unwrap().name, "y");
    assert!(point.get_property("z").is_none());
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[test]
fn function_acceptance_is_positional() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let f = fn_of(&[types::int(), types::int()], types::int());
    let same = fn_of(&[types::int(), types::int()], types::int());
    assert!(f.accepts(&same, root));

    let fewer = fn_of(&[types::int()], types::int());
    assert!(!f.accepts(&fewer, root));

    let wrong_ret = fn_of(&[types::int(), types::int()], types::string());
    assert!(!f.accepts(&wrong_ret, root));
}

#[test]
fn function_return_type_is_covariant() {
    let interp = Interpreter::empty();
    let loose = fn_of(&[types::int()], types::any());
    let tight = fn_of(&[types::int()], types::int());
    assert!(loose.accepts(&tight, interp.root()));
    assert!(!tight.accepts(&loose, interp.root()));
}

// ---------------------------------------------------------------------------
// Collections and maps
// ---------------------------------------------------------------------------

#[test]
fn collection_acceptance_follows_the_element() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let ints = Rc::new(Type::Collection(types::int()));
    let anys = Rc::new(Type::Collection(types::any()));
    assert!(anys.accepts(&ints, root));
    assert!(!ints.accepts(&anys, root));
    assert!(!ints.accepts(&types::int(), root));
}

#[test]
fn map_acceptance_follows_key_and_value() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let m = Rc::new(Type::Map(types::string(), types::int()));
    assert!(m.accepts(&Rc::new(Type::Map(types::string(), types::int())), root));
    assert!(!m.accepts(&Rc::new(Type::Map(types::int(), types::int())), root));
}

// ---------------------------------------------------------------------------
// Defined shapes
// ---------------------------------------------------------------------------

#[test]
fn defined_accepts_structs_with_matching_fields() {
    let interp = Interpreter::empty();
    let root = interp.root();
    let named = defined_of(&[("name", types::string())]);
    let person = struct_of(
        "Person",
        &[("name", types::string()), ("age", types::int())],
    );
    assert!(named.accepts(&person, root));

    let anonymous = struct_of("Anon", &[("age", types::int())]);
    assert!(!named.accepts(&anonymous, root));
}

// ---------------------------------------------------------------------------
// Contract resolution
// ---------------------------------------------------------------------------

#[test]
fn unknown_type_names_degrade_to_nominal_placeholders() {
    use opal::ast::TypeContract;
    let interp = Interpreter::empty();
    let root = interp.root();
    let ghost = types::from_contract(&TypeContract::Elementary("Ghost".to_string()), root);
    assert_eq!(ghost.name(), "Ghost");
    // The placeholder accepts nothing but its own name
    assert!(!ghost.accepts(&types::int(), root));
    assert!(ghost.accepts(&Rc::new(Type::Empty("Ghost".to_string())), root));
}

#[test]
fn contracts_resolve_through_the_registry() {
    use opal::ast::TypeContract;
    let interp = Interpreter::empty();
    let root = interp.root();
    let resolved = types::from_contract(&TypeContract::Elementary("Int".to_string()), root);
    assert_eq!(resolved.name(), "Int");
    assert!(resolved.accepts(&types::int(), root));
}
