/// Spec tests for the Opal tree-walking evaluator.
///
/// Sources run through the full pipeline (lex → parse → exec in script
/// mode); each test asserts the collected expression results or the error
/// the evaluator unwound with.
use opal::interpreter::Interpreter;
use opal::lexer::Lexer;
use opal::parser::Parser;
use opal::value::{repr, EvalError, Payload, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run(src: &str) -> Vec<Value> {
    let tokens = Lexer::new(src).tokenize().expect("lex failed");
    let mut parser = Parser::new(tokens);
    let (stmts, errors) = parser.parse();
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    Interpreter::new(stmts).exec(true).expect("exec failed")
}

/// Evaluate a source and return the last collected expression result.
fn eval(src: &str) -> Value {
    run(src).pop().expect("no results")
}

fn eval_err(src: &str) -> EvalError {
    let tokens = Lexer::new(src).tokenize().expect("lex failed");
    let mut parser = Parser::new(tokens);
    let (stmts, errors) = parser.parse();
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    Interpreter::new(stmts)
        .exec(true)
        .expect_err("expected an eval error")
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn int_arithmetic() {
    assert_eq!(eval("2 + 3"), Value::int(5));
    assert_eq!(eval("10 - 4"), Value::int(6));
    assert_eq!(eval("3 * 4"), Value::int(12));
    assert_eq!(eval("10 / 2"), Value::int(5));
    assert_eq!(eval("7 % 3"), Value::int(1));
}

#[test]
fn precedence_is_respected() {
    assert_eq!(eval("2 + 3 * 4"), Value::int(14));
    assert_eq!(eval("(2 + 3) * 4"), Value::int(20));
}

#[test]
fn float_arithmetic() {
    assert_eq!(eval("1.5 + 2.25"), Value::float(3.75));
    assert_eq!(eval("5.0 - 1.5"), Value::float(3.5));
}

#[test]
fn mixed_numerics_promote_to_float() {
    assert_eq!(eval("1 + 2.0"), Value::float(3.0));
    assert_eq!(eval("2.0 * 3"), Value::float(6.0));
    assert_eq!(eval("1 / 2.0"), Value::float(0.5));
}

#[test]
fn division_by_zero_fails() {
    assert!(matches!(eval_err("1 / 0"), EvalError::Error(_)));
    assert!(matches!(eval_err("1 % 0"), EvalError::Error(_)));
}

#[test]
fn string_concatenation_stringifies_the_right_operand() {
    assert_eq!(eval("\"Hello \" + \"world\""), Value::string("Hello world"));
    assert_eq!(eval("\"n = \" + 42"), Value::string("n = 42"));
    assert_eq!(eval("\"b = \" + true"), Value::string("b = true"));
}

#[test]
fn unary_operators() {
    assert_eq!(eval("-5"), Value::int(-5));
    assert_eq!(eval("-2.5"), Value::float(-2.5));
    assert_eq!(eval("!true"), Value::boolean(false));
    assert_eq!(eval("!(1 == 2)"), Value::boolean(true));
}

// ---------------------------------------------------------------------------
// Comparison, equality, logic
// ---------------------------------------------------------------------------

#[test]
fn comparisons() {
    assert_eq!(eval("1 < 2"), Value::boolean(true));
    assert_eq!(eval("2 <= 2"), Value::boolean(true));
    assert_eq!(eval("3 > 4"), Value::boolean(false));
    assert_eq!(eval("1 < 1.5"), Value::boolean(true));
    assert_eq!(eval("\"abc\" < \"abd\""), Value::boolean(true));
}

#[test]
fn equality_is_structural() {
    assert_eq!(eval("1 == 1"), Value::boolean(true));
    assert_eq!(eval("1 != 2"), Value::boolean(true));
    assert_eq!(eval("\"a\" == \"a\""), Value::boolean(true));
    assert_eq!(eval("[1, 2] == [1, 2]"), Value::boolean(true));
    assert_eq!(eval("[1, 2] == [2, 1]"), Value::boolean(false));
}

#[test]
fn logic_short_circuits() {
    assert_eq!(eval("true and false"), Value::boolean(false));
    assert_eq!(eval("false or true"), Value::boolean(true));
    // The right operand would fail if evaluated
    assert_eq!(eval("false and 1 / 0 == 1"), Value::boolean(false));
    assert_eq!(eval("true or 1 / 0 == 1"), Value::boolean(true));
}

// ---------------------------------------------------------------------------
// Declarations, assignment, mutability
// ---------------------------------------------------------------------------

#[test]
fn declaration_and_lookup() {
    assert_eq!(eval("let x = 1 + 2; x"), Value::int(3));
}

#[test]
fn mutable_reassignment() {
    assert_eq!(eval("let mut x = 1; x = 5; x"), Value::int(5));
}

#[test]
fn immutable_reassignment_fails() {
    assert!(matches!(
        eval_err("let x = 1; x = 2"),
        EvalError::ImmutableAssignment(name) if name == "x"
    ));
}

#[test]
fn reassignment_must_satisfy_the_declared_type() {
    assert!(matches!(
        eval_err("let mut x: Int = 1; x = \"no\""),
        EvalError::AssignmentTypeMismatch { .. }
    ));
}

#[test]
fn declaration_must_satisfy_the_declared_type() {
    assert!(matches!(
        eval_err("let x: Int = \"no\""),
        EvalError::AssignmentTypeMismatch { .. }
    ));
}

#[test]
fn unknown_variable_fails() {
    assert!(matches!(
        eval_err("ghost"),
        EvalError::UnknownVariable(name) if name == "ghost"
    ));
}

#[test]
fn union_typed_variable_accepts_both_arms() {
    assert_eq!(
        eval("let mut x: Int | String = 1; x = \"two\"; x"),
        Value::string("two")
    );
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[test]
fn function_definition_and_call() {
    assert_eq!(
        eval("let f = (a: Int, b: Int) -> Int => a + b; f(2, 3)"),
        Value::int(5)
    );
}

#[test]
fn zero_arg_function() {
    assert_eq!(eval("let f = -> 42; f()"), Value::int(42));
}

#[test]
fn block_body_function_yields_its_last_statement() {
    assert_eq!(eval("let f = {\n    40 + 2\n}\nf()"), Value::int(42));
}

#[test]
fn early_return_unwinds_to_the_function_frame() {
    let src = "let f = (x: Int) -> Int {\n    return x * 2\n    x\n}\nf(5)";
    assert_eq!(eval(src), Value::int(10));
}

#[test]
fn body_without_value_yields_unit() {
    assert_eq!(eval("let f = (x: Int) -> Unit { return }; f(1)"), Value::unit());
}

#[test]
fn arity_mismatch() {
    assert!(matches!(
        eval_err("let f = (a: Int) -> Int => a; f(1, 2)"),
        EvalError::ArityMismatch {
            expected: 1,
            received: 2,
            ..
        }
    ));
}

#[test]
fn parameter_type_mismatch() {
    assert!(matches!(
        eval_err("let f = (a: Int) -> Int => a; f(\"one\")"),
        EvalError::ParameterTypeMismatch { .. }
    ));
}

#[test]
fn return_type_mismatch() {
    assert!(matches!(
        eval_err("let f = (a: Int) -> String => a; f(1)"),
        EvalError::ReturnTypeMismatch { .. }
    ));
}

#[test]
fn duplicate_parameter_names_fail() {
    assert!(matches!(
        eval_err("let f = (a: Int, a: Int) -> Int => a"),
        EvalError::Error(_)
    ));
}

#[test]
fn closures_capture_their_defining_scope() {
    let src = "let make = (n: Int) -> Any => (m: Int) -> Int => n + m\nlet add2 = make(2)\nadd2(3)";
    assert_eq!(eval(src), Value::int(5));
}

#[test]
fn untyped_parameters_accept_anything() {
    assert_eq!(eval("let id = (x) -> x; id(7)"), Value::int(7));
    assert_eq!(eval("let id = (x) -> x; id(\"s\")"), Value::string("s"));
}

#[test]
fn curried_invocation() {
    let src = "let add = (a: Int) -> Any => (b: Int) -> Int => a + b\nadd(1)(2)";
    assert_eq!(eval(src), Value::int(3));
}

// ---------------------------------------------------------------------------
// if/else expressions
// ---------------------------------------------------------------------------

#[test]
fn inline_if_else() {
    assert_eq!(
        eval("let x = 1; if x == 1 -> \"yes\" else -> \"no\""),
        Value::string("yes")
    );
    assert_eq!(
        eval("let x = 2; if x == 1 -> \"yes\" else -> \"no\""),
        Value::string("no")
    );
}

#[test]
fn block_branches_run_their_prelude() {
    let src = "if true {\n    let y = 20\n    y + 1\n} else -> 0";
    assert_eq!(eval(src), Value::int(21));
}

#[test]
fn chained_else_if() {
    let src = "let grade = (n: Int) -> String => if n > 89 -> \"A\" else if n > 79 -> \"B\" else -> \"C\"\ngrade(85)";
    assert_eq!(eval(src), Value::string("B"));
}

#[test]
fn non_boolean_condition_fails() {
    assert!(matches!(eval_err("if 1 -> 2 else -> 3"), EvalError::Error(_)));
}

// ---------------------------------------------------------------------------
// Collections and maps
// ---------------------------------------------------------------------------

#[test]
fn collection_literal_and_type() {
    let value = eval("[1, 2, 3]");
    assert_eq!(value.ty.name(), "[Int]");
    let Payload::Collection(items) = &value.payload else {
        panic!("expected collection");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn heterogeneous_collection_is_any() {
    assert_eq!(eval("[1, \"two\"]").ty.name(), "[Any]");
}

#[test]
fn collection_indexing() {
    assert_eq!(eval("let xs = [10, 20, 30]; xs[1]"), Value::int(20));
}

#[test]
fn collection_index_out_of_bounds() {
    assert!(matches!(eval_err("[1][5]"), EvalError::Error(_)));
}

#[test]
fn map_literal_and_lookup() {
    assert_eq!(eval("let m = { \"a\": 1, \"b\": 2 }; m[\"a\"]"), Value::int(1));
    assert_eq!(eval("let m = { \"a\": 1, \"b\": 2 }; m[\"b\"]"), Value::int(2));
}

#[test]
fn map_type_propagates_from_entries() {
    assert_eq!(eval("{ \"a\": 1 }").ty.name(), "[String: Int]");
}

#[test]
fn missing_map_key_fails() {
    assert!(matches!(
        eval_err("let m = { \"a\": 1 }; m[\"z\"]"),
        EvalError::Error(_)
    ));
}

// ---------------------------------------------------------------------------
// Type checks and casts
// ---------------------------------------------------------------------------

#[test]
fn is_checks_the_runtime_type() {
    assert_eq!(eval("1 is Int"), Value::boolean(true));
    assert_eq!(eval("1 is String"), Value::boolean(false));
    assert_eq!(eval("1 is Int | String"), Value::boolean(true));
    assert_eq!(eval("[1] is [Int]"), Value::boolean(true));
}

#[test]
fn as_performs_numeric_conversion() {
    assert_eq!(eval("1 as Float"), Value::float(1.0));
    assert_eq!(eval("2.7 as Int"), Value::int(2));
}

#[test]
fn as_retags_to_a_wider_type() {
    assert_eq!(eval("(1 as Any)").ty.name(), "Any");
}

#[test]
fn invalid_cast_fails() {
    assert!(matches!(eval_err("\"s\" as Int"), EvalError::Error(_)));
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[test]
fn struct_construction_and_field_access() {
    let src = "struct Person {\n    name: String\n    age: Int\n}\nlet p = Person(\"Ann\", 30)\np.name";
    assert_eq!(eval(src), Value::string("Ann"));
}

#[test]
fn struct_field_defaults() {
    let src = "struct Counter {\n    label: String\n    count: Int = 0\n}\nlet c = Counter(\"hits\")\nc.count";
    assert_eq!(eval(src), Value::int(0));
}

#[test]
fn struct_field_assignment() {
    let src = "struct Person {\n    name: String\n    age: Int\n}\nlet p = Person(\"Ann\", 30)\np.age = 31\np.age";
    assert_eq!(eval(src), Value::int(31));
}

#[test]
fn struct_field_assignment_checks_the_property_type() {
    let src = "struct Person {\n    name: String\n    age: Int\n}\nlet p = Person(\"Ann\", 30)\np.age = \"old\"";
    assert!(matches!(
        eval_err(src),
        EvalError::AssignmentTypeMismatch { .. }
    ));
}

#[test]
fn constructor_arguments_are_type_checked() {
    let src = "struct Person {\n    name: String\n    age: Int\n}\nPerson(\"Ann\", \"thirty\")";
    assert!(matches!(
        eval_err(src),
        EvalError::ParameterTypeMismatch { .. }
    ));
}

#[test]
fn struct_satisfies_defined_shapes() {
    let src = "struct Person {\n    name: String\n    age: Int\n}\nlet p = Person(\"Ann\", 30)\np is {name: String}";
    assert_eq!(eval(src), Value::boolean(true));
}

#[test]
fn named_defined_type_in_checks() {
    let src = "type Named = {name: String}\nstruct Person {\n    name: String\n    age: Int\n}\nPerson(\"Ann\", 30) is Named";
    assert_eq!(eval(src), Value::boolean(true));
}

// ---------------------------------------------------------------------------
// Receiver-style dispatch and extensions
// ---------------------------------------------------------------------------

#[test]
fn int_methods_are_registered_extensions() {
    assert_eq!(eval("1.add(2)"), Value::int(3));
    assert_eq!(eval("7.minus(3)"), Value::int(4));
    assert_eq!(eval("6.times(7)"), Value::int(42));
    assert_eq!(eval("9.divide(3)"), Value::int(3));
    assert_eq!(eval("3.equals(3)"), Value::boolean(true));
}

#[test]
fn int_divide_by_zero_fails() {
    assert!(matches!(eval_err("1.divide(0)"), EvalError::Error(_)));
}

#[test]
fn plus_builtin_stringifies() {
    assert_eq!(eval("\"n = \".plus(42)"), Value::string("n = 42"));
}

#[test]
fn equals_builtin_is_polymorphic() {
    assert_eq!(eval("\"a\".equals(\"a\")"), Value::boolean(true));
    assert_eq!(eval("\"a\".equals(1)"), Value::boolean(false));
}

#[test]
fn scope_functions_with_this_dispatch_as_methods() {
    let src = "let twice = (this: Int) -> Int => this * 2\n5.twice()";
    assert_eq!(eval(src), Value::int(10));
}

#[test]
fn extend_registers_members_against_the_type() {
    let src = "extend Int {\n    let squared = (this: Int) -> Int => this * this\n}\n6.squared()";
    assert_eq!(eval(src), Value::int(36));
}

#[test]
fn extensions_satisfy_defined_shapes() {
    let src = "extend Int {\n    let label = \"number\"\n}\n1 is {label: String}";
    assert_eq!(eval(src), Value::boolean(true));
}

#[test]
fn dispatch_requires_an_accepting_receiver_type() {
    let src = "let twice = (this: Int) -> Int => this * 2\n\"five\".twice()";
    assert!(matches!(eval_err(src), EvalError::Error(_)));
}

#[test]
fn callable_struct_properties_dispatch_first() {
    let src = "struct Greeter {\n    greeting: String\n    greet: Any\n}\nlet g = Greeter(\"hi\", (name: String) -> String => \"hi \" + name)\ng.greet(\"Ann\")";
    assert_eq!(eval(src), Value::string("hi Ann"));
}

// ---------------------------------------------------------------------------
// Output channel
// ---------------------------------------------------------------------------

#[test]
fn out_write_returns_unit() {
    assert_eq!(eval("out.write(\"\")"), Value::unit());
}

// ---------------------------------------------------------------------------
// Script mode and the REPL surface
// ---------------------------------------------------------------------------

#[test]
fn script_mode_collects_expression_results_only() {
    let results = run("let x = 1\nx\nx + 1");
    assert_eq!(results, vec![Value::int(1), Value::int(2)]);
}

#[test]
fn non_script_mode_collects_top_level_returns() {
    let tokens = Lexer::new("let x = 1\nreturn x + 1").tokenize().expect("lex failed");
    let mut parser = Parser::new(tokens);
    let (stmts, errors) = parser.parse();
    assert!(errors.is_empty());
    let results = Interpreter::new(stmts).exec(false).expect("exec failed");
    assert_eq!(results, vec![Value::int(2)]);
}

#[test]
fn repl_session_preserves_definitions_between_inputs() {
    use opal::base::ReplSession;
    let mut session = ReplSession::new();
    session.run("let x = 40").expect("first input failed");
    let results = session.run("x + 2").expect("second input failed");
    assert_eq!(results, vec![Value::int(42)]);
}

#[test]
fn repl_session_surfaces_parse_errors() {
    use opal::base::ReplSession;
    let mut session = ReplSession::new();
    assert!(session.run("let = 1").is_err());
}

#[test]
fn execute_reports_timings() {
    use opal::base::execute;
    let (results, _lex, _parse, _exec) = execute(Some("test.opal"), "1 + 1", true);
    assert_eq!(results, vec![Value::int(2)]);
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_let_and_use() {
    let value = eval("let x = 1 + 2; x");
    assert_eq!(value, Value::int(3));
    assert_eq!(value.ty.name(), "Int");
}

#[test]
fn scenario_typed_function() {
    let value = eval("let f = (a: Int, b: Int) -> Int => a + b; f(2, 3)");
    assert_eq!(value, Value::int(5));
    assert_eq!(value.ty.name(), "Int");
}

#[test]
fn scenario_greeting() {
    let value = eval("let greet = (name: String) -> String => \"Hello \" + name; greet(\"world\")");
    assert_eq!(value, Value::string("Hello world"));
    assert_eq!(value.ty.name(), "String");
}

#[test]
fn scenario_if_expression() {
    let value = eval("let x = 1; if x == 1 -> \"yes\" else -> \"no\"");
    assert_eq!(value, Value::string("yes"));
    assert_eq!(value.ty.name(), "String");
}

#[test]
fn scenario_map_lookup() {
    let value = eval("let m = { \"a\": 1, \"b\": 2 }; m[\"a\"]");
    assert_eq!(value, Value::int(1));
}

#[test]
fn scenario_function_then_collection() {
    let value = eval("let double = (x: Int) -> Int => x * 2; [1, 2, 3]");
    let Payload::Collection(items) = &value.payload else {
        panic!("expected collection");
    };
    assert_eq!(
        items,
        &vec![Value::int(1), Value::int(2), Value::int(3)]
    );
    assert_eq!(repr(&value), "[1, 2, 3]");
    assert_eq!(value.ty.name(), "[Int]");
}
