use crate::classifier::MockedType;
use crate::ctype::{declare, CType};
use crate::function::{Function, Parameter, ReturnValue};
use itertools::Itertools;

/// C++ type used by the mock runtime for value-like classes.
pub fn runtime_type_name(mocked_type: MockedType) -> Option<&'static str> {
    match mocked_type {
        MockedType::Bool => Some("bool"),
        MockedType::Int => Some("int"),
        MockedType::UnsignedInt => Some("unsigned int"),
        MockedType::Long => Some("long"),
        MockedType::UnsignedLong => Some("unsigned long"),
        MockedType::Double => Some("double"),
        MockedType::String => Some("const char*"),
        MockedType::Pointer | MockedType::Output => Some("void*"),
        MockedType::ConstPointer => Some("const void*"),
        _ => None,
    }
}

/// Suffix of the `with<Kind>Parameter` call for classes passed as a plain value or pointer.
pub fn parameter_call_kind(mocked_type: MockedType) -> Option<&'static str> {
    match mocked_type {
        MockedType::Bool => Some("Bool"),
        MockedType::Int => Some("Int"),
        MockedType::UnsignedInt => Some("UnsignedInt"),
        MockedType::Long => Some("LongInt"),
        MockedType::UnsignedLong => Some("UnsignedLongInt"),
        MockedType::Double => Some("Double"),
        MockedType::String => Some("String"),
        MockedType::Pointer => Some("Pointer"),
        MockedType::ConstPointer => Some("ConstPointer"),
        _ => None,
    }
}

fn return_call(mocked_type: MockedType) -> &'static str {
    match mocked_type {
        MockedType::Bool => "returnBoolValue",
        MockedType::Int => "returnIntValue",
        MockedType::UnsignedInt => "returnUnsignedIntValue",
        MockedType::Long => "returnLongIntValue",
        MockedType::UnsignedLong => "returnUnsignedLongIntValue",
        MockedType::Double => "returnDoubleValue",
        MockedType::String => "returnStringValue",
        MockedType::ConstPointer => "returnConstPointerValue",
        _ => "returnPointerValue",
    }
}

/// Adds `const` to the pointee of a pointer to `target`, keeping the result readable for simple
/// types and correct for pointer targets.
pub fn const_pointer_to(target: &str) -> String {
    if target.ends_with('*') {
        format!("{} const*", target)
    } else {
        format!("const {}*", target)
    }
}

/// Expression yielding the address of the argument: pointers and arrays are passed as they are.
fn address_of(param: &Parameter) -> String {
    if param.is_pointer_like() {
        param.name().to_string()
    } else {
        format!("&{}", param.name())
    }
}

fn value_expression(param: &Parameter) -> String {
    let value_type = param.passed_type().target();
    match runtime_type_name(param.mocked_type()) {
        Some(runtime_type) if param.mocked_type().is_value() && value_type.is_enum() => {
            format!("static_cast<{}>({})", runtime_type, param.name())
        }
        _ => param.name().to_string(),
    }
}

fn pointer_expression(param: &Parameter) -> String {
    let ty = param.passed_type();
    if ty.is_reference() {
        format!("&{}", param.name())
    } else if ty.is_function_pointer() {
        format!("reinterpret_cast<void*>({})", param.name())
    } else {
        param.name().to_string()
    }
}

fn sizeof_target(param: &Parameter) -> String {
    format!("sizeof({})", param.passed_type().target().unqualified_spelling())
}

/// The `.with…Parameter(…)` call passing `param` to the actual call, or `None` if it is skipped.
pub fn actual_call_parameter(param: &Parameter) -> Option<String> {
    let name = param.name();
    let modified = param.expr_mod().map(|m| m.apply(name));
    let expr = |default: String| modified.clone().unwrap_or(default);
    let exposed = param
        .override_spec()
        .and_then(|s| s.exposed_type_name())
        .unwrap_or_default();

    let call = match param.mocked_type() {
        MockedType::Skip => return None,
        t @ MockedType::Bool
        | t @ MockedType::Int
        | t @ MockedType::UnsignedInt
        | t @ MockedType::Long
        | t @ MockedType::UnsignedLong
        | t @ MockedType::Double
        | t @ MockedType::String => format!(
            "with{}Parameter(\"{}\", {})",
            parameter_call_kind(t).unwrap_or_default(),
            name,
            expr(value_expression(param))
        ),
        t @ MockedType::Pointer | t @ MockedType::ConstPointer => format!(
            "with{}Parameter(\"{}\", {})",
            parameter_call_kind(t).unwrap_or_default(),
            name,
            expr(pointer_expression(param))
        ),
        MockedType::Output | MockedType::OutputPOD => format!(
            "withOutputParameter(\"{}\", {})",
            name,
            expr(address_of(param))
        ),
        MockedType::InputPOD => format!(
            "withMemoryBufferParameter(\"{}\", reinterpret_cast<const unsigned char*>({}), {})",
            name,
            expr(address_of(param)),
            sizeof_target(param)
        ),
        MockedType::InputOfType => format!(
            "withParameterOfType(\"{}\", \"{}\", {})",
            exposed,
            name,
            expr(address_of(param))
        ),
        MockedType::OutputOfType => format!(
            "withOutputParameterOfType(\"{}\", \"{}\", {})",
            exposed,
            name,
            expr(address_of(param))
        ),
        MockedType::MemoryBuffer => format!(
            "withMemoryBufferParameter(\"{}\", {}, {})",
            name,
            expr(name.to_string()),
            param
                .override_spec()
                .and_then(|s| s.size_expr())
                .map(|s| s.apply(name))
                .unwrap_or_else(|| sizeof_target(param))
        ),
    };

    Some(call)
}

fn pointer_cast(ty: &CType, call: &str) -> String {
    if ty.is_reference() {
        format!("*static_cast<{}>({})", const_free_pointer(ty.target()), call)
    } else if ty.is_function_pointer() {
        format!("reinterpret_cast<{}>({})", ty.spelling, call)
    } else {
        format!("static_cast<{}>({})", ty.spelling, call)
    }
}

fn const_free_pointer(target: &CType) -> String {
    if target.spelling.ends_with('*') {
        format!("{}*", target.spelling)
    } else {
        format!("{} *", target.spelling)
    }
}

/// Expression converting the mock runtime's return value into the declared return type.
pub fn return_expression(return_value: &ReturnValue) -> Option<String> {
    let mocked_type = return_value.mocked_type()?;
    let call = format!("mock().{}()", return_call(mocked_type));

    if let Some(modifier) = return_value.expr_mod() {
        return Some(modifier.apply(&call));
    }

    let ty = return_value.ty();
    let expr = match mocked_type {
        MockedType::Pointer | MockedType::ConstPointer | MockedType::Output => {
            pointer_cast(ty, &call)
        }
        t if t.is_value() && ty.is_enum() => format!("static_cast<{}>({})", ty.spelling, call),
        _ => call,
    };
    Some(expr)
}

/// The definition line of the mock, e.g. `int ns::C::get(int a) const`.
pub fn mock_signature(function: &Function) -> String {
    let parameters = function
        .parameters()
        .iter()
        .map(|p| declare(&p.ty().spelling, p.name()))
        .join(", ");
    let declarator = format!("{}({})", function.qualified_name(), parameters);

    let mut signature = if function.has_return_type() {
        declare(&function.return_value().ty().spelling, &declarator)
    } else {
        declarator
    };

    if function.is_const() {
        signature.push_str(" const");
    }
    if function.is_noexcept() {
        signature.push_str(" noexcept");
    }
    signature
}

pub fn generate_mock(function: &Function) -> String {
    let qualified_name = function.qualified_name();
    let object = if function.binds_object() {
        ".onObject(this)"
    } else {
        ""
    };
    let parameters: String = function
        .parameters()
        .iter()
        .filter_map(actual_call_parameter)
        .map(|call| format!(".{}", call))
        .collect();

    let mut body = format!(
        "    mock().actualCall(\"{}\"){}{};\n",
        qualified_name, object, parameters
    );
    if let Some(expr) = return_expression(function.return_value()) {
        body.push_str(&format!("    return {};\n", expr));
    }

    format!("{}\n{{\n{}}}\n", mock_signature(function), body)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::ctype::types::*;
    use crate::ctype::{IntRank, TypeKind};
    use crate::declaration::{Declaration, DeclarationKind};
    use crate::test_utils::assert_eq_upto_whitespace;
    use pretty_assertions::assert_eq;

    fn mock_for(decl: Declaration, overrides: &[&str]) -> String {
        let config = Config::new(None, false, overrides).unwrap();
        generate_mock(&Function::parse(&decl, &config).unwrap().unwrap())
    }

    #[test]
    fn mock_for_void_function_with_int_parameter() {
        assert_eq!(
            mock_for(
                Declaration::new(DeclarationKind::Function, "function1", void())
                    .with_parameter(Some("a"), int()),
                &[]
            ),
            "void function1(int a)\n{\n    mock().actualCall(\"function1\").withIntParameter(\"a\", a);\n}\n"
        );
    }

    #[test]
    fn mock_for_method_binds_object() {
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Method, "m", void()).in_scopes(vec!["C"]),
                &[],
            ),
            r#"void C::m() { mock().actualCall("C::m").onObject(this); }"#,
        );
    }

    #[test]
    fn mock_for_const_noexcept_method_with_return() {
        let mut decl = Declaration::new(DeclarationKind::Method, "get", int())
            .in_scopes(vec!["ns", "C"])
            .with_parameter(Some("flag"), CType::new("bool", TypeKind::Bool));
        decl.is_const = true;
        decl.is_noexcept = true;
        assert_eq_upto_whitespace(
            &mock_for(decl, &[]),
            r#"
                int ns::C::get(bool flag) const noexcept
                {
                    mock().actualCall("ns::C::get").onObject(this).withBoolParameter("flag", flag);
                    return mock().returnIntValue();
                }
            "#,
        );
    }

    #[test]
    fn mock_for_constructor_and_destructor() {
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Constructor, "C", void())
                    .in_scopes(vec!["C"])
                    .with_parameter(Some("x"), CType::new("double", TypeKind::Floating)),
                &[],
            ),
            r#"C::C(double x) { mock().actualCall("C::C").onObject(this).withDoubleParameter("x", x); }"#,
        );
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Destructor, "~C", void()).in_scopes(vec!["C"]),
                &[],
            ),
            r#"C::~C() { mock().actualCall("C::~C").onObject(this); }"#,
        );
    }

    #[test]
    fn string_override_with_expression_modifier() {
        let string_ref = lvalue_ref_to(const_(record("std::string", false)));
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "f", void())
                    .with_parameter(Some("s"), string_ref),
                &["#const std::string &=String~$.c_str()"],
            ),
            r#"void f(const std::string &s) { mock().actualCall("f").withStringParameter("s", s.c_str()); }"#,
        );
    }

    #[test]
    fn memory_buffer_override_with_size_expression() {
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "send", void())
                    .with_parameter(Some("buf"), pointer_to(const_(void())))
                    .with_parameter(
                        Some("buf_size"),
                        integer("unsigned long", false, IntRank::Long),
                    ),
                &["#buf=MemoryBuffer:~$_size"],
            ),
            r#"
                void send(const void *buf, unsigned long buf_size)
                {
                    mock().actualCall("send").withMemoryBufferParameter("buf", buf, buf_size)
                        .withUnsignedLongIntParameter("buf_size", buf_size);
                }
            "#,
        );
    }

    #[test]
    fn pointers_outputs_and_strings() {
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "f", void())
                    .with_parameter(Some("s"), pointer_to(const_(char_())))
                    .with_parameter(Some("out"), pointer_to(int()))
                    .with_parameter(Some("ref"), lvalue_ref_to(int()))
                    .with_parameter(Some("p"), pointer_to(void()))
                    .with_parameter(Some("cp"), pointer_to(const_(int()))),
                &[],
            ),
            r#"
                void f(const char *s, int *out, int &ref, void *p, const int *cp)
                {
                    mock().actualCall("f").withStringParameter("s", s)
                        .withOutputParameter("out", out).withOutputParameter("ref", &ref)
                        .withPointerParameter("p", p).withConstPointerParameter("cp", cp);
                }
            "#,
        );
    }

    #[test]
    fn const_references_to_pointers_pass_the_pointer() {
        let const_pointer = |ty: CType| {
            let spelling = format!("{}const", ty.spelling);
            CType {
                spelling,
                is_const: true,
                ..ty
            }
        };
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "f", void())
                    .with_parameter(Some("a"), lvalue_ref_to(const_pointer(pointer_to(void()))))
                    .with_parameter(
                        Some("b"),
                        lvalue_ref_to(const_pointer(pointer_to(const_(record("Foo", false))))),
                    )
                    .with_parameter(Some("c"), lvalue_ref_to(const_pointer(pointer_to(int())))),
                &[],
            ),
            r#"
                void f(void *const &a, const Foo *const &b, int *const &c)
                {
                    mock().actualCall("f").withPointerParameter("a", a)
                        .withConstPointerParameter("b", b).withOutputParameter("c", c);
                }
            "#,
        );
    }

    #[test]
    fn pod_and_of_type_overrides() {
        let point = record("Point", true);
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "f", void())
                    .with_parameter(Some("in"), lvalue_ref_to(const_(point.clone())))
                    .with_parameter(Some("out"), lvalue_ref_to(point.clone()))
                    .with_parameter(Some("a"), pointer_to(const_(record("Foo", false))))
                    .with_parameter(Some("b"), pointer_to(record("Foo", false)))
                    .with_parameter(Some("skipped"), int()),
                &[
                    "f#a=InputOfType:Foo",
                    "f#b=OutputOfType:Foo",
                    "f#skipped=Skip",
                ],
            ),
            r#"
                void f(const Point &in, Point &out, const Foo *a, Foo *b, int skipped)
                {
                    mock().actualCall("f")
                        .withMemoryBufferParameter("in", reinterpret_cast<const unsigned char*>(&in), sizeof(Point))
                        .withOutputParameter("out", &out)
                        .withParameterOfType("Foo", "a", a)
                        .withOutputParameterOfType("Foo", "b", b);
                }
            "#,
        );
    }

    #[test]
    fn enums_are_cast() {
        let color = CType::new(
            "Color",
            TypeKind::Enum {
                underlying: Box::new(int()),
            },
        );
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "paint", color.clone())
                    .with_parameter(Some("c"), color),
                &[],
            ),
            r#"
                Color paint(Color c)
                {
                    mock().actualCall("paint").withIntParameter("c", static_cast<int>(c));
                    return static_cast<Color>(mock().returnIntValue());
                }
            "#,
        );
    }

    #[test]
    fn pointer_and_reference_returns_are_cast() {
        let foo = record("Foo", false);
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "get", pointer_to(foo.clone())),
                &[],
            ),
            r#"Foo *get() { mock().actualCall("get"); return static_cast<Foo *>(mock().returnPointerValue()); }"#,
        );
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "get", lvalue_ref_to(const_(foo))),
                &[],
            ),
            r#"const Foo &get() { mock().actualCall("get"); return *static_cast<const Foo *>(mock().returnConstPointerValue()); }"#,
        );
    }

    #[test]
    fn return_expression_modifier_wraps_runtime_call() {
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "name", record("std::string", false)),
                &["name@=String~std::string($)"],
            ),
            r#"std::string name() { mock().actualCall("name"); return std::string(mock().returnStringValue()); }"#,
        );
    }

    #[test]
    fn function_pointer_parameter() {
        let callback = CType::new(
            "void (*)(int)",
            TypeKind::Pointer {
                pointee: Box::new(CType::new("void (int)", TypeKind::Function)),
            },
        );
        assert_eq_upto_whitespace(
            &mock_for(
                Declaration::new(DeclarationKind::Function, "on", void())
                    .with_parameter(Some("cb"), callback),
                &[],
            ),
            r#"void on(void (*cb)(int)) { mock().actualCall("on").withPointerParameter("cb", reinterpret_cast<void*>(cb)); }"#,
        );
    }

    #[test]
    fn const_pointer_helper() {
        assert_eq!(const_pointer_to("int"), "const int*");
        assert_eq!(const_pointer_to("int *"), "int * const*");
    }
}
