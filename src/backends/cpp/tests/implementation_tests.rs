use super::test_support::{
    Fixture, emit_units, field, find_unit, int_literal, method, string_literal, this,
    type_declaration, variable,
};
use crate::backends::cpp::emit_type_declaration;
use crate::frontend_model::syntax::{
    AssignmentOperator, BodyDeclaration, Block, Expression, ExpressionKind, Initializer, Literal,
    Statement,
};
use crate::frontend_model::types::{Modifiers, PrimitiveCode, ResolvedType, TypeKind};
use crate::translator_messages::translator_errors::ErrorType;

#[test]
fn class_implementation_layout() {
    let mut fixture = Fixture::new();
    let foo = fixture.add_class("p", "Foo");
    let int = fixture.int();
    let count = fixture.add_field(foo, "count", int, Modifiers::PRIVATE);
    let get_count = fixture.add_method(foo, "getCount", Modifiers::PUBLIC, int, Vec::new());

    let declaration = type_declaration(
        foo,
        vec![
            field(count, None),
            method(get_count, Vec::new(), vec![Statement::Return(Some(variable(count, int)))]),
        ],
    );
    let units = emit_units(&fixture, &declaration);
    let unit = find_unit(&units, "p::Foo");

    let expected = "\
#include \"p/Foo.h\"

namespace java { namespace lang { class Class; }}

::java::lang::Class *p::Foo::class_()
{
    static ::java::lang::Class *c = ::class_(L\"p.Foo\");
    return c;
}

::java::lang::Class *p::Foo::getClass0()
{
    return class_();
}

p::Foo::Foo()
{
}

int32_t p::Foo::getCount()
{
    return count_;
}
";

    assert_eq!(unit.implementation, expected);
    assert_eq!(unit.header_path, std::path::PathBuf::from("p").join("Foo.h"));
    assert_eq!(unit.impl_path, std::path::PathBuf::from("p").join("Foo.cpp"));
}

#[test]
fn source_banner_names_the_java_file() {
    let mut fixture = Fixture::new();
    let foo = fixture.add_class("p", "Foo");
    fixture.types.get_mut(foo).unwrap().source_path = Some(String::from("src/p/Foo.java"));

    let units = emit_units(&fixture, &type_declaration(foo, Vec::new()));
    let unit = find_unit(&units, "p::Foo");
    assert!(unit.header.starts_with("// Generated from src/p/Foo.java\n#pragma once\n"));
    assert!(unit.implementation.starts_with("// Generated from src/p/Foo.java\n#include \"p/Foo.h\"\n"));

    fixture.settings.source_banner = false;
    let units = emit_units(&fixture, &type_declaration(foo, Vec::new()));
    assert!(find_unit(&units, "p::Foo").header.starts_with("#pragma once\n"));
}

#[test]
fn constructor_bodies_run_the_instance_initializer_first() {
    let mut fixture = Fixture::new();
    let counter = fixture.add_class("p", "Counter");
    let int = fixture.int();
    let count = fixture.add_field(counter, "count", int, Modifiers::PRIVATE);
    let constructor = fixture.add_constructor(counter, Modifiers::PUBLIC, vec![int]);
    let start = fixture.add_local("start", int, counter);

    let increment = Statement::Expression(Expression::new(
        ExpressionKind::Assignment {
            target: Box::new(variable(count, int)),
            operator: AssignmentOperator::PlusAssign,
            value: Box::new(variable(start, int)),
        },
        int,
    ));

    let declaration = type_declaration(
        counter,
        vec![
            field(count, Some(int_literal(&fixture, 5))),
            method(constructor, vec![start], vec![increment]),
        ],
    );
    let units = emit_units(&fixture, &declaration);
    let implementation = &find_unit(&units, "p::Counter").implementation;

    assert!(implementation.contains(
        "p::Counter::Counter(int32_t start)\n{\n    _construct(start);\n}\n\n\
void p::Counter::_construct(int32_t start)\n{\n    _init();\n    count_ += start;\n}\n\n\
void p::Counter::_init()\n{\n    count_ = 5;\n}\n"
    ));
}

#[test]
fn delegating_constructors_leave_the_initializer_to_the_target() {
    let mut fixture = Fixture::new();
    let point = fixture.add_class("p", "Point");
    let int = fixture.int();
    let x = fixture.add_field(point, "x", int, Modifiers::PRIVATE);
    let full = fixture.add_constructor(point, Modifiers::PUBLIC, vec![int]);
    let empty = fixture.add_constructor(point, Modifiers::PUBLIC, Vec::new());
    let value = fixture.add_local("value", int, point);

    let declaration = type_declaration(
        point,
        vec![
            field(x, Some(int_literal(&fixture, 1))),
            method(full, vec![value], Vec::new()),
            method(
                empty,
                Vec::new(),
                vec![Statement::ConstructorCall {
                    constructor: full,
                    arguments: vec![int_literal(&fixture, 7)],
                }],
            ),
        ],
    );
    let units = emit_units(&fixture, &declaration);
    let implementation = &find_unit(&units, "p::Point").implementation;

    assert!(implementation.contains("void p::Point::_construct(int32_t value)\n{\n    _init();\n}\n"));
    assert!(implementation.contains("void p::Point::_construct()\n{\n    _construct(7);\n}\n"));
}

#[test]
fn explicit_super_calls_become_member_initializers() {
    let mut fixture = Fixture::new();
    let int = fixture.int();
    let base = fixture.add_class("p", "Base");
    let base_constructor = fixture.add_constructor(base, Modifiers::PUBLIC, vec![int]);

    let derived = fixture.types.insert(
        ResolvedType::class("p", "Derived")
            .with_modifiers(Modifiers::PUBLIC)
            .with_superclass(base),
    );
    let constructor = fixture.add_constructor(derived, Modifiers::PUBLIC, Vec::new());

    let declaration = type_declaration(
        derived,
        vec![method(
            constructor,
            Vec::new(),
            vec![Statement::SuperConstructorCall {
                constructor: base_constructor,
                outer: None,
                arguments: vec![int_literal(&fixture, 1)],
            }],
        )],
    );
    let units = emit_units(&fixture, &declaration);
    let implementation = &find_unit(&units, "p::Derived").implementation;

    assert!(implementation.contains("#include \"p/Base.h\"\n"));
    assert!(implementation.contains(
        "p::Derived::Derived()\n    : super(1)\n{\n    _construct();\n}\n"
    ));
    assert!(implementation.contains("void p::Derived::_construct()\n{\n}\n"));
}

#[test]
fn static_initializer_runs_from_a_file_local_object() {
    let mut fixture = Fixture::new();
    let registry = fixture.add_class("p", "Registry");
    let int = fixture.int();
    let total = fixture.add_field(registry, "total", int, Modifiers::PRIVATE | Modifiers::STATIC);

    let bump = Statement::Expression(Expression::new(
        ExpressionKind::Assignment {
            target: Box::new(variable(total, int)),
            operator: AssignmentOperator::TimesAssign,
            value: Box::new(int_literal(&fixture, 2)),
        },
        int,
    ));

    let declaration = type_declaration(
        registry,
        vec![
            field(total, Some(int_literal(&fixture, 3))),
            BodyDeclaration::Initializer(Initializer {
                is_static: true,
                body: Block {
                    statements: vec![bump],
                },
            }),
        ],
    );
    let units = emit_units(&fixture, &declaration);
    let implementation = &find_unit(&units, "p::Registry").implementation;

    let expected = "\
int32_t p::Registry::total_;

void p::Registry::staticInitializer()
{
    total_ = 3;
    {
        total_ *= 2;
    }
}

namespace
{
    struct RegistryInitializer
    {
        RegistryInitializer()
        {
            ::p::Registry::staticInitializer();
        }
    } RegistryInitializer_instance;
}
";

    assert!(implementation.contains(expected));
}

#[test]
fn synchronized_methods_hold_their_monitor() {
    let mut fixture = Fixture::new();
    let account = fixture.add_class("p", "Account");
    let void = fixture.void();
    let flush = fixture.add_method(
        account,
        "flush",
        Modifiers::PUBLIC | Modifiers::SYNCHRONIZED,
        void,
        Vec::new(),
    );
    let reset = fixture.add_method(
        account,
        "reset",
        Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::SYNCHRONIZED,
        void,
        Vec::new(),
    );

    let declaration = type_declaration(
        account,
        vec![
            method(flush, Vec::new(), vec![Statement::Return(None)]),
            method(reset, Vec::new(), Vec::new()),
        ],
    );
    let units = emit_units(&fixture, &declaration);
    let unit = find_unit(&units, "p::Account");

    assert!(unit.implementation.contains("extern void lock(::java::lang::Object *);"));
    assert!(unit.implementation.contains("    struct synchronized_\n"));
    assert!(unit.implementation.contains(
        "void p::Account::flush()\n{\n    synchronized_ synchronized_0(this);\n    return;\n}\n"
    ));
    assert!(unit.implementation.contains(
        "void p::Account::reset()\n{\n    synchronized_ synchronized_1(class_());\n}\n"
    ));
    assert!(unit.header.contains("    static void reset();\n"));
    assert!(!unit.implementation.contains("struct finally_"));
}

#[test]
fn floating_point_specials_pull_in_limits() {
    let mut fixture = Fixture::new();
    let math = fixture.add_class("p", "Math");
    let double = fixture.primitive(PrimitiveCode::Double);
    let nan = fixture.add_method(math, "nan", Modifiers::PUBLIC | Modifiers::STATIC, double, Vec::new());

    let declaration = type_declaration(
        math,
        vec![method(
            nan,
            Vec::new(),
            vec![Statement::Return(Some(Expression::new(
                ExpressionKind::Literal(Literal::Double(f64::NAN)),
                double,
            )))],
        )],
    );
    let units = emit_units(&fixture, &declaration);
    let implementation = &find_unit(&units, "p::Math").implementation;

    assert!(implementation.contains("\n#include <limits>\n"));
    assert!(implementation.contains("    return std::numeric_limits<double>::quiet_NaN();\n"));
}

#[test]
fn nested_member_types_get_their_own_units() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p", "Outer");
    let inner = fixture.types.insert(
        ResolvedType::class("p", "Inner")
            .with_modifiers(Modifiers::PUBLIC)
            .with_superclass(fixture.object)
            .nested_in(outer, "p.Outer"),
    );
    let int = fixture.int();
    let size = fixture.add_field(outer, "size", int, Modifiers::PRIVATE);
    let read = fixture.add_method(inner, "read", Modifiers::PUBLIC, int, Vec::new());

    let inner_declaration = type_declaration(
        inner,
        vec![method(read, Vec::new(), vec![Statement::Return(Some(variable(size, int)))])],
    );
    let declaration = type_declaration(
        outer,
        vec![field(size, None), BodyDeclaration::Type(inner_declaration)],
    );

    let units = emit_units(&fixture, &declaration);
    assert_eq!(units.len(), 2);

    let inner_unit = find_unit(&units, "p::Outer_Inner");
    assert!(inner_unit.header.contains("    friend class Outer;\n"));
    assert!(inner_unit.header.contains("    Outer_Inner(Outer *Outer_this);\n"));
    assert!(inner_unit.header.contains("private:\n    ::java::lang::Class *getClass0() override;\n    Outer *Outer_this;\n"));
    assert!(inner_unit.implementation.contains(
        "p::Outer_Inner::Outer_Inner(Outer *Outer_this)\n    : Outer_this(Outer_this)\n{\n}\n"
    ));
    assert!(inner_unit.implementation.contains("    return Outer_this->size_;\n"));
    assert!(inner_unit.implementation.contains("#include \"p/Outer.h\"\n"));

    let outer_unit = find_unit(&units, "p::Outer");
    assert!(outer_unit.header.contains("    friend class Outer_Inner;\n"));
}

#[test]
fn anonymous_classes_through_an_explicit_outer_instance_are_rejected() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p", "Outer");
    let inner = fixture.types.insert(
        ResolvedType::class("p", "Inner")
            .with_superclass(fixture.object)
            .nested_in(outer, "p.Outer"),
    );
    let anonymous = fixture.types.insert(
        ResolvedType::new(None, "", TypeKind::Class)
            .with_superclass(inner)
            .local_in(outer, Some("make"), true),
    );
    let void = fixture.void();
    let make = fixture.add_method(outer, "make", Modifiers::PUBLIC, void, Vec::new());

    let creation = Statement::Expression(Expression::new(
        ExpressionKind::New {
            outer: Some(Box::new(this(outer))),
            class: anonymous,
            constructor: None,
            arguments: Vec::new(),
            type_arguments: Vec::new(),
            anonymous: Some(Box::new(type_declaration(anonymous, Vec::new()))),
        },
        anonymous,
    ));
    let declaration = type_declaration(outer, vec![method(make, Vec::new(), vec![creation])]);

    let error = emit_type_declaration(fixture.ctx(), &declaration).unwrap_err();
    assert_eq!(error.error_type, ErrorType::UnsupportedConstruct);
    assert_eq!(error.type_name.as_deref(), Some("p.Outer"));
}

#[test]
fn string_fields_are_initialized_with_runtime_literals() {
    let mut fixture = Fixture::new();
    let greeter = fixture.add_class("p", "Greeter");
    let greeting = fixture.add_field(greeter, "greeting", fixture.string, Modifiers::PRIVATE);

    let declaration = type_declaration(
        greeter,
        vec![field(greeting, Some(string_literal(&fixture, "hello")))],
    );
    let units = emit_units(&fixture, &declaration);
    let unit = find_unit(&units, "p::Greeter");

    assert!(unit.implementation.contains("    greeting_ = ::lit(L\"hello\");\n"));
    assert!(unit.implementation.contains("#include \"java/lang/String.h\"\n"));
    assert!(unit.implementation.contains("p::Greeter::Greeter()\n{\n    _init();\n}\n"));
    assert!(unit.header.contains("    ::java::lang::String *greeting_;\n"));
}
