use super::test_support::Fixture;
use crate::backends::cpp::cpp_impl::runtime_class_name;
use crate::backends::cpp::cpp_names::{
    field_name, global_name, header_name, impl_name, include_path, outer_this_name,
    primitive_spelling_for_keyword, qualified_name, relative_name, sanitize_identifier,
    simple_name,
};
use crate::frontend_model::types::{Modifiers, PrimitiveCode, ResolvedType, TypeKind};
use crate::translator_messages::translator_errors::ErrorType;
use std::path::PathBuf;

#[test]
fn nested_types_are_flattened_into_their_top_level_namespace() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p.q", "Outer");
    let inner = fixture
        .types
        .insert(ResolvedType::class("p.q", "Inner").nested_in(outer, "p.q.Outer"));
    let deepest = fixture
        .types
        .insert(ResolvedType::class("p.q", "Leaf").nested_in(inner, "p.q.Outer.Inner"));

    assert_eq!(simple_name(&fixture.types, inner).unwrap(), "Outer_Inner");
    assert_eq!(simple_name(&fixture.types, deepest).unwrap(), "Outer_Inner_Leaf");
    assert_eq!(qualified_name(&fixture.types, deepest).unwrap(), "p::q::Outer_Inner_Leaf");
    assert_eq!(global_name(&fixture.types, inner).unwrap(), "::p::q::Outer_Inner");
    assert_eq!(outer_this_name(&fixture.types, inner).unwrap(), "Outer_this");
    assert_eq!(outer_this_name(&fixture.types, deepest).unwrap(), "Outer_Inner_this");
}

#[test]
fn local_and_anonymous_types_are_named_after_their_method() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p", "Outer");

    let anonymous = fixture.types.insert(
        ResolvedType::new(None, "", TypeKind::Class).local_in(outer, Some("run"), true),
    );
    let local = fixture
        .types
        .insert(ResolvedType::class("p", "Helper").local_in(outer, Some("run"), false));
    let initializer_anonymous = fixture
        .types
        .insert(ResolvedType::new(None, "", TypeKind::Class).local_in(outer, None, true));

    assert_eq!(simple_name(&fixture.types, anonymous).unwrap(), "Outer_run");
    assert_eq!(simple_name(&fixture.types, local).unwrap(), "Outer_Helper");
    assert!(
        simple_name(&fixture.types, initializer_anonymous)
            .unwrap()
            .starts_with("Outer_m")
    );

    // Namespaces come from the outermost type, never from the local binding itself
    assert_eq!(qualified_name(&fixture.types, anonymous).unwrap(), "p::Outer_run");
}

#[test]
fn relative_names_drop_the_shared_namespace_prefix() {
    let mut fixture = Fixture::new();
    let a = fixture.add_class("p.q", "A");
    let b = fixture.add_class("p.r", "B");
    let c = fixture.add_class("p.q", "C");
    let top = fixture.add_class("", "Top");

    assert_eq!(relative_name(&fixture.types, b, a).unwrap(), "r::B");
    assert_eq!(relative_name(&fixture.types, c, a).unwrap(), "C");
    assert_eq!(
        relative_name(&fixture.types, fixture.string, a).unwrap(),
        "::java::lang::String"
    );
    assert_eq!(relative_name(&fixture.types, a, top).unwrap(), "::p::q::A");
    assert_eq!(relative_name(&fixture.types, top, top).unwrap(), "Top");
    assert_eq!(relative_name(&fixture.types, fixture.int(), a).unwrap(), "int32_t");
}

#[test]
fn file_names_follow_the_namespace() {
    let mut fixture = Fixture::new();
    let foo = fixture.add_class("p.q", "Foo");
    let top = fixture.add_class("", "Top");

    assert_eq!(header_name(&fixture.types, foo).unwrap(), PathBuf::from("p").join("q").join("Foo.h"));
    assert_eq!(impl_name(&fixture.types, foo).unwrap(), PathBuf::from("p").join("q").join("Foo.cpp"));
    assert_eq!(include_path(&fixture.types, foo).unwrap(), "p/q/Foo.h");
    assert_eq!(include_path(&fixture.types, top).unwrap(), "Top.h");
}

#[test]
fn arrays_live_next_to_their_element_type() {
    let mut fixture = Fixture::new();
    let strings = fixture.array_of(fixture.string);
    let int = fixture.int();
    let ints = fixture.array_of(int);
    let int_grid = fixture.array_of(ints);

    assert_eq!(simple_name(&fixture.types, strings).unwrap(), "StringArray");
    assert_eq!(qualified_name(&fixture.types, strings).unwrap(), "java::lang::StringArray");
    assert_eq!(include_path(&fixture.types, strings).unwrap(), "java/lang/StringArray.h");
    assert_eq!(simple_name(&fixture.types, int_grid).unwrap(), "int32_tArrayArray");
    assert_eq!(include_path(&fixture.types, int_grid).unwrap(), "int32_tArrayArray.h");
}

#[test]
fn identifiers_never_collide_with_cpp_keywords() {
    assert_eq!(sanitize_identifier("delete"), "delete_");
    assert_eq!(sanitize_identifier("errno"), "errno_");
    assert_eq!(sanitize_identifier("a$b"), "a_b");
    assert_eq!(sanitize_identifier("1st"), "_1st");
    assert_eq!(sanitize_identifier("value"), "value");
    assert_eq!(field_name("value"), "value_");
}

#[test]
fn primitive_keywords_map_to_fixed_width_types() {
    assert_eq!(primitive_spelling_for_keyword("int").unwrap(), "int32_t");
    assert_eq!(primitive_spelling_for_keyword("char").unwrap(), "wchar_t");
    assert_eq!(primitive_spelling_for_keyword("long").unwrap(), "int64_t");

    let error = primitive_spelling_for_keyword("integer").unwrap_err();
    assert_eq!(error.error_type, ErrorType::Compiler);
    assert!(error.msg.contains("integer"));

    let fixture = Fixture::new();
    let byte = fixture.primitive(PrimitiveCode::Byte);
    assert_eq!(simple_name(&fixture.types, byte).unwrap(), "int8_t");
}

#[test]
fn runtime_names_use_dollar_separated_nesting() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p", "Outer");
    let inner = fixture.types.insert(
        ResolvedType::class("p", "Inner")
            .with_modifiers(Modifiers::STATIC)
            .nested_in(outer, "p.Outer"),
    );
    let anonymous = fixture.types.insert(
        ResolvedType::new(None, "", TypeKind::Class).local_in(outer, Some("run"), true),
    );

    assert_eq!(runtime_class_name(fixture.ctx(), inner).unwrap(), "p.Outer$Inner");
    assert_eq!(runtime_class_name(fixture.ctx(), anonymous).unwrap(), "p.Outer$run");
    assert_eq!(runtime_class_name(fixture.ctx(), fixture.string).unwrap(), "java.lang.String");
}
