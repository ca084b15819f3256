use super::test_support::Fixture;
use crate::backends::cpp::cpp_arrays::type_descriptor;
use crate::backends::cpp::emit_array_unit;
use crate::frontend_model::types::{Modifiers, PrimitiveCode, ResolvedType};
use crate::translator_messages::translator_errors::ErrorType;
use std::path::PathBuf;

#[test]
fn reference_arrays_derive_from_the_arrays_of_their_supertypes() {
    let mut fixture = Fixture::new();
    let strings = fixture.array_of(fixture.string);
    fixture.types.complete_array_types().unwrap();

    let objects = fixture.types.array_of(fixture.object).unwrap();
    let comparables = fixture.types.array_of(fixture.comparable).unwrap();

    let unit = emit_array_unit(fixture.ctx(), strings).unwrap();
    assert_eq!(unit.qualified_name, "java::lang::StringArray");
    assert_eq!(
        unit.header_path,
        PathBuf::from("java").join("lang").join("StringArray.h")
    );
    assert_eq!(unit.referenced_arrays, vec![objects, comparables]);

    assert!(unit.header.contains(
        "#include \"java/lang/ComparableArray.h\"\n#include \"java/lang/ObjectArray.h\"\n#include \"java/lang/String.h\"\n"
    ));
    assert!(unit.header.contains("namespace java {\nnamespace lang {\n\nclass StringArray\n"));
    assert!(unit.header.contains(
        "class StringArray\n    : public virtual ObjectArray\n    , public virtual ComparableArray\n{"
    ));
    assert!(unit.header.contains("    typedef ObjectArray super;\n"));
    assert!(unit.header.contains("    typedef String value_type;\n"));
    assert!(unit.header.contains("} // namespace lang\n} // namespace java\n"));

    assert!(unit.implementation.starts_with(
        "#include \"java/lang/StringArray.h\"\n#include \"forward.h\"\n\n"
    ));
    assert!(unit.implementation.contains(
        "    static ::java::lang::Class *c = ::class_(L\"[Ljava.lang.String;\");\n"
    ));
    assert!(unit.implementation.contains("::java::lang::Class *java::lang::StringArray::getClass0()\n"));
}

#[test]
fn the_object_array_is_a_root() {
    let mut fixture = Fixture::new();
    let objects = fixture.array_of(fixture.object);
    let comparables = fixture.array_of(fixture.comparable);

    let unit = emit_array_unit(fixture.ctx(), objects).unwrap();
    assert!(unit.header.contains("class ObjectArray"));
    assert!(unit.referenced_arrays.is_empty());

    // Interfaces without superinterfaces still derive from Object[]
    let unit = emit_array_unit(fixture.ctx(), comparables).unwrap();
    assert_eq!(unit.referenced_arrays, vec![objects]);
    assert!(unit.header.contains("    : public virtual ObjectArray\n{"));
}

#[test]
fn primitive_arrays_share_one_definition() {
    let mut fixture = Fixture::new();
    let int = fixture.int();
    let ints = fixture.array_of(int);

    let unit = emit_array_unit(fixture.ctx(), ints).unwrap();
    assert!(unit.header.contains("class PrimitiveArray"));
    assert_eq!(unit.header_path, PathBuf::from("int32_tArray.h"));
    assert_eq!(unit.impl_path, PathBuf::from("int32_tArray.cpp"));
    assert!(unit.implementation.contains("::class_(L\"[I\")"));
    assert!(unit.referenced_arrays.is_empty());
}

#[test]
fn nested_arrays_reference_their_component_array() {
    let mut fixture = Fixture::new();
    let int = fixture.int();
    let ints = fixture.array_of(int);
    let grid = fixture.array_of(ints);
    fixture.types.complete_array_types().unwrap();
    let objects = fixture.types.array_of(fixture.object).unwrap();

    let unit = emit_array_unit(fixture.ctx(), grid).unwrap();
    assert_eq!(unit.referenced_arrays, vec![objects, ints]);
    assert!(unit.header.contains("#include \"int32_tArray.h\"\n#include \"java/lang/ObjectArray.h\"\n"));
    assert!(unit.header.contains("class int32_tArrayArray\n    : public virtual ::java::lang::ObjectArray\n{"));
    assert!(unit.header.contains("    typedef int32_tArray value_type;\n"));
    assert!(unit.implementation.contains("::class_(L\"[[I\")"));
}

#[test]
fn base_arrays_must_be_registered_first() {
    let mut fixture = Fixture::new();
    let strings = fixture.array_of(fixture.string);

    let error = emit_array_unit(fixture.ctx(), strings).unwrap_err();
    assert_eq!(error.error_type, ErrorType::BindingGap);
}

#[test]
fn only_array_types_get_array_units() {
    let fixture = Fixture::new();
    let error = emit_array_unit(fixture.ctx(), fixture.string).unwrap_err();
    assert_eq!(error.error_type, ErrorType::Compiler);
}

#[test]
fn descriptors_follow_the_jvm_format() {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class("p", "Outer");
    let inner = fixture.types.insert(
        ResolvedType::class("p", "Inner")
            .with_modifiers(Modifiers::STATIC)
            .nested_in(outer, "p.Outer"),
    );
    let booleans = fixture.array_of(fixture.boolean());
    let null = fixture.types.null_type().unwrap();
    let ctx = fixture.ctx();

    assert_eq!(type_descriptor(ctx, fixture.primitive(PrimitiveCode::Long)).unwrap(), "J");
    assert_eq!(type_descriptor(ctx, booleans).unwrap(), "[Z");
    assert_eq!(type_descriptor(ctx, fixture.string).unwrap(), "Ljava.lang.String;");
    assert_eq!(type_descriptor(ctx, inner).unwrap(), "Lp.Outer$Inner;");
    assert_eq!(type_descriptor(ctx, null).unwrap_err().error_type, ErrorType::Compiler);
}
