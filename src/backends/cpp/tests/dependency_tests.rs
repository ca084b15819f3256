use super::test_support::Fixture;
use crate::backends::cpp::cpp_dependencies::{DependencySet, DependencyStrength, UsageKind};
use crate::frontend_model::types::ResolvedType;

#[test]
fn only_pointer_uses_are_soft() {
    assert_eq!(UsageKind::PointerUse.strength(), DependencyStrength::Soft);

    for usage in [
        UsageKind::BaseClass,
        UsageKind::FieldType,
        UsageKind::ByValueParam,
        UsageKind::MemberAccess,
        UsageKind::ImplicitConversion,
        UsageKind::CovariantReturn,
    ] {
        assert_eq!(usage.strength(), DependencyStrength::Hard, "{:?}", usage);
    }
}

#[test]
fn hard_uses_promote_and_soft_uses_never_demote() {
    let mut fixture = Fixture::new();
    let a = fixture.add_class("p", "A");
    let b = fixture.add_class("p", "B");
    let mut deps = DependencySet::new();

    deps.classify(&fixture.types, a, UsageKind::PointerUse).unwrap();
    assert_eq!(deps.strength(a), Some(DependencyStrength::Soft));
    deps.classify(&fixture.types, a, UsageKind::MemberAccess).unwrap();
    assert_eq!(deps.strength(a), Some(DependencyStrength::Hard));

    deps.classify(&fixture.types, b, UsageKind::BaseClass).unwrap();
    deps.classify(&fixture.types, b, UsageKind::PointerUse).unwrap();
    assert_eq!(deps.strength(b), Some(DependencyStrength::Hard));
    assert_eq!(deps.len(), 2);
}

#[test]
fn primitives_and_null_are_never_recorded() {
    let fixture = Fixture::new();
    let null = fixture.types.null_type().unwrap();
    let mut deps = DependencySet::new();

    deps.classify(&fixture.types, fixture.int(), UsageKind::ByValueParam).unwrap();
    deps.classify(&fixture.types, null, UsageKind::MemberAccess).unwrap();
    deps.classify_declared(&fixture.types, fixture.boolean(), UsageKind::FieldType).unwrap();

    assert!(deps.is_empty());
}

#[test]
fn declared_reference_types_only_need_a_forward_declaration() {
    let fixture = Fixture::new();
    let mut deps = DependencySet::new();

    deps.classify_declared(&fixture.types, fixture.string, UsageKind::FieldType).unwrap();
    assert_eq!(deps.strength(fixture.string), Some(DependencyStrength::Soft));
}

#[test]
fn includes_are_sorted_and_leave_out_the_own_type() {
    let mut fixture = Fixture::new();
    let own = fixture.add_class("p", "Own");
    let zeta = fixture.add_class("p", "Zeta");
    let alpha = fixture.add_class("p", "Alpha");
    let mut deps = DependencySet::new();

    for id in [own, zeta, alpha, fixture.string] {
        deps.classify(&fixture.types, id, UsageKind::MemberAccess).unwrap();
    }
    deps.classify(&fixture.types, fixture.class, UsageKind::PointerUse).unwrap();

    assert_eq!(
        deps.render_includes(&fixture.types, own).unwrap(),
        vec![
            String::from("#include \"java/lang/String.h\""),
            String::from("#include \"p/Alpha.h\""),
            String::from("#include \"p/Zeta.h\""),
        ]
    );
}

#[test]
fn forward_declarations_are_grouped_by_namespace() {
    let mut fixture = Fixture::new();
    let own = fixture.add_class("p", "Own");
    let b = fixture.add_class("p", "B");
    let a = fixture.add_class("p", "A");
    let inner = fixture
        .types
        .insert(ResolvedType::class("p", "Inner").nested_in(b, "p.B"));
    let top = fixture.add_class("", "Top");
    let hard = fixture.add_class("p", "Hard");

    let mut deps = DependencySet::new();
    for id in [own, b, a, inner, top, fixture.class] {
        deps.classify(&fixture.types, id, UsageKind::PointerUse).unwrap();
    }
    deps.classify(&fixture.types, hard, UsageKind::FieldType).unwrap();

    assert_eq!(
        deps.render_forward_declarations(&fixture.types, own).unwrap(),
        vec![
            String::from("class Top;"),
            String::from("namespace java { namespace lang { class Class; }}"),
            String::from("namespace p { class A; class B; class B_Inner; }"),
        ]
    );
}

#[test]
fn referenced_arrays_are_collected_in_id_order() {
    let mut fixture = Fixture::new();
    let strings = fixture.array_of(fixture.string);
    let int = fixture.int();
    let ints = fixture.array_of(int);

    let mut deps = DependencySet::new();
    deps.classify(&fixture.types, ints, UsageKind::MemberAccess).unwrap();
    deps.classify(&fixture.types, fixture.string, UsageKind::MemberAccess).unwrap();
    deps.classify(&fixture.types, strings, UsageKind::PointerUse).unwrap();

    assert_eq!(deps.array_ids(&fixture.types), vec![strings, ints]);
}
