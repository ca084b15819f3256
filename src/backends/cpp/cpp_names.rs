//! Java bindings to C++ spellings.
//!
//! Nested, local and anonymous types are flattened into their top-level namespace
//! (`Outer_Inner`, `Outer_method`), arrays become `<Component>Array` in the namespace of
//! their element type, and packages become nested namespaces.

use crate::frontend_model::types::{PrimitiveCode, TypeId, TypeKind, TypeTable};
use crate::projects::settings::{HEADER_EXTENSION, IMPL_EXTENSION};
use crate::translator_messages::translator_errors::TranslatorError;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

pub(crate) const OUTER_THIS_SUFFIX: &str = "_this";
pub(crate) const ARRAY_SUFFIX: &str = "Array";

pub fn primitive_spelling(code: PrimitiveCode) -> &'static str {
    match code {
        PrimitiveCode::Boolean => "bool",
        PrimitiveCode::Byte => "int8_t",
        PrimitiveCode::Char => "wchar_t",
        PrimitiveCode::Double => "double",
        PrimitiveCode::Float => "float",
        PrimitiveCode::Int => "int32_t",
        PrimitiveCode::Long => "int64_t",
        PrimitiveCode::Short => "int16_t",
        PrimitiveCode::Void => "void",
    }
}

/// Spelling for a primitive keyword coming straight from a front-end document
pub fn primitive_spelling_for_keyword(keyword: &str) -> Result<&'static str, TranslatorError> {
    match PrimitiveCode::from_keyword(keyword) {
        Some(code) => Ok(primitive_spelling(code)),
        None => Err(TranslatorError::compiler_error(format!(
            "Unrecognized primitive type code '{}'",
            keyword
        ))),
    }
}

/// Unqualified C++ class name of a type
pub fn simple_name(types: &TypeTable, id: TypeId) -> Result<String, TranslatorError> {
    let resolved = types.get(id)?;

    match resolved.kind {
        TypeKind::Primitive(code) => Ok(primitive_spelling(code).to_owned()),
        TypeKind::Null => Ok(String::from("void")),
        TypeKind::Array { component } => {
            Ok(format!("{}{}", simple_name(types, component)?, ARRAY_SUFFIX))
        }
        _ => {
            let Some(declaring) = resolved.declaring_class else {
                return Ok(sanitize_identifier(&resolved.name));
            };

            let declaring_name = simple_name(types, declaring)?;
            if resolved.is_anonymous || resolved.name.is_empty() {
                let method = match &resolved.declaring_method {
                    Some(method) => method.to_owned(),
                    None => format!("m{}", short_hash(&resolved.binding_key)),
                };

                return Ok(format!("{}_{}", declaring_name, method));
            }

            Ok(format!("{}_{}", declaring_name, resolved.name))
        }
    }
}

/// Hex digest used when a synthesized name has nothing better to go on
pub(crate) fn short_hash(key: &str) -> String {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    format!("{:x}", hasher.finish() & 0xffff_ffff)
}

/// Namespace components of a type: the package of its outermost type,
/// or of the element type for arrays
pub fn namespace_components(types: &TypeTable, id: TypeId) -> Result<Vec<String>, TranslatorError> {
    let element = types.element_type(id)?;
    if types.get(element)?.is_primitive() {
        return Ok(Vec::new());
    }

    let outermost = types.outermost(element)?;
    let components = match &types.get(outermost)?.package {
        Some(package) if !package.is_empty() => package
            .split('.')
            .map(sanitize_identifier)
            .collect::<Vec<_>>(),
        _ => Vec::new(),
    };

    Ok(components)
}

/// `p::q::Foo`, or just the simple name for types without a namespace
pub fn qualified_name(types: &TypeTable, id: TypeId) -> Result<String, TranslatorError> {
    let mut components = namespace_components(types, id)?;
    components.push(simple_name(types, id)?);
    Ok(components.join("::"))
}

/// Fully qualified from the global namespace, `::p::q::Foo`
pub fn global_name(types: &TypeTable, id: TypeId) -> Result<String, TranslatorError> {
    if types.get(id)?.is_primitive() {
        return simple_name(types, id);
    }

    Ok(format!("::{}", qualified_name(types, id)?))
}

/// Name of `id` as written from inside `context`.
///
/// The longest common namespace prefix is dropped. Without any common prefix
/// the name is written from the global namespace.
pub fn relative_name(types: &TypeTable, id: TypeId, context: TypeId) -> Result<String, TranslatorError> {
    if types.get(id)?.is_primitive() {
        return simple_name(types, id);
    }

    let target = namespace_components(types, id)?;
    let from = namespace_components(types, context)?;

    let common = target
        .iter()
        .zip(from.iter())
        .take_while(|(left, right)| left == right)
        .count();

    // Types in the global namespace are written as-is from the global namespace
    if common == 0 && !(target.is_empty() && from.is_empty()) {
        return global_name(types, id);
    }

    let mut components = target[common..].to_vec();
    components.push(simple_name(types, id)?);
    Ok(components.join("::"))
}

/// `p/q/Foo.h`
pub fn header_name(types: &TypeTable, id: TypeId) -> Result<PathBuf, TranslatorError> {
    file_name(types, id, HEADER_EXTENSION)
}

/// `p/q/Foo.cpp`
pub fn impl_name(types: &TypeTable, id: TypeId) -> Result<PathBuf, TranslatorError> {
    file_name(types, id, IMPL_EXTENSION)
}

fn file_name(types: &TypeTable, id: TypeId, extension: &str) -> Result<PathBuf, TranslatorError> {
    let mut path = PathBuf::new();
    for component in namespace_components(types, id)? {
        path.push(component);
    }

    path.push(format!("{}.{}", simple_name(types, id)?, extension));
    Ok(path)
}

/// Include path with forward slashes on every platform
pub fn include_path(types: &TypeTable, id: TypeId) -> Result<String, TranslatorError> {
    let mut components = namespace_components(types, id)?;
    components.push(format!("{}.{}", simple_name(types, id)?, HEADER_EXTENSION));
    Ok(components.join("/"))
}

/// `*` for reference types, nothing for primitives
pub fn reference_suffix(types: &TypeTable, id: TypeId) -> Result<&'static str, TranslatorError> {
    if types.get(id)?.is_primitive() {
        Ok("")
    } else {
        Ok("*")
    }
}

/// `Foo *name` or `int32_t name`, relative to `context`
pub fn declaration(
    types: &TypeTable,
    ty: TypeId,
    context: TypeId,
    name: &str,
) -> Result<String, TranslatorError> {
    let type_name = relative_name(types, ty, context)?;
    if types.get(ty)?.is_primitive() {
        Ok(format!("{} {}", type_name, name))
    } else {
        Ok(format!("{} *{}", type_name, name))
    }
}

/// `Foo*` or `int32_t`, for casts and template arguments
pub fn value_type(types: &TypeTable, ty: TypeId, context: TypeId) -> Result<String, TranslatorError> {
    Ok(format!(
        "{}{}",
        relative_name(types, ty, context)?,
        reference_suffix(types, ty)?
    ))
}

/// Return type of an out-of-line definition, written before the qualified declarator
pub fn global_value_type(types: &TypeTable, ty: TypeId) -> Result<String, TranslatorError> {
    let resolved = types.get(ty)?;
    if resolved.is_primitive() {
        return simple_name(types, ty);
    }

    Ok(format!("{} *", global_name(types, ty)?))
}

/// Fields get a trailing underscore so they never collide with methods of the same name
pub fn field_name(name: &str) -> String {
    format!("{}_", name)
}

/// Member holding the enclosing instance of `id`
pub fn outer_this_name(types: &TypeTable, id: TypeId) -> Result<String, TranslatorError> {
    let Some(declaring) = types.get(id)?.declaring_class else {
        return Err(TranslatorError::compiler_error(format!(
            "{} has no enclosing type",
            types.get(id)?.binding_key
        )));
    };

    Ok(format!("{}{}", simple_name(types, declaring)?, OUTER_THIS_SUFFIX))
}

pub fn sanitize_identifier(raw: &str) -> String {
    let mut identifier = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>();

    if identifier.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }

    if is_cpp_reserved(&identifier) {
        identifier.push('_');
    }

    identifier
}

pub fn is_cpp_reserved(identifier: &str) -> bool {
    matches!(
        identifier,
        "alignas"
            | "alignof"
            | "and"
            | "and_eq"
            | "asm"
            | "auto"
            | "bitand"
            | "bitor"
            | "bool"
            | "char"
            | "char16_t"
            | "char32_t"
            | "compl"
            | "const"
            | "const_cast"
            | "constexpr"
            | "decltype"
            | "delete"
            | "dynamic_cast"
            | "explicit"
            | "export"
            | "extern"
            | "friend"
            | "inline"
            | "int"
            | "mutable"
            | "namespace"
            | "noexcept"
            | "not"
            | "not_eq"
            | "nullptr"
            | "operator"
            | "or"
            | "or_eq"
            | "register"
            | "reinterpret_cast"
            | "signed"
            | "sizeof"
            | "static_assert"
            | "static_cast"
            | "struct"
            | "template"
            | "thread_local"
            | "typedef"
            | "typeid"
            | "typename"
            | "union"
            | "unsigned"
            | "using"
            | "virtual"
            | "wchar_t"
            | "xor"
            | "xor_eq"
            | "NULL"
            | "EOF"
            | "errno"
            | "assert"
            | "stdin"
            | "stdout"
            | "stderr"
            | "major"
            | "minor"
    )
}
