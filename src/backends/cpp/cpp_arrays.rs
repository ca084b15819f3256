//! Array type synthesis.
//!
//! Primitive arrays and the object array come from fixed resources. Every other
//! reference array derives virtually from the arrays of its element's supertypes,
//! so `String[]` converts to `Object[]` and `Comparable[]` the way Java allows.

use crate::array_log;
use crate::backends::cpp::cpp_impl::{runtime_class_name, source_banner};
use crate::backends::cpp::cpp_names::{
    include_path, namespace_components, qualified_name, relative_name, simple_name,
};
use crate::backends::cpp::{CodeBuffer, EmittedUnit, TranslationContext};
use crate::frontend_model::types::{PrimitiveCode, TypeId, TypeKind};
use crate::translator_messages::translator_errors::TranslatorError;
use std::collections::BTreeSet;

const PRIMITIVE_ARRAYS: &str = include_str!("../../../resources/Array.h");
const OBJECT_ARRAY: &str = include_str!("../../../resources/ObjectArray.h");
const SUB_ARRAY_TEMPLATE: &str = include_str!("../../../resources/SubArray.h.tmpl");

/// Header and implementation of one array type
pub fn emit_array_unit(ctx: TranslationContext, array: TypeId) -> Result<EmittedUnit, TranslatorError> {
    let resolved = ctx.ty(array)?;
    let TypeKind::Array { component } = resolved.kind else {
        return Err(TranslatorError::compiler_error(format!(
            "{} is not an array type",
            resolved.binding_key
        )));
    };

    let component_type = ctx.ty(component)?;
    let base_arrays = base_arrays(ctx, array)?;

    let header = if component_type.is_primitive() {
        PRIMITIVE_ARRAYS.to_owned()
    } else if Some(component) == ctx.types.object() {
        OBJECT_ARRAY.to_owned()
    } else {
        sub_array_header(ctx, array, component, &base_arrays)?
    };

    let implementation = array_implementation(ctx, array, component)?;

    let array_key = &resolved.binding_key;
    let base_count = base_arrays.len();
    array_log!("Array ", Bright array_key, " derives from ", base_count, " arrays");

    let mut referenced_arrays = base_arrays;
    if component_type.is_array() && !referenced_arrays.contains(&component) {
        referenced_arrays.push(component);
    }

    EmittedUnit::new(ctx, array, header, implementation, referenced_arrays)
}

// Array types the given array derives from. The object array stands in
// for a missing superclass array.
fn base_arrays(ctx: TranslationContext, array: TypeId) -> Result<Vec<TypeId>, TranslatorError> {
    let mut bases = Vec::new();
    for base_component in ctx.types.array_base_components(array)? {
        let base = ctx.types.array_of(base_component).ok_or_else(|| {
            TranslatorError::binding_gap(format!(
                "Array of {} was never registered",
                ctx.types
                    .get(base_component)
                    .map(|resolved| resolved.binding_key.to_owned())
                    .unwrap_or_default()
            ))
        })?;

        if !bases.contains(&base) {
            bases.push(base);
        }
    }
    Ok(bases)
}

fn sub_array_header(
    ctx: TranslationContext,
    array: TypeId,
    component: TypeId,
    base_arrays: &[TypeId],
) -> Result<String, TranslatorError> {
    let Some(first_base) = base_arrays.first() else {
        return Err(TranslatorError::compiler_error(format!(
            "{} has no base array",
            ctx.ty(array)?.binding_key
        )));
    };

    let mut includes = BTreeSet::new();
    includes.insert(include_path(ctx.types, component)?);
    for base in base_arrays {
        includes.insert(include_path(ctx.types, *base)?);
    }
    let includes = includes
        .iter()
        .map(|path| format!("#include \"{}\"", path))
        .collect::<Vec<_>>()
        .join("\n");

    let indent = ctx.settings.indent_unit();
    let mut bases = String::new();
    for (index, base) in base_arrays.iter().enumerate() {
        let separator = if index == 0 { ":" } else { "," };
        bases.push_str(&format!(
            "{}{} public virtual {}\n",
            indent,
            separator,
            relative_name(ctx.types, *base, array)?
        ));
    }

    let namespace = namespace_components(ctx.types, array)?;
    let namespace_open = namespace
        .iter()
        .map(|component| format!("namespace {} {{\n", component))
        .collect::<String>();
    let namespace_close = namespace
        .iter()
        .rev()
        .map(|component| format!("}} // namespace {}\n", component))
        .collect::<String>();
    let namespace_open = if namespace.is_empty() {
        namespace_open
    } else {
        namespace_open + "\n"
    };
    let namespace_close = if namespace.is_empty() {
        namespace_close
    } else {
        format!("\n{}", namespace_close)
    };

    Ok(SUB_ARRAY_TEMPLATE
        .replace("${includes}", &includes)
        .replace("${namespace_open}", &namespace_open)
        .replace("${namespace_close}", &namespace_close)
        .replace("${bases}", &bases)
        .replace("${super}", &relative_name(ctx.types, *first_base, array)?)
        .replace("${element}", &relative_name(ctx.types, component, array)?)
        .replace("${name}", &simple_name(ctx.types, array)?))
}

fn array_implementation(
    ctx: TranslationContext,
    array: TypeId,
    component: TypeId,
) -> Result<String, TranslatorError> {
    let qualified = qualified_name(ctx.types, array)?;
    let runtime_name = format!("[{}", type_descriptor(ctx, component)?);

    let mut buffer = CodeBuffer::new(ctx.settings);
    if let Some(banner) = source_banner(ctx, array)? {
        buffer.emit_line(&banner);
    }
    buffer.emit_line(&format!("#include \"{}\"", include_path(ctx.types, array)?));
    buffer.emit_line(&format!("#include \"{}\"", ctx.settings.preamble_header));
    buffer.blank_line();

    buffer.emit_line(&format!("::java::lang::Class *{}::class_()", qualified));
    buffer.emit_line("{");
    buffer.indent += 1;
    buffer.emit_line(&format!(
        "static ::java::lang::Class *c = ::class_(L\"{}\");",
        runtime_name
    ));
    buffer.emit_line("return c;");
    buffer.indent -= 1;
    buffer.emit_line("}");
    buffer.blank_line();

    buffer.emit_line(&format!("::java::lang::Class *{}::getClass0()", qualified));
    buffer.emit_line("{");
    buffer.indent += 1;
    buffer.emit_line("return class_();");
    buffer.indent -= 1;
    buffer.emit_line("}");

    Ok(buffer.into_string())
}

/// JVM field descriptor, as used in the runtime names of array classes
pub(crate) fn type_descriptor(ctx: TranslationContext, id: TypeId) -> Result<String, TranslatorError> {
    match ctx.ty(id)?.kind {
        TypeKind::Primitive(code) => Ok(primitive_descriptor(code).to_owned()),
        TypeKind::Array { component } => Ok(format!("[{}", type_descriptor(ctx, component)?)),
        TypeKind::Null => Err(TranslatorError::compiler_error(
            "The null type has no descriptor",
        )),
        _ => Ok(format!("L{};", runtime_class_name(ctx, id)?)),
    }
}

fn primitive_descriptor(code: PrimitiveCode) -> &'static str {
    match code {
        PrimitiveCode::Boolean => "Z",
        PrimitiveCode::Byte => "B",
        PrimitiveCode::Char => "C",
        PrimitiveCode::Double => "D",
        PrimitiveCode::Float => "F",
        PrimitiveCode::Int => "I",
        PrimitiveCode::Long => "J",
        PrimitiveCode::Short => "S",
        PrimitiveCode::Void => "V",
    }
}
