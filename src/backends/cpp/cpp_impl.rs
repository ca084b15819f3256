//! Implementation unit of one type: class literal, constructors, initializers,
//! static field storage, method and bridge definitions.

use crate::backends::cpp::cpp_constructors::constructor_plan;
use crate::backends::cpp::cpp_dependencies::UsageKind;
use crate::backends::cpp::cpp_names::{
    declaration, field_name, global_value_type, include_path, qualified_name, relative_name,
    sanitize_identifier, short_hash, simple_name, value_type,
};
use crate::backends::cpp::{CodeBuffer, CppEmitter, TranslationContext};
use crate::frontend_model::syntax::{
    BodyDeclaration, EnumConstant, Expression, MethodDeclaration, TypeDeclaration,
};
use crate::frontend_model::types::{BridgeMethod, MethodRef, Modifiers, PrimitiveCode, TypeId, TypeKind};
use crate::frontend_model::variables::{VarId, VariableBinding};
use crate::translator_messages::translator_errors::TranslatorError;

pub(crate) const CLASS_KEY: &str = "java.lang.Class";
pub(crate) const STATIC_INITIALIZER: &str = "staticInitializer";

/// Static final primitives with a constant value are initialized in the class definition
pub(crate) fn is_inline_constant(
    ctx: TranslationContext,
    variable: &VariableBinding,
) -> Result<bool, TranslatorError> {
    if !variable.modifiers.is_static() || !variable.modifiers.is_final() || variable.constant.is_none() {
        return Ok(false);
    }

    Ok(matches!(
        ctx.ty(variable.ty)?.kind,
        TypeKind::Primitive(
            PrimitiveCode::Int
                | PrimitiveCode::Char
                | PrimitiveCode::Long
                | PrimitiveCode::Byte
                | PrimitiveCode::Short
                | PrimitiveCode::Boolean
        )
    ))
}

pub(crate) fn has_instance_initializer(
    ctx: TranslationContext,
    declaration: &TypeDeclaration,
) -> Result<bool, TranslatorError> {
    for body_declaration in &declaration.body {
        match body_declaration {
            BodyDeclaration::Initializer(initializer) if !initializer.is_static => return Ok(true),
            BodyDeclaration::Field(field) => {
                for fragment in &field.fragments {
                    if fragment.initializer.is_some()
                        && !ctx.variable(fragment.variable)?.modifiers.is_static()
                    {
                        return Ok(true);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

pub(crate) fn has_static_initializer(
    ctx: TranslationContext,
    declaration: &TypeDeclaration,
) -> Result<bool, TranslatorError> {
    if !declaration.enum_constants.is_empty() {
        return Ok(true);
    }

    for body_declaration in &declaration.body {
        match body_declaration {
            BodyDeclaration::Initializer(initializer) if initializer.is_static => return Ok(true),
            BodyDeclaration::Field(field) => {
                for fragment in &field.fragments {
                    let binding = ctx.variable(fragment.variable)?;
                    if fragment.initializer.is_some()
                        && binding.modifiers.is_static()
                        && !is_inline_constant(ctx, binding)?
                    {
                        return Ok(true);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

/// Name the runtime reports for the class literal, `p.Outer$Inner` for nested types
pub(crate) fn runtime_class_name(ctx: TranslationContext, id: TypeId) -> Result<String, TranslatorError> {
    let resolved = ctx.ty(id)?;

    let Some(declaring) = resolved.declaring_class else {
        return Ok(match &resolved.package {
            Some(package) if !package.is_empty() => format!("{}.{}", package, resolved.name),
            _ => resolved.name.to_owned(),
        });
    };

    let local_name = if !resolved.name.is_empty() {
        resolved.name.to_owned()
    } else if let Some(method) = &resolved.declaring_method {
        method.to_owned()
    } else {
        short_hash(&resolved.binding_key)
    };

    Ok(format!("{}${}", runtime_class_name(ctx, declaring)?, local_name))
}

/// Declared method an erasure bridge delegates to.
/// None for bridges that only widen the return type, which C++ covariance already covers.
pub(crate) fn bridge_target(
    ctx: TranslationContext,
    type_id: TypeId,
    bridge: &BridgeMethod,
) -> Result<Option<MethodRef>, TranslatorError> {
    let resolved = ctx.ty(type_id)?;

    let candidates = resolved
        .methods
        .iter()
        .enumerate()
        .filter(|(_, method)| {
            !method.is_constructor
                && method.name == bridge.name
                && method.parameters.len() == bridge.parameters.len()
        })
        .collect::<Vec<_>>();

    // Same parameters with another return type: a covariant return, nothing to bridge
    if candidates.iter().any(|(_, method)| {
        method.parameters == bridge.parameters && method.return_type != bridge.return_type
    }) {
        return Ok(None);
    }

    // Every declared parameter has to erase to the bridge's parameter
    let target = candidates.into_iter().find(|(_, method)| {
        method.parameters != bridge.parameters
            && method
                .parameters
                .iter()
                .zip(&bridge.parameters)
                .all(|(declared, erased)| ctx.types.is_subtype(*declared, *erased))
    });

    let Some((index, _)) = target else {
        return Err(TranslatorError::binding_gap(format!(
            "Bridge method {} of {} has no declared method to delegate to",
            bridge.name, resolved.binding_key
        )));
    };

    Ok(Some(MethodRef {
        owner: type_id,
        index: index as u32,
    }))
}

// `::p::Foo *p::Bar::m` or `int32_t p::Bar::m`
fn definition_head(ctx: TranslationContext, return_type: TypeId, declarator: &str) -> Result<String, TranslatorError> {
    let spelled = global_value_type(ctx.types, return_type)?;
    if ctx.ty(return_type)?.is_primitive() {
        Ok(format!("{} {}", spelled, declarator))
    } else {
        Ok(format!("{}{}", spelled, declarator))
    }
}

impl<'a> CppEmitter<'a> {
    pub(crate) fn emit_implementation(&mut self) -> Result<String, TranslatorError> {
        let declaration = self.declaration;
        self.has_instance_initializer = has_instance_initializer(self.ctx, declaration)?;
        self.has_static_initializer = has_static_initializer(self.ctx, declaration)?;

        // Member types capture nothing, so they can go first
        for body_declaration in &declaration.body {
            if let BodyDeclaration::Type(nested) = body_declaration {
                self.emit_nested_type(nested)?;
            }
        }

        let mut sections = vec![self.emit_class_literal()?];

        let mut constructors = Vec::new();
        for shape in constructor_plan(self.ctx, declaration)? {
            constructors.push(self.emit_constructor(shape)?);
        }

        let instance_initializer = if self.has_instance_initializer {
            self.emit_instance_initializer()?
        } else {
            String::new()
        };
        let static_fields = self.emit_static_field_definitions()?;
        let static_initializer = if self.has_static_initializer {
            self.emit_static_initializer()?
        } else {
            String::new()
        };

        let mut methods = Vec::new();
        for body_declaration in &declaration.body {
            if let BodyDeclaration::Method(method) = body_declaration
                && let Some(definition) = self.emit_method(method)?
            {
                methods.push(definition);
            }
        }
        let bridges = self.emit_bridges()?;

        // Every body has been visited, so the closure set is complete
        for parts in &constructors {
            sections.push(self.render_constructor(parts)?);
        }
        sections.extend(
            constructors
                .into_iter()
                .filter_map(|parts| parts.construct_definition),
        );
        sections.push(instance_initializer);
        sections.push(static_fields);
        sections.push(static_initializer);
        sections.extend(methods);
        sections.extend(bridges);

        let body = sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let assembled = self.assemble_implementation(&body)?;
        self.patch_self_instantiations(&assembled)
    }

    fn assemble_implementation(&mut self, body: &str) -> Result<String, TranslatorError> {
        let mut buffer = CodeBuffer::new(self.ctx.settings);

        if let Some(banner) = source_banner(self.ctx, self.type_id)? {
            buffer.emit_line(&banner);
        }
        buffer.emit_line(&format!("#include \"{}\"", include_path(self.ctx.types, self.type_id)?));

        let mut system_includes = Vec::new();
        if body.contains("std::numeric_limits") {
            system_includes.push("#include <limits>");
        }

        let includes = self.deps.render_includes(self.ctx.types, self.type_id)?;
        if !includes.is_empty() || !system_includes.is_empty() {
            buffer.blank_line();
            for include in system_includes {
                buffer.emit_line(include);
            }
            for include in includes {
                buffer.emit_line(&include);
            }
        }

        let forward_declarations = self
            .deps
            .render_forward_declarations(self.ctx.types, self.type_id)?;
        if !forward_declarations.is_empty() {
            buffer.blank_line();
            for forward_declaration in forward_declarations {
                buffer.emit_line(&forward_declaration);
            }
        }

        for helper in self.guards.helper_definitions() {
            buffer.blank_line();
            buffer.emit_lines(helper);
        }

        buffer.blank_line();
        let mut text = buffer.into_string();
        text.push_str(body);
        Ok(text)
    }

    fn emit_class_literal(&mut self) -> Result<String, TranslatorError> {
        if let Some(class) = self.ctx.types.lookup(CLASS_KEY) {
            self.deps
                .classify(self.ctx.types, class, UsageKind::PointerUse)?;
        }

        let qualified = qualified_name(self.ctx.types, self.type_id)?;
        let runtime_name = runtime_class_name(self.ctx, self.type_id)?;
        let is_interface = self.current()?.is_interface();

        self.capture(|emitter| {
            emitter.emit_line(&format!("::java::lang::Class *{}::class_()", qualified));
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                emitter.emit_line(&format!(
                    "static ::java::lang::Class *c = ::class_(L\"{}\");",
                    runtime_name
                ));
                emitter.emit_line("return c;");
                Ok(())
            })?;
            emitter.emit_line("}");

            if !is_interface {
                emitter.emit_line("");
                emitter.emit_line(&format!("::java::lang::Class *{}::getClass0()", qualified));
                emitter.emit_line("{");
                emitter.with_indent(|emitter| {
                    emitter.emit_line("return class_();");
                    Ok(())
                })?;
                emitter.emit_line("}");
            }

            Ok(())
        })
    }

    // Instance field initializers and initializer blocks, in declaration order
    fn emit_instance_initializer(&mut self) -> Result<String, TranslatorError> {
        let declaration = self.declaration;
        let qualified = qualified_name(self.ctx.types, self.type_id)?;

        self.capture(|emitter| {
            emitter.emit_line(&format!("void {}::_init()", qualified));
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                for body_declaration in &declaration.body {
                    match body_declaration {
                        BodyDeclaration::Field(field) => {
                            for fragment in &field.fragments {
                                let Some(initializer) = &fragment.initializer else {
                                    continue;
                                };
                                if emitter.ctx.variable(fragment.variable)?.modifiers.is_static() {
                                    continue;
                                }
                                emitter.emit_field_assignment(fragment.variable, initializer)?;
                            }
                        }
                        BodyDeclaration::Initializer(initializer) if !initializer.is_static => {
                            emitter.emit_line("{");
                            emitter.with_indent(|emitter| emitter.emit_block_statements(&initializer.body))?;
                            emitter.emit_line("}");
                        }
                        _ => {}
                    }
                }
                Ok(())
            })?;
            emitter.emit_line("}");
            Ok(())
        })
    }

    fn emit_field_assignment(
        &mut self,
        field: VarId,
        initializer: &'a Expression,
    ) -> Result<(), TranslatorError> {
        let name = field_name(&self.ctx.variable(field)?.name);
        self.deps
            .classify(self.ctx.types, initializer.ty, UsageKind::ImplicitConversion)?;
        let value = self.lower_expr(initializer)?;
        self.emit_line(&format!("{} = {};", name, value));
        Ok(())
    }

    /// Storage for static fields that are not initialized in the class definition
    fn emit_static_field_definitions(&mut self) -> Result<String, TranslatorError> {
        let mut fields = self
            .declaration
            .enum_constants
            .iter()
            .map(|constant| constant.field)
            .collect::<Vec<_>>();

        for body_declaration in &self.declaration.body {
            if let BodyDeclaration::Field(field) = body_declaration {
                fields.extend(field.fragments.iter().map(|fragment| fragment.variable));
            }
        }

        let qualified = qualified_name(self.ctx.types, self.type_id)?;
        let mut definitions = Vec::new();

        for field in fields {
            let binding = self.ctx.variable(field)?;
            if !binding.modifiers.is_static() || is_inline_constant(self.ctx, binding)? {
                continue;
            }

            self.deps
                .classify_declared(self.ctx.types, binding.ty, UsageKind::FieldType)?;
            let declarator = format!("{}::{}", qualified, field_name(&binding.name));
            definitions.push(format!("{};", definition_head(self.ctx, binding.ty, &declarator)?));
        }

        if definitions.is_empty() {
            return Ok(String::new());
        }
        Ok(definitions.join("\n") + "\n")
    }

    /// One function running enum constants, static field initializers and static blocks
    /// in order, called by a file-local object before anything else in this unit runs
    fn emit_static_initializer(&mut self) -> Result<String, TranslatorError> {
        let declaration = self.declaration;
        let qualified = qualified_name(self.ctx.types, self.type_id)?;
        let initializer_type = format!("{}Initializer", simple_name(self.ctx.types, self.type_id)?);

        self.capture(|emitter| {
            emitter.emit_line(&format!("void {}::{}()", qualified, STATIC_INITIALIZER));
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                for constant in &declaration.enum_constants {
                    let name = field_name(&emitter.ctx.variable(constant.field)?.name);
                    let value = emitter.enum_constant_value(constant)?;
                    emitter.emit_line(&format!("{} = {};", name, value));
                }

                for body_declaration in &declaration.body {
                    match body_declaration {
                        BodyDeclaration::Field(field) => {
                            for fragment in &field.fragments {
                                let Some(initializer) = &fragment.initializer else {
                                    continue;
                                };
                                let binding = emitter.ctx.variable(fragment.variable)?;
                                if !binding.modifiers.is_static() || is_inline_constant(emitter.ctx, binding)? {
                                    continue;
                                }
                                emitter.emit_field_assignment(fragment.variable, initializer)?;
                            }
                        }
                        BodyDeclaration::Initializer(initializer) if initializer.is_static => {
                            emitter.emit_line("{");
                            emitter.with_indent(|emitter| emitter.emit_block_statements(&initializer.body))?;
                            emitter.emit_line("}");
                        }
                        _ => {}
                    }
                }
                Ok(())
            })?;
            emitter.emit_line("}");

            emitter.emit_line("");
            emitter.emit_line("namespace");
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                emitter.emit_line(&format!("struct {}", initializer_type));
                emitter.emit_line("{");
                emitter.with_indent(|emitter| {
                    emitter.emit_line(&format!("{}()", initializer_type));
                    emitter.emit_line("{");
                    emitter.with_indent(|emitter| {
                        emitter.emit_line(&format!("::{}::{}();", qualified, STATIC_INITIALIZER));
                        Ok(())
                    })?;
                    emitter.emit_line("}");
                    Ok(())
                })?;
                emitter.emit_line(&format!("}} {}_instance;", initializer_type));
                Ok(())
            })?;
            emitter.emit_line("}");
            Ok(())
        })
    }

    fn enum_constant_value(&mut self, constant: &'a EnumConstant) -> Result<String, TranslatorError> {
        let class = match &constant.body {
            Some(body) => {
                let closures = self.emit_nested_type(body)?;
                if !closures.is_empty() {
                    return Err(TranslatorError::unsupported(
                        "Enum constant bodies capturing local variables",
                    ));
                }
                body.binding
            }
            None => self.type_id,
        };

        self.deps
            .classify(self.ctx.types, class, UsageKind::MemberAccess)?;

        let arguments = match constant.constructor {
            Some(constructor) => {
                let binding = self.ctx.types.method(constructor)?;
                self.lower_arguments(constructor, binding, &constant.arguments)?
            }
            None => {
                let mut lowered = Vec::with_capacity(constant.arguments.len());
                for argument in &constant.arguments {
                    lowered.push(self.lower_expr(argument)?);
                }
                lowered.join(", ")
            }
        };

        let class_name = relative_name(self.ctx.types, class, self.type_id)?;
        Ok(format!("(new {}({}))", class_name, arguments))
    }

    fn emit_method(&mut self, method: &'a MethodDeclaration) -> Result<Option<String>, TranslatorError> {
        let binding = self.ctx.types.method(method.method)?;
        if binding.is_constructor {
            return Ok(None);
        }

        // Abstract and native methods only have a declaration
        let Some(body) = &method.body else {
            return Ok(None);
        };

        let mut parameters = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            let parameter = self.ctx.variable(*parameter)?;
            self.deps
                .classify_declared(self.ctx.types, parameter.ty, UsageKind::ByValueParam)?;
            parameters.push(declaration(
                self.ctx.types,
                parameter.ty,
                self.type_id,
                &sanitize_identifier(&parameter.name),
            )?);
        }
        self.deps
            .classify_declared(self.ctx.types, binding.return_type, UsageKind::ByValueParam)?;

        let declarator = format!(
            "{}::{}({})",
            qualified_name(self.ctx.types, self.type_id)?,
            sanitize_identifier(&binding.name),
            parameters.join(", ")
        );
        let head = definition_head(self.ctx, binding.return_type, &declarator)?;

        let monitor = if !binding.modifiers.contains(Modifiers::SYNCHRONIZED) {
            None
        } else if binding.modifiers.is_static() {
            if let Some(class) = self.ctx.types.lookup(CLASS_KEY) {
                self.deps
                    .classify(self.ctx.types, class, UsageKind::ImplicitConversion)?;
            }
            Some("class_()")
        } else {
            Some("this")
        };

        let definition = self.capture(|emitter| {
            emitter.emit_line(&head);
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                if let Some(monitor) = monitor {
                    emitter.emit_synchronized_guard(monitor);
                }
                emitter.emit_block_statements(body)
            })?;
            emitter.emit_line("}");
            Ok(())
        })?;

        Ok(Some(definition))
    }

    /// Erasure bridges forward to the declared method, casting what the erasure widened
    fn emit_bridges(&mut self) -> Result<Vec<String>, TranslatorError> {
        let resolved = self.current()?;
        let qualified = qualified_name(self.ctx.types, self.type_id)?;
        let mut definitions = Vec::new();

        for bridge in &resolved.bridge_methods {
            let Some(target) = bridge_target(self.ctx, self.type_id, bridge)? else {
                continue;
            };
            let target_binding = self.ctx.types.method(target)?;

            let mut parameters = Vec::with_capacity(bridge.parameters.len());
            let mut arguments = Vec::with_capacity(bridge.parameters.len());

            for (index, (bridge_type, target_type)) in bridge
                .parameters
                .iter()
                .zip(target_binding.parameters.iter())
                .enumerate()
            {
                let name = format!("a{}", index);
                self.deps
                    .classify_declared(self.ctx.types, *bridge_type, UsageKind::ByValueParam)?;
                parameters.push(declaration(self.ctx.types, *bridge_type, self.type_id, &name)?);

                if bridge_type == target_type {
                    arguments.push(name);
                } else if self.ctx.ty(*target_type)?.is_primitive() {
                    let target_type = value_type(self.ctx.types, *target_type, self.type_id)?;
                    arguments.push(format!("static_cast<{}>({})", target_type, name));
                } else {
                    self.deps
                        .classify(self.ctx.types, *target_type, UsageKind::MemberAccess)?;
                    self.deps
                        .classify(self.ctx.types, *bridge_type, UsageKind::MemberAccess)?;
                    let target_type = value_type(self.ctx.types, *target_type, self.type_id)?;
                    arguments.push(format!("dynamic_cast<{}>({})", target_type, name));
                }
            }

            self.deps
                .classify_declared(self.ctx.types, bridge.return_type, UsageKind::ByValueParam)?;
            self.deps
                .classify(self.ctx.types, target_binding.return_type, UsageKind::ImplicitConversion)?;

            let name = sanitize_identifier(&bridge.name);
            let declarator = format!("{}::{}({})", qualified, name, parameters.join(", "));
            let head = definition_head(self.ctx, bridge.return_type, &declarator)?;

            let call = format!("{}({})", name, arguments.join(", "));
            let returns_value = !matches!(
                self.ctx.ty(bridge.return_type)?.kind,
                TypeKind::Primitive(PrimitiveCode::Void)
            );

            definitions.push(self.capture(|emitter| {
                emitter.emit_line(&head);
                emitter.emit_line("{");
                emitter.with_indent(|emitter| {
                    if returns_value {
                        emitter.emit_line(&format!("return {};", call));
                    } else {
                        emitter.emit_line(&format!("{};", call));
                    }
                    Ok(())
                })?;
                emitter.emit_line("}");
                Ok(())
            })?);
        }

        Ok(definitions)
    }
}

/// `// Generated from <source>` for the file a type was declared in
pub(crate) fn source_banner(ctx: TranslationContext, id: TypeId) -> Result<Option<String>, TranslatorError> {
    if !ctx.settings.source_banner {
        return Ok(None);
    }

    let outermost = ctx.types.outermost(id)?;
    let source = ctx
        .ty(id)?
        .source_path
        .as_ref()
        .or(ctx.ty(outermost)?.source_path.as_ref());

    Ok(source.map(|source| format!("// Generated from {}", source)))
}
