//! Constructor synthesis.
//!
//! A Java constructor becomes a C++ constructor that only runs the member initializers
//! (superclass, outer instance, captured variables) and a `_construct` method holding
//! the body. Types without a declared constructor get a synthetic one, anonymous types
//! re-declare every constructor of their superclass.

use crate::backends::cpp::cpp_dependencies::UsageKind;
use crate::backends::cpp::cpp_names::{
    declaration, field_name, outer_this_name, qualified_name, sanitize_identifier, simple_name,
};
use crate::backends::cpp::{ClosureSet, CppEmitter, TranslationContext};
use crate::frontend_model::syntax::{BodyDeclaration, Expression, MethodDeclaration, Statement, TypeDeclaration};
use crate::frontend_model::types::{AccessLevel, MethodRef, TypeId};
use crate::translator_messages::translator_errors::TranslatorError;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ConstructorShape<'a> {
    Declared(&'a MethodDeclaration),

    /// Implicit no-argument constructor
    Synthetic,

    /// Anonymous type re-declaring a superclass constructor
    Forwarding(MethodRef),
}

impl ConstructorShape<'_> {
    pub(crate) fn access(&self, ctx: TranslationContext) -> Result<AccessLevel, TranslatorError> {
        match self {
            ConstructorShape::Declared(method) => Ok(ctx.types.method(method.method)?.modifiers.access()),
            _ => Ok(AccessLevel::Public),
        }
    }

    pub(crate) fn has_construct_body(&self) -> bool {
        matches!(self, ConstructorShape::Declared(_))
    }
}

/// Constructors a type ends up with, in declaration order
pub(crate) fn constructor_plan<'a>(
    ctx: TranslationContext,
    declaration: &'a TypeDeclaration,
) -> Result<Vec<ConstructorShape<'a>>, TranslatorError> {
    let resolved = ctx.ty(declaration.binding)?;
    if resolved.is_interface() {
        return Ok(Vec::new());
    }

    let mut declared = Vec::new();
    for body_declaration in &declaration.body {
        if let BodyDeclaration::Method(method) = body_declaration
            && ctx.types.method(method.method)?.is_constructor
        {
            declared.push(ConstructorShape::Declared(method));
        }
    }

    if !declared.is_empty() {
        return Ok(declared);
    }

    if resolved.is_anonymous
        && let Some(superclass) = resolved.superclass
    {
        let inherited = ctx
            .ty(superclass)?
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| method.is_constructor && !method.modifiers.is_private())
            .map(|(index, _)| {
                ConstructorShape::Forwarding(MethodRef {
                    owner: superclass,
                    index: index as u32,
                })
            })
            .collect::<Vec<_>>();

        if !inherited.is_empty() {
            return Ok(inherited);
        }
    }

    Ok(vec![ConstructorShape::Synthetic])
}

/// Java-visible parameters of a constructor as (type, C++ name)
pub(crate) fn user_parameters(
    ctx: TranslationContext,
    shape: &ConstructorShape,
) -> Result<Vec<(TypeId, String)>, TranslatorError> {
    match shape {
        ConstructorShape::Declared(method) => {
            let mut parameters = Vec::with_capacity(method.parameters.len());
            for parameter in &method.parameters {
                let binding = ctx.variable(*parameter)?;
                parameters.push((binding.ty, sanitize_identifier(&binding.name)));
            }
            Ok(parameters)
        }
        ConstructorShape::Synthetic => Ok(Vec::new()),
        ConstructorShape::Forwarding(inherited) => Ok(ctx
            .types
            .method(*inherited)?
            .parameters
            .iter()
            .enumerate()
            .map(|(index, ty)| (*ty, format!("a{}", index)))
            .collect()),
    }
}

/// Parameters every constructor of the type takes before its Java parameters:
/// the enclosing instance, then the captured variables
pub(crate) fn prefix_parameters(
    ctx: TranslationContext,
    type_id: TypeId,
    closures: &ClosureSet,
) -> Result<Vec<(TypeId, String)>, TranslatorError> {
    let resolved = ctx.ty(type_id)?;
    let mut parameters = Vec::new();

    if resolved.has_outer_instance()
        && let Some(declaring) = resolved.declaring_class
    {
        parameters.push((declaring, outer_this_name(ctx.types, type_id)?));
    }

    for variable in closures.iter() {
        let binding = ctx.variable(variable)?;
        parameters.push((binding.ty, field_name(&binding.name)));
    }

    Ok(parameters)
}

pub(crate) fn render_parameters(
    ctx: TranslationContext,
    type_id: TypeId,
    parameters: &[(TypeId, String)],
) -> Result<String, TranslatorError> {
    let mut rendered = Vec::with_capacity(parameters.len());
    for (ty, name) in parameters {
        rendered.push(declaration(ctx.types, *ty, type_id, name)?);
    }
    Ok(rendered.join(", "))
}

/// Everything about one constructor except its final parameter list,
/// which waits until the closure set is complete
pub(crate) struct ConstructorParts {
    parameters: Vec<(TypeId, String)>,
    super_initializer: Option<String>,
    calls_construct: bool,
    pub(crate) construct_definition: Option<String>,
}

impl<'a> CppEmitter<'a> {
    pub(crate) fn emit_constructor(
        &mut self,
        shape: ConstructorShape<'a>,
    ) -> Result<ConstructorParts, TranslatorError> {
        let parameters = user_parameters(self.ctx, &shape)?;
        for (ty, _) in &parameters {
            self.deps
                .classify_declared(self.ctx.types, *ty, UsageKind::ByValueParam)?;
        }

        match shape {
            ConstructorShape::Declared(method) => {
                let statements = method
                    .body
                    .as_ref()
                    .map(|body| body.statements.as_slice())
                    .unwrap_or_default();

                let (super_initializer, rest) = match statements.first() {
                    Some(Statement::SuperConstructorCall {
                        constructor,
                        outer,
                        arguments,
                    }) => (
                        self.super_initializer(Some(*constructor), outer.as_ref(), arguments)?,
                        &statements[1..],
                    ),
                    _ => (self.super_initializer(None, None, &[])?, statements),
                };

                let delegates = matches!(statements.first(), Some(Statement::ConstructorCall { .. }));
                let construct_definition = self.emit_construct_body(&parameters, rest, delegates)?;

                Ok(ConstructorParts {
                    parameters,
                    super_initializer,
                    calls_construct: true,
                    construct_definition: Some(construct_definition),
                })
            }

            ConstructorShape::Synthetic => Ok(ConstructorParts {
                parameters,
                super_initializer: self.super_initializer(None, None, &[])?,
                calls_construct: false,
                construct_definition: None,
            }),

            ConstructorShape::Forwarding(inherited) => {
                let mut initializer = self.super_prefix(inherited.owner, None)?;
                initializer.extend(parameters.iter().map(|(_, name)| name.to_owned()));

                Ok(ConstructorParts {
                    parameters,
                    super_initializer: Some(format!("super({})", initializer.join(", "))),
                    calls_construct: false,
                    construct_definition: None,
                })
            }
        }
    }

    fn emit_construct_body(
        &mut self,
        parameters: &[(TypeId, String)],
        statements: &'a [Statement],
        delegates: bool,
    ) -> Result<String, TranslatorError> {
        let signature = format!(
            "void {}::_construct({})",
            qualified_name(self.ctx.types, self.type_id)?,
            render_parameters(self.ctx, self.type_id, parameters)?
        );

        self.capture(|emitter| {
            emitter.emit_line(&signature);
            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                if !delegates && emitter.has_instance_initializer {
                    emitter.emit_line("_init();");
                }
                for statement in statements {
                    emitter.emit_statement(statement)?;
                }
                Ok(())
            })?;
            emitter.emit_line("}");
            Ok(())
        })
    }

    /// `super(...)` member initializer. An implicit `super()` only needs one when the
    /// superclass takes an enclosing instance or captured variables.
    fn super_initializer(
        &mut self,
        constructor: Option<MethodRef>,
        outer: Option<&'a Expression>,
        arguments: &'a [Expression],
    ) -> Result<Option<String>, TranslatorError> {
        let superclass = match constructor {
            Some(constructor) => constructor.owner,
            None => match self.current()?.superclass {
                Some(superclass) => superclass,
                None => return Ok(None),
            },
        };

        let mut initializer = self.super_prefix(superclass, outer)?;

        if let Some(constructor) = constructor {
            let binding = self.ctx.types.method(constructor)?;
            let arguments = self.lower_arguments(constructor, binding, arguments)?;
            if !arguments.is_empty() {
                initializer.push(arguments);
            }
        } else if initializer.is_empty() {
            return Ok(None);
        }

        self.deps
            .classify(self.ctx.types, superclass, UsageKind::BaseClass)?;
        Ok(Some(format!("super({})", initializer.join(", "))))
    }

    // Enclosing instance and captured variables the superclass constructor expects.
    // Inside the member initializer list these names resolve to constructor parameters.
    fn super_prefix(
        &mut self,
        superclass: TypeId,
        outer: Option<&'a Expression>,
    ) -> Result<Vec<String>, TranslatorError> {
        let resolved = self.ctx.ty(superclass)?;
        let mut prefix = Vec::new();

        if resolved.has_outer_instance() {
            let outer_instance = match (outer, resolved.declaring_class) {
                (Some(outer), _) => self.lower_expr(outer)?,
                (None, Some(declaring)) => self.enclosing_instance_path(declaring, false)?,
                (None, None) => {
                    return Err(TranslatorError::compiler_error(
                        "Superclass expects an enclosing instance but has no enclosing type",
                    ));
                }
            };
            prefix.push(outer_instance);
        }

        if let Some(closures) = self.closures_of(superclass)? {
            prefix.extend(self.closure_arguments(&closures)?);
        }

        Ok(prefix)
    }

    /// Out-of-line C++ constructor, rendered once the closure set is final
    pub(crate) fn render_constructor(&mut self, parts: &ConstructorParts) -> Result<String, TranslatorError> {
        let closures = self.closures.clone().unwrap_or_default();
        let prefix = prefix_parameters(self.ctx, self.type_id, &closures)?;
        for (ty, _) in &prefix {
            self.deps
                .classify_declared(self.ctx.types, *ty, UsageKind::ByValueParam)?;
        }

        let mut parameters = prefix.clone();
        parameters.extend(parts.parameters.iter().cloned());

        let mut initializers = Vec::with_capacity(prefix.len() + 1);
        if let Some(super_initializer) = &parts.super_initializer {
            initializers.push(super_initializer.to_owned());
        }
        for (_, name) in &prefix {
            initializers.push(format!("{}({})", name, name));
        }

        let class_name = simple_name(self.ctx.types, self.type_id)?;
        let qualified = qualified_name(self.ctx.types, self.type_id)?;
        let rendered_parameters = render_parameters(self.ctx, self.type_id, &parameters)?;

        self.capture(|emitter| {
            emitter.emit_line(&format!("{}::{}({})", qualified, class_name, rendered_parameters));

            for (index, initializer) in initializers.iter().enumerate() {
                let separator = if index == 0 { ":" } else { "," };
                emitter.with_indent(|emitter| {
                    emitter.emit_line(&format!("{} {}", separator, initializer));
                    Ok(())
                })?;
            }

            emitter.emit_line("{");
            emitter.with_indent(|emitter| {
                if parts.calls_construct {
                    let arguments = parts
                        .parameters
                        .iter()
                        .map(|(_, name)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    emitter.emit_line(&format!("_construct({});", arguments));
                } else if emitter.has_instance_initializer {
                    emitter.emit_line("_init();");
                }
                Ok(())
            })?;
            emitter.emit_line("}");
            Ok(())
        })
    }
}
