//! Class declarations.
//!
//! The header is emitted after the implementation, so it can declare what the
//! implementation pass discovered: captured variables, initializer hooks and the
//! nested types that need friendship.

use crate::backends::cpp::cpp_constructors::{
    constructor_plan, prefix_parameters, render_parameters, user_parameters,
};
use crate::backends::cpp::cpp_dependencies::{DependencySet, UsageKind};
use crate::backends::cpp::cpp_expr::constant_literal;
use crate::backends::cpp::cpp_impl::{
    CLASS_KEY, STATIC_INITIALIZER, bridge_target, is_inline_constant, source_banner,
};
use crate::backends::cpp::cpp_names::{
    declaration, field_name, namespace_components, primitive_spelling, relative_name,
    sanitize_identifier, simple_name,
};
use crate::backends::cpp::{CodeBuffer, TranslationContext, TypeFacts};
use crate::frontend_model::syntax::{BodyDeclaration, MethodDeclaration, TypeDeclaration};
use crate::frontend_model::types::{AccessLevel, MethodBinding, PrimitiveCode, TypeId};
use crate::frontend_model::variables::VarId;
use crate::translator_messages::translator_errors::TranslatorError;

const OBJECT_KEY: &str = "java.lang.Object";
const STRING_KEY: &str = "java.lang.String";

/// Last access keyword written, so a keyword is only repeated when the level changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AccessCursor {
    current: Option<AccessLevel>,
}

impl AccessCursor {
    /// Keyword to write before a member of the given level, if any
    pub(crate) fn enter(&mut self, level: AccessLevel) -> Option<&'static str> {
        if self.current == Some(level) {
            return None;
        }

        self.current = Some(level);
        Some(access_keyword(level))
    }
}

pub(crate) fn access_keyword(level: AccessLevel) -> &'static str {
    match level {
        AccessLevel::Public => "public:",
        AccessLevel::Protected => "protected:",
        AccessLevel::Package => "public: /* package */",
        AccessLevel::Private => "private:",
    }
}

pub(crate) struct HeaderEmitter<'a> {
    ctx: TranslationContext<'a>,
    type_id: TypeId,
    declaration: &'a TypeDeclaration,
    facts: &'a TypeFacts,
    buffer: CodeBuffer,
    deps: DependencySet,
    cursor: AccessCursor,
}

impl<'a> HeaderEmitter<'a> {
    pub(crate) fn new(
        ctx: TranslationContext<'a>,
        declaration: &'a TypeDeclaration,
        facts: &'a TypeFacts,
    ) -> Self {
        HeaderEmitter {
            ctx,
            type_id: declaration.binding,
            declaration,
            facts,
            buffer: CodeBuffer::new(ctx.settings),
            deps: DependencySet::new(),
            cursor: AccessCursor::default(),
        }
    }

    /// Header text and the dependencies it was classified with
    pub(crate) fn emit(mut self) -> Result<(String, DependencySet), TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;
        let bases = self.base_types()?;

        // The class body is emitted first so every dependency is known for the includes
        self.buffer.indent = 1;
        self.emit_class_members(&bases)?;
        self.buffer.indent = 0;
        let members = std::mem::replace(&mut self.buffer, CodeBuffer::new(self.ctx.settings));

        let mut header = CodeBuffer::new(self.ctx.settings);
        if let Some(banner) = source_banner(self.ctx, self.type_id)? {
            header.emit_line(&banner);
        }
        header.emit_line("#pragma once");
        header.blank_line();
        header.emit_line(&format!("#include \"{}\"", self.ctx.settings.preamble_header));
        for include in self.deps.render_includes(self.ctx.types, self.type_id)? {
            header.emit_line(&include);
        }

        let forward_declarations = self
            .deps
            .render_forward_declarations(self.ctx.types, self.type_id)?;
        if !forward_declarations.is_empty() {
            header.blank_line();
            for forward_declaration in forward_declarations {
                header.emit_line(&forward_declaration);
            }
        }

        let namespace = namespace_components(self.ctx.types, self.type_id)?;
        header.blank_line();
        for component in &namespace {
            header.emit_line(&format!("namespace {} {{", component));
        }
        if !namespace.is_empty() {
            header.blank_line();
        }

        header.emit_line(&format!("class {}", simple_name(self.ctx.types, self.type_id)?));
        for (index, base) in bases.iter().enumerate() {
            let separator = if index == 0 { ":" } else { "," };
            let base_name = relative_name(self.ctx.types, *base, self.type_id)?;
            header.emit_line(&format!(
                "{}{} public virtual {}",
                self.ctx.settings.indent_unit(),
                separator,
                base_name
            ));
        }
        header.emit_line("{");
        let mut text = header.into_string();
        text.push_str(members.as_str());
        text.push_str("};\n");

        if !namespace.is_empty() {
            text.push('\n');
            for component in namespace.iter().rev() {
                text.push_str(&format!("}} // namespace {}\n", component));
            }
        }

        if resolved.binding_key == STRING_KEY {
            text.push('\n');
            text.push_str(&string_helpers());
        }

        Ok((text, self.deps))
    }

    // Superclass then interfaces. Interfaces without superinterfaces still
    // derive from the root object type.
    fn base_types(&mut self) -> Result<Vec<TypeId>, TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;
        let mut bases = resolved
            .superclass
            .into_iter()
            .chain(resolved.interfaces.iter().copied())
            .collect::<Vec<_>>();

        if bases.is_empty()
            && resolved.is_interface()
            && let Some(object) = self.ctx.types.lookup(OBJECT_KEY)
            && object != self.type_id
        {
            bases.push(object);
        }

        for base in &bases {
            self.deps
                .classify(self.ctx.types, *base, UsageKind::BaseClass)?;
        }

        Ok(bases)
    }

    fn emit_member(&mut self, level: AccessLevel, line: &str) {
        if let Some(keyword) = self.cursor.enter(level) {
            self.buffer.indent -= 1;
            if !self.buffer.is_empty() {
                self.buffer.emit_line("");
            }
            self.buffer.emit_line(keyword);
            self.buffer.indent += 1;
        }
        self.buffer.emit_line(line);
    }

    // Interface members are public unless private
    fn member_access(&self, level: AccessLevel) -> Result<AccessLevel, TranslatorError> {
        if self.ctx.ty(self.type_id)?.is_interface() && level != AccessLevel::Private {
            return Ok(AccessLevel::Public);
        }
        Ok(level)
    }

    fn emit_class_members(&mut self, bases: &[TypeId]) -> Result<(), TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;
        let class_name = simple_name(self.ctx.types, self.type_id)?;

        if let Some(superclass) = resolved.superclass {
            let super_name = relative_name(self.ctx.types, superclass, self.type_id)?;
            self.emit_member(AccessLevel::Public, &format!("typedef {} super;", super_name));
        } else if let Some(base) = bases.first() {
            let super_name = relative_name(self.ctx.types, *base, self.type_id)?;
            self.emit_member(AccessLevel::Public, &format!("typedef {} super;", super_name));
        }

        self.emit_friends()?;
        self.emit_constructors(&class_name)?;

        for constant in &self.declaration.enum_constants {
            let binding = self.ctx.variable(constant.field)?;
            self.deps
                .classify_declared(self.ctx.types, binding.ty, UsageKind::FieldType)?;
            let field = declaration(self.ctx.types, binding.ty, self.type_id, &field_name(&binding.name))?;
            self.emit_member(AccessLevel::Public, &format!("static {};", field));
        }

        let declaration = self.declaration;
        for body_declaration in &declaration.body {
            match body_declaration {
                BodyDeclaration::Field(field) => {
                    for fragment in &field.fragments {
                        self.emit_field(fragment.variable)?;
                    }
                }
                BodyDeclaration::Method(method) => self.emit_method(method)?,
                BodyDeclaration::Initializer(_) | BodyDeclaration::Type(_) => {}
            }
        }

        self.emit_using_declarations()?;
        self.emit_bridges()?;
        self.emit_synthetic_members(&class_name)?;

        Ok(())
    }

    /// Flattened nested types keep Java's mutual access through friendship
    fn emit_friends(&mut self) -> Result<(), TranslatorError> {
        let mut friends = Vec::new();
        for nested in &self.facts.nested_types {
            friends.push(simple_name(self.ctx.types, *nested)?);
        }

        let mut enclosing = self.ctx.ty(self.type_id)?.declaring_class;
        while let Some(outer) = enclosing {
            friends.push(simple_name(self.ctx.types, outer)?);
            enclosing = self.ctx.ty(outer)?.declaring_class;
        }

        for friend in friends {
            self.buffer.emit_line(&format!("friend class {};", friend));
        }
        Ok(())
    }

    fn emit_constructors(&mut self, class_name: &str) -> Result<(), TranslatorError> {
        let prefix = prefix_parameters(self.ctx, self.type_id, &self.facts.closures)?;
        for (ty, _) in &prefix {
            self.deps
                .classify_declared(self.ctx.types, *ty, UsageKind::ByValueParam)?;
        }

        for shape in constructor_plan(self.ctx, self.declaration)? {
            let user = user_parameters(self.ctx, &shape)?;
            for (ty, _) in &user {
                self.deps
                    .classify_declared(self.ctx.types, *ty, UsageKind::ByValueParam)?;
            }

            let mut parameters = prefix.clone();
            parameters.extend(user.iter().cloned());
            let rendered = render_parameters(self.ctx, self.type_id, &parameters)?;

            let access = shape.access(self.ctx)?;
            self.emit_member(access, &format!("{}({});", class_name, rendered));

            if shape.has_construct_body() {
                let rendered = render_parameters(self.ctx, self.type_id, &user)?;
                self.emit_member(AccessLevel::Protected, &format!("void _construct({});", rendered));
            }
        }

        Ok(())
    }

    fn emit_field(&mut self, field: VarId) -> Result<(), TranslatorError> {
        let binding = self.ctx.variable(field)?;
        self.deps
            .classify_declared(self.ctx.types, binding.ty, UsageKind::FieldType)?;

        let access = self.member_access(binding.modifiers.access())?;
        let declared = declaration(self.ctx.types, binding.ty, self.type_id, &field_name(&binding.name))?;

        if is_inline_constant(self.ctx, binding)?
            && let Some(constant) = &binding.constant
        {
            self.emit_member(
                access,
                &format!("static const {} = {};", declared, constant_literal(constant)),
            );
        } else if binding.modifiers.is_static() {
            self.emit_member(access, &format!("static {};", declared));
        } else {
            self.emit_member(access, &format!("{};", declared));
        }

        Ok(())
    }

    fn emit_method(&mut self, method: &'a MethodDeclaration) -> Result<(), TranslatorError> {
        let binding = self.ctx.types.method(method.method)?;
        if binding.is_constructor {
            return Ok(());
        }

        let mut names = Vec::with_capacity(binding.parameters.len());
        for (index, _) in binding.parameters.iter().enumerate() {
            let name = match method.parameters.get(index) {
                Some(parameter) => sanitize_identifier(&self.ctx.variable(*parameter)?.name),
                None => format!("a{}", index),
            };
            names.push(name);
        }

        let declared = self.method_declaration(binding, &names)?;
        let access = self.member_access(binding.modifiers.access())?;

        if self.is_redeclared_interface_method(binding)? {
            self.emit_member(access, &format!("/* {} (already declared) */", declared));
            return Ok(());
        }

        if self.is_covariant_override(binding)? {
            self.deps
                .classify(self.ctx.types, binding.return_type, UsageKind::CovariantReturn)?;
        }

        self.emit_member(access, &declared);
        Ok(())
    }

    fn method_declaration(
        &mut self,
        binding: &MethodBinding,
        names: &[String],
    ) -> Result<String, TranslatorError> {
        let mut parameters = Vec::with_capacity(binding.parameters.len());
        for (ty, name) in binding.parameters.iter().zip(names) {
            self.deps
                .classify_declared(self.ctx.types, *ty, UsageKind::ByValueParam)?;
            parameters.push(declaration(self.ctx.types, *ty, self.type_id, name)?);
        }
        self.deps
            .classify_declared(self.ctx.types, binding.return_type, UsageKind::ByValueParam)?;

        let declarator = format!("{}({})", sanitize_identifier(&binding.name), parameters.join(", "));
        let signature = declaration(self.ctx.types, binding.return_type, self.type_id, &declarator)?;

        let modifiers = binding.modifiers;
        let mut declared = String::new();
        if modifiers.is_static() {
            declared.push_str("static ");
        } else if !modifiers.is_private() && !modifiers.is_final() {
            declared.push_str("virtual ");
        }

        if self.ctx.settings.annotate_generics && !binding.type_parameters.is_empty() {
            declared.push_str(&format!("/* <{}> */ ", binding.type_parameters.join(", ")));
        }

        declared.push_str(&signature);

        if self.ctx.settings.annotate_throws && !binding.thrown.is_empty() {
            let mut thrown = Vec::with_capacity(binding.thrown.len());
            for exception in &binding.thrown {
                thrown.push(relative_name(self.ctx.types, *exception, self.type_id)?);
            }
            declared.push_str(&format!(" /* throws({}) */", thrown.join(", ")));
        }

        if modifiers.is_abstract() {
            declared.push_str(" = 0");
        }
        declared.push(';');

        Ok(declared)
    }

    // Overridable methods of the supertypes with the same name and parameters
    fn overridden_methods(&self, binding: &MethodBinding) -> Result<Vec<&'a MethodBinding>, TranslatorError> {
        if binding.modifiers.is_static() || binding.modifiers.is_private() {
            return Ok(Vec::new());
        }

        let mut overridden = Vec::new();
        for supertype in self.ctx.types.all_supertypes(self.type_id)? {
            for method in &self.ctx.ty(supertype)?.methods {
                if !method.is_constructor
                    && !method.modifiers.is_static()
                    && !method.modifiers.is_private()
                    && method.name == binding.name
                    && method.parameters == binding.parameters
                {
                    overridden.push(method);
                }
            }
        }
        Ok(overridden)
    }

    fn is_redeclared_interface_method(&self, binding: &MethodBinding) -> Result<bool, TranslatorError> {
        if !self.ctx.ty(self.type_id)?.is_interface() || !binding.modifiers.is_abstract() {
            return Ok(false);
        }

        Ok(self
            .overridden_methods(binding)?
            .iter()
            .any(|method| method.return_type == binding.return_type))
    }

    fn is_covariant_override(&self, binding: &MethodBinding) -> Result<bool, TranslatorError> {
        if !self.ctx.ty(binding.return_type)?.is_reference() {
            return Ok(false);
        }

        Ok(self
            .overridden_methods(binding)?
            .iter()
            .any(|method| method.return_type != binding.return_type))
    }

    /// Re-exposes superclass overloads that a declaration of the same name hides
    fn emit_using_declarations(&mut self) -> Result<(), TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;
        if resolved.is_interface() {
            return Ok(());
        }

        let mut names: Vec<&str> = Vec::new();
        for method in &resolved.methods {
            if !method.is_constructor && !names.contains(&method.name.as_str()) {
                names.push(&method.name);
            }
        }

        for name in names {
            let declared = resolved
                .methods
                .iter()
                .filter(|method| !method.is_constructor && method.name == name)
                .map(|method| &method.parameters)
                .collect::<Vec<_>>();

            let mut hidden = false;
            let mut superclass = resolved.superclass;
            while let Some(current) = superclass {
                let super_type = self.ctx.ty(current)?;
                hidden |= super_type.methods.iter().any(|method| {
                    !method.is_constructor
                        && !method.modifiers.is_private()
                        && method.name == name
                        && !declared.contains(&&method.parameters)
                });
                superclass = super_type.superclass;
            }

            if hidden {
                self.emit_member(
                    AccessLevel::Public,
                    &format!("using super::{};", sanitize_identifier(name)),
                );
            }
        }

        Ok(())
    }

    fn emit_bridges(&mut self) -> Result<(), TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;

        for bridge in &resolved.bridge_methods {
            if bridge_target(self.ctx, self.type_id, bridge)?.is_none() {
                continue;
            }

            let binding = MethodBinding {
                name: bridge.name.to_owned(),
                modifiers: Default::default(),
                is_constructor: false,
                return_type: bridge.return_type,
                parameters: bridge.parameters.to_owned(),
                thrown: Vec::new(),
                type_parameters: Vec::new(),
                is_varargs: false,
            };
            let names = (0..bridge.parameters.len())
                .map(|index| format!("a{}", index))
                .collect::<Vec<_>>();

            let declared = self.method_declaration(&binding, &names)?;
            self.emit_member(AccessLevel::Public, &declared);
        }

        Ok(())
    }

    fn emit_synthetic_members(&mut self, class_name: &str) -> Result<(), TranslatorError> {
        let resolved = self.ctx.ty(self.type_id)?;

        if let Some(class) = self.ctx.types.lookup(CLASS_KEY) {
            self.deps
                .classify(self.ctx.types, class, UsageKind::PointerUse)?;
        }
        self.emit_member(AccessLevel::Public, "static ::java::lang::Class *class_();");

        if resolved.binding_key == OBJECT_KEY {
            self.emit_member(AccessLevel::Public, &format!("virtual ~{}() {{ }}", class_name));
        }

        if self.facts.has_static_initializer {
            self.emit_member(AccessLevel::Public, &format!("static void {}();", STATIC_INITIALIZER));
        }

        if !resolved.is_interface() {
            if resolved.superclass.is_some() {
                self.emit_member(AccessLevel::Private, "::java::lang::Class *getClass0() override;");
            } else {
                self.emit_member(AccessLevel::Private, "virtual ::java::lang::Class *getClass0();");
            }
        }

        if self.facts.has_instance_initializer {
            self.emit_member(AccessLevel::Private, "void _init();");
        }

        for (ty, name) in prefix_parameters(self.ctx, self.type_id, &self.facts.closures)? {
            self.deps
                .classify_declared(self.ctx.types, ty, UsageKind::FieldType)?;
            let member = declaration(self.ctx.types, ty, self.type_id, &name)?;
            self.emit_member(AccessLevel::Private, &format!("{};", member));
        }

        Ok(())
    }
}

/// Global `join` overloads and `lit`, declared after the String class
fn string_helpers() -> String {
    const STRING: &str = "::java::lang::String";
    const OBJECT: &str = "::java::lang::Object";

    let mut lines = vec![
        format!("{s} *join({s} *lhs, {s} *rhs);", s = STRING),
        format!("{s} *join({s} *lhs, {o} *rhs);", s = STRING, o = OBJECT),
        format!("{s} *join({o} *lhs, {s} *rhs);", s = STRING, o = OBJECT),
    ];

    for code in PrimitiveCode::ALL {
        if code == PrimitiveCode::Void {
            continue;
        }
        let primitive = primitive_spelling(code);
        lines.push(format!("{s} *join({s} *lhs, {p} rhs);", s = STRING, p = primitive));
        lines.push(format!("{s} *join({p} lhs, {s} *rhs);", s = STRING, p = primitive));
    }

    lines.push(String::new());
    lines.push(String::from(
        "template<typename A, typename B, typename C, typename... Rest>",
    ));
    lines.push(format!(
        "{} *join(A a, B b, C c, Rest... rest) {{ return join(join(a, b), c, rest...); }}",
        STRING
    ));
    lines.push(String::new());
    lines.push(format!("{} *lit(const wchar_t *s);", STRING));

    lines.join("\n") + "\n"
}
