//! C++ backend for bound Java programs.
//!
//! Every Java type becomes one header and one implementation file. Nested, local and
//! anonymous types get their own pair of files too, flattened into the namespace of their
//! top-level type. The implementation is emitted first because it discovers what the
//! header has to declare (captured variables, nested types, initializer hooks).

mod cpp_arrays;
mod cpp_closures;
mod cpp_constructors;
pub mod cpp_dependencies;
mod cpp_expr;
mod cpp_guards;
mod cpp_header;
mod cpp_impl;
pub mod cpp_names;
mod cpp_statement;

#[cfg(test)]
mod tests;

pub use cpp_arrays::emit_array_unit;
pub use cpp_closures::ClosureSet;

use crate::backends::cpp::cpp_dependencies::DependencySet;
use crate::backends::cpp::cpp_guards::GuardUsage;
use crate::backends::cpp::cpp_header::HeaderEmitter;
use crate::backends::cpp::cpp_names::{header_name, impl_name, qualified_name};
use crate::frontend_model::syntax::TypeDeclaration;
use crate::frontend_model::types::{ResolvedType, TypeId, TypeTable};
use crate::frontend_model::variables::{VariableBinding, VarId, VariableTable};
use crate::projects::settings::Settings;
use crate::translator_messages::translator_errors::TranslatorError;
use crate::{header_log, impl_log};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Read-only view shared by every emitter. Cheap to copy into worker threads.
#[derive(Debug, Clone, Copy)]
pub struct TranslationContext<'a> {
    pub types: &'a TypeTable,
    pub variables: &'a VariableTable,
    pub settings: &'a Settings,
}

impl<'a> TranslationContext<'a> {
    pub fn new(types: &'a TypeTable, variables: &'a VariableTable, settings: &'a Settings) -> Self {
        TranslationContext {
            types,
            variables,
            settings,
        }
    }

    pub(crate) fn ty(&self, id: TypeId) -> Result<&'a ResolvedType, TranslatorError> {
        self.types.get(id)
    }

    pub(crate) fn variable(&self, id: VarId) -> Result<&'a VariableBinding, TranslatorError> {
        self.variables.get(id)
    }
}

/// Header and implementation text for one Java type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedUnit {
    pub type_id: TypeId,
    pub qualified_name: String,
    pub header_path: PathBuf,
    pub impl_path: PathBuf,
    pub header: String,
    pub implementation: String,

    // Array types named by either file, emitted once by the driver
    pub(crate) referenced_arrays: Vec<TypeId>,
}

impl EmittedUnit {
    pub(crate) fn new(
        ctx: TranslationContext,
        type_id: TypeId,
        header: String,
        implementation: String,
        referenced_arrays: Vec<TypeId>,
    ) -> Result<Self, TranslatorError> {
        Ok(EmittedUnit {
            type_id,
            qualified_name: qualified_name(ctx.types, type_id)?,
            header_path: header_name(ctx.types, type_id)?,
            impl_path: impl_name(ctx.types, type_id)?,
            header,
            implementation,
            referenced_arrays,
        })
    }
}

/// What the implementation pass learned about a type that its header must declare
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeFacts {
    pub closures: ClosureSet,
    pub nested_types: Vec<TypeId>,
    pub has_static_initializer: bool,
    pub has_instance_initializer: bool,
}

/// Result of emitting a type together with everything nested in it
pub(crate) struct TypeEmission {
    pub units: Vec<EmittedUnit>,
    pub closures: ClosureSet,
    pub nested_types: Vec<TypeId>,
}

/// Emits the unit for a top-level type declaration and for every type nested in it
pub fn emit_type_declaration(
    ctx: TranslationContext,
    declaration: &TypeDeclaration,
) -> Result<Vec<EmittedUnit>, TranslatorError> {
    let emission = emit_type(ctx, declaration, &FxHashMap::default())?;
    Ok(emission.units)
}

pub(crate) fn emit_type(
    ctx: TranslationContext,
    declaration: &TypeDeclaration,
    known_local_closures: &FxHashMap<TypeId, ClosureSet>,
) -> Result<TypeEmission, TranslatorError> {
    let type_id = declaration.binding;
    let resolved = ctx.ty(type_id)?;

    let mut emitter = CppEmitter::new(ctx, declaration, known_local_closures.clone())?;
    let implementation = emitter
        .emit_implementation()
        .map_err(|e| e.with_type_name(resolved.binding_key.to_owned()))?;

    let type_key = &resolved.binding_key;
    impl_log!(Green "Implementation of ", Bright type_key, "\n", implementation);

    let facts = TypeFacts {
        closures: emitter.closures.clone().unwrap_or_default(),
        nested_types: emitter.nested_types.clone(),
        has_static_initializer: emitter.has_static_initializer,
        has_instance_initializer: emitter.has_instance_initializer,
    };

    let (header, header_deps) = HeaderEmitter::new(ctx, declaration, &facts)
        .emit()
        .map_err(|e| e.with_type_name(resolved.binding_key.to_owned()))?;

    header_log!(header);

    let mut referenced_arrays = emitter.deps.array_ids(ctx.types);
    for array in header_deps.array_ids(ctx.types) {
        if !referenced_arrays.contains(&array) {
            referenced_arrays.push(array);
        }
    }

    let mut units = std::mem::take(&mut emitter.nested_units);
    units.push(EmittedUnit::new(
        ctx,
        type_id,
        header,
        implementation,
        referenced_arrays,
    )?);

    Ok(TypeEmission {
        units,
        closures: facts.closures,
        nested_types: facts.nested_types,
    })
}

/// Line-oriented output with the configured indentation
#[derive(Debug, Clone)]
pub(crate) struct CodeBuffer {
    out: String,
    pub(crate) indent: usize,
    indent_unit: String,
}

impl CodeBuffer {
    pub(crate) fn new(settings: &Settings) -> Self {
        CodeBuffer {
            out: String::new(),
            indent: 0,
            indent_unit: settings.indent_unit(),
        }
    }

    pub(crate) fn emit_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(&self.indent_unit);
            }
        }

        self.out.push_str(line);
        self.out.push('\n');
    }

    /// Several lines at the current indentation
    pub(crate) fn emit_lines(&mut self, lines: &str) {
        for line in lines.lines() {
            self.emit_line(line);
        }
    }

    pub(crate) fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.out
    }

    pub(crate) fn into_string(self) -> String {
        self.out
    }
}

/// Implementation-file emitter for a single type
pub(crate) struct CppEmitter<'a> {
    pub(crate) ctx: TranslationContext<'a>,
    pub(crate) type_id: TypeId,
    pub(crate) declaration: &'a TypeDeclaration,

    pub(crate) buffer: CodeBuffer,
    pub(crate) deps: DependencySet,

    /// Captured variables. Only local and anonymous types can capture.
    pub(crate) closures: Option<ClosureSet>,

    /// Closure sets of local types emitted so far, needed to instantiate them
    pub(crate) local_closures: FxHashMap<TypeId, ClosureSet>,

    pub(crate) nested_units: Vec<EmittedUnit>,
    pub(crate) nested_types: Vec<TypeId>,

    pub(crate) guards: GuardUsage,
    pub(crate) has_static_initializer: bool,
    pub(crate) has_instance_initializer: bool,

    // Set when the type instantiates itself before its closure set is complete
    pub(crate) self_instantiated: bool,

    temp_counter: usize,
}

impl<'a> CppEmitter<'a> {
    pub(crate) fn new(
        ctx: TranslationContext<'a>,
        declaration: &'a TypeDeclaration,
        local_closures: FxHashMap<TypeId, ClosureSet>,
    ) -> Result<Self, TranslatorError> {
        let resolved = ctx.ty(declaration.binding)?;
        let closures = if resolved.is_local_or_anonymous() {
            Some(ClosureSet::new())
        } else {
            None
        };

        Ok(CppEmitter {
            ctx,
            type_id: declaration.binding,
            declaration,
            buffer: CodeBuffer::new(ctx.settings),
            deps: DependencySet::new(),
            closures,
            local_closures,
            nested_units: Vec::new(),
            nested_types: Vec::new(),
            guards: GuardUsage::default(),
            has_static_initializer: false,
            has_instance_initializer: false,
            self_instantiated: false,
            temp_counter: 0,
        })
    }

    pub(crate) fn types(&self) -> &'a TypeTable {
        self.ctx.types
    }

    pub(crate) fn current(&self) -> Result<&'a ResolvedType, TranslatorError> {
        self.ctx.ty(self.type_id)
    }

    pub(crate) fn emit_line(&mut self, line: &str) {
        self.buffer.emit_line(line);
    }

    pub(crate) fn with_indent<F>(&mut self, callback: F) -> Result<(), TranslatorError>
    where
        F: FnOnce(&mut Self) -> Result<(), TranslatorError>,
    {
        self.buffer.indent += 1;
        let result = callback(self);
        self.buffer.indent -= 1;
        result
    }

    /// Runs the callback against a fresh buffer and returns what it emitted
    pub(crate) fn capture<F>(&mut self, callback: F) -> Result<String, TranslatorError>
    where
        F: FnOnce(&mut Self) -> Result<(), TranslatorError>,
    {
        let previous = std::mem::replace(&mut self.buffer, CodeBuffer::new(self.ctx.settings));
        let result = callback(self);
        let captured = std::mem::replace(&mut self.buffer, previous);
        result.map(|_| captured.into_string())
    }

    pub(crate) fn next_temp_identifier(&mut self, prefix: &str) -> String {
        let identifier = format!("{}_{}", prefix, self.temp_counter);
        self.temp_counter += 1;
        identifier
    }

    /// Emits a nested, local or anonymous type and records what the enclosing type
    /// needs to know about it
    pub(crate) fn emit_nested_type(
        &mut self,
        declaration: &TypeDeclaration,
    ) -> Result<ClosureSet, TranslatorError> {
        let emission = emit_type(self.ctx, declaration, &self.local_closures)?;

        self.nested_units.extend(emission.units);
        self.nested_types.push(declaration.binding);
        for nested in emission.nested_types {
            if !self.nested_types.contains(&nested) {
                self.nested_types.push(nested);
            }
        }

        if self.ctx.ty(declaration.binding)?.is_local_or_anonymous() {
            self.local_closures
                .insert(declaration.binding, emission.closures.clone());
        }

        Ok(emission.closures)
    }
}
