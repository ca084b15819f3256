//! Captured-variable analysis for local and anonymous types.
//!
//! A local or anonymous type captures every final (or effectively final) local it reads
//! that some other type declares. Captured values arrive as extra constructor arguments
//! and live in `name_` fields, so the capture is by value.

use crate::backends::cpp::CppEmitter;
use crate::backends::cpp::cpp_names::{field_name, sanitize_identifier};
use crate::closure_log;
use crate::frontend_model::types::TypeId;
use crate::frontend_model::variables::VarId;
use crate::translator_messages::translator_errors::TranslatorError;

// Replaced by the closure arguments once a self-instantiating type is fully emitted.
// The two digits record whether arguments come before and after the closures.
pub(crate) const SELF_CLOSURE_MARKER: char = '\u{1}';

/// Captured variables in first-capture order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureSet {
    variables: Vec<VarId>,
}

impl ClosureSet {
    pub fn new() -> Self {
        ClosureSet::default()
    }

    /// Returns false when the variable was already captured
    pub fn insert(&mut self, variable: VarId) -> bool {
        if self.variables.contains(&variable) {
            return false;
        }

        self.variables.push(variable);
        true
    }

    pub fn contains(&self, variable: VarId) -> bool {
        self.variables.contains(&variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<'a> CppEmitter<'a> {
    /// Spelling of a local or parameter read inside the current type.
    ///
    /// Locals declared by another type are captured and read through their field.
    pub(crate) fn local_variable_name(&mut self, variable: VarId) -> Result<String, TranslatorError> {
        let binding = self.ctx.variable(variable)?;
        let name = sanitize_identifier(&binding.name);

        if binding.is_field() || binding.declaring_type() == self.type_id {
            return Ok(name);
        }

        if !binding.is_capturable() {
            return Err(TranslatorError::binding_gap(format!(
                "Local '{}' is read from an inner type but is neither final nor effectively final",
                binding.name
            )));
        }

        self.capture_variable(variable)?;
        Ok(field_name(&binding.name))
    }

    fn capture_variable(&mut self, variable: VarId) -> Result<(), TranslatorError> {
        let binding = self.ctx.variable(variable)?;

        let Some(closures) = self.closures.as_mut() else {
            return Err(TranslatorError::unsupported(format!(
                "Local '{}' is read from a member type nested in a local type",
                binding.name
            )));
        };

        if closures.insert(variable) {
            let type_key = &self.ctx.ty(self.type_id)?.binding_key;
            let variable_name = &binding.name;
            closure_log!("Captured ", Green variable_name, " in ", Dark Cyan type_key);
        }

        Ok(())
    }

    /// Everything a nested type captured that the current type does not declare
    /// has to be captured by the current type too
    pub(crate) fn absorb_closures(&mut self, child: &ClosureSet) -> Result<(), TranslatorError> {
        for variable in child.iter() {
            if self.ctx.variable(variable)?.declaring_type() != self.type_id {
                self.capture_variable(variable)?;
            }
        }

        Ok(())
    }

    /// Constructor arguments carrying the captured values of `child` from the current scope
    pub(crate) fn closure_arguments(
        &mut self,
        child: &ClosureSet,
    ) -> Result<Vec<String>, TranslatorError> {
        self.absorb_closures(child)?;

        let mut arguments = Vec::with_capacity(child.len());
        for variable in child.iter() {
            let binding = self.ctx.variable(variable)?;
            if self.captures(variable) {
                arguments.push(field_name(&binding.name));
            } else {
                arguments.push(sanitize_identifier(&binding.name));
            }
        }

        Ok(arguments)
    }

    pub(crate) fn captures(&self, variable: VarId) -> bool {
        self.closures
            .as_ref()
            .is_some_and(|closures| closures.contains(variable))
    }

    /// Closure set of a local or anonymous type about to be instantiated
    pub(crate) fn closures_of(&self, local_type: TypeId) -> Result<Option<ClosureSet>, TranslatorError> {
        let resolved = self.ctx.ty(local_type)?;
        if !resolved.is_local_or_anonymous() {
            return Ok(None);
        }

        if let Some(closures) = self.local_closures.get(&local_type) {
            return Ok(Some(closures.clone()));
        }

        Err(TranslatorError::unsupported(format!(
            "Local type {} is instantiated somewhere its captured variables are unknown",
            resolved.binding_key
        )))
    }

    /// Marker standing in for the closure arguments of a self-instantiation
    pub(crate) fn self_closure_marker(&mut self, leading: bool, trailing: bool) -> String {
        self.self_instantiated = true;
        format!(
            "{}{}{}{}",
            SELF_CLOSURE_MARKER, leading as u8, trailing as u8, SELF_CLOSURE_MARKER
        )
    }

    /// Replaces the self-instantiation markers with the final closure arguments
    pub(crate) fn patch_self_instantiations(&self, text: &str) -> Result<String, TranslatorError> {
        if !self.self_instantiated {
            return Ok(text.to_owned());
        }

        let mut closure_arguments = Vec::new();
        if let Some(closures) = &self.closures {
            for variable in closures.iter() {
                closure_arguments.push(field_name(&self.ctx.variable(variable)?.name));
            }
        }
        let closure_arguments = closure_arguments.join(", ");

        let mut patched = text.to_owned();
        for leading in [false, true] {
            for trailing in [false, true] {
                let marker = format!(
                    "{}{}{}{}",
                    SELF_CLOSURE_MARKER, leading as u8, trailing as u8, SELF_CLOSURE_MARKER
                );

                let replacement = if closure_arguments.is_empty() {
                    if leading && trailing { String::from(", ") } else { String::new() }
                } else {
                    format!(
                        "{}{}{}",
                        if leading { ", " } else { "" },
                        closure_arguments,
                        if trailing { ", " } else { "" }
                    )
                };

                patched = patched.replace(&marker, &replacement);
            }
        }

        Ok(patched)
    }
}
