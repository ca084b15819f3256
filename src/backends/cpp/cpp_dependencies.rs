//! Hard/Soft dependency classification for one emitted file.
//!
//! Hard dependencies need the complete class definition and become `#include`s.
//! Soft dependencies only need the name and become forward declarations.

use crate::backends::cpp::cpp_names::{include_path, namespace_components, simple_name};
use crate::deps_log;
use crate::frontend_model::types::{TypeId, TypeTable};
use crate::translator_messages::translator_errors::TranslatorError;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyStrength {
    Soft,
    Hard,
}

/// How a type is used at a given point in the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    BaseClass,

    /// Field stored by value
    FieldType,

    /// Parameter or return passed by value
    ByValueParam,

    /// Only named through a pointer
    PointerUse,

    /// Members accessed, instances created or runtime-cast
    MemberAccess,

    /// Pointer converted to one of its base classes
    ImplicitConversion,

    /// Return type narrowing the return type of an overridden method
    CovariantReturn,
}

impl UsageKind {
    pub fn strength(self) -> DependencyStrength {
        match self {
            UsageKind::PointerUse => DependencyStrength::Soft,
            _ => DependencyStrength::Hard,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    entries: FxHashMap<TypeId, DependencyStrength>,
}

impl DependencySet {
    pub fn new() -> Self {
        DependencySet::default()
    }

    /// Records a use of `id`. A Hard use promotes an existing Soft entry, a Soft use
    /// never demotes a Hard one. Primitives and the null type are never recorded.
    pub fn classify(
        &mut self,
        types: &TypeTable,
        id: TypeId,
        usage: UsageKind,
    ) -> Result<(), TranslatorError> {
        let resolved = types.get(id)?;
        if !resolved.is_reference() {
            return Ok(());
        }

        let strength = usage.strength();
        let entry = self.entries.entry(id).or_insert(strength);
        if strength > *entry {
            *entry = strength;
        }

        let type_key = &resolved.binding_key;
        deps_log!("Dependency ", Dark Cyan type_key, " ", #strength);

        Ok(())
    }

    /// Classifies a declared type: references are pointers, primitives are by value
    pub fn classify_declared(
        &mut self,
        types: &TypeTable,
        id: TypeId,
        by_value_usage: UsageKind,
    ) -> Result<(), TranslatorError> {
        if types.get(id)?.is_primitive() {
            self.classify(types, id, by_value_usage)
        } else {
            self.classify(types, id, UsageKind::PointerUse)
        }
    }

    pub fn strength(&self, id: TypeId) -> Option<DependencyStrength> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries.keys().copied()
    }

    pub fn hard_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries
            .iter()
            .filter(|(_, strength)| **strength == DependencyStrength::Hard)
            .map(|(id, _)| *id)
    }

    /// Array types referenced either way, sorted by id
    pub fn array_ids(&self, types: &TypeTable) -> Vec<TypeId> {
        let mut arrays = self
            .entries
            .keys()
            .copied()
            .filter(|id| types.get(*id).is_ok_and(|resolved| resolved.is_array()))
            .collect::<Vec<_>>();
        arrays.sort();
        arrays
    }

    /// `#include` lines for the Hard dependencies, sorted by path.
    /// The type the file belongs to is left out.
    pub fn render_includes(
        &self,
        types: &TypeTable,
        exclude: TypeId,
    ) -> Result<Vec<String>, TranslatorError> {
        let mut paths = BTreeSet::new();
        for id in self.hard_ids() {
            if id != exclude {
                paths.insert(include_path(types, id)?);
            }
        }

        Ok(paths
            .into_iter()
            .map(|path| format!("#include \"{}\"", path))
            .collect())
    }

    /// Forward declarations for the Soft-only dependencies.
    ///
    /// Nested types are declared under their flattened name in the namespace of their
    /// outermost enclosing type, one line per namespace.
    pub fn render_forward_declarations(
        &self,
        types: &TypeTable,
        exclude: TypeId,
    ) -> Result<Vec<String>, TranslatorError> {
        let mut by_namespace: BTreeMap<Vec<String>, BTreeSet<String>> = BTreeMap::new();

        for (id, strength) in &self.entries {
            if *strength != DependencyStrength::Soft || *id == exclude {
                continue;
            }

            by_namespace
                .entry(namespace_components(types, *id)?)
                .or_default()
                .insert(simple_name(types, *id)?);
        }

        let mut lines = Vec::with_capacity(by_namespace.len());
        for (namespace, classes) in by_namespace {
            let declarations = classes
                .iter()
                .map(|name| format!("class {};", name))
                .collect::<Vec<_>>()
                .join(" ");

            if namespace.is_empty() {
                lines.push(declarations);
                continue;
            }

            let opening = namespace
                .iter()
                .map(|component| format!("namespace {} {{ ", component))
                .collect::<String>();
            let closing = "}".repeat(namespace.len());
            lines.push(format!("{}{} {}", opening, declarations, closing));
        }

        Ok(lines)
    }
}
