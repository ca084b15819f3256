//! Resolved type bindings handed over by the Java front end.
//!
//! Everything the emitters know about a type lives in a single arena, the [`TypeTable`],
//! addressed by [`TypeId`]. Bindings are fully resolved: supertypes, members and
//! enclosing-type links are ids into the same table.

use crate::frontend_model::variables::VarId;
use crate::translator_messages::translator_errors::TranslatorError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// A method is addressed through its declaring type and its position in that type's method list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub owner: TypeId,
    pub index: u32,
}

/// Java modifier bits, using the same values as `java.lang.reflect.Modifier`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const PUBLIC: u32 = 0x0001;
    pub const PRIVATE: u32 = 0x0002;
    pub const PROTECTED: u32 = 0x0004;
    pub const STATIC: u32 = 0x0008;
    pub const FINAL: u32 = 0x0010;
    pub const SYNCHRONIZED: u32 = 0x0020;
    pub const VOLATILE: u32 = 0x0040;
    pub const TRANSIENT: u32 = 0x0080;
    pub const NATIVE: u32 = 0x0100;
    pub const ABSTRACT: u32 = 0x0400;
    pub const DEFAULT: u32 = 0x1_0000;

    pub fn new(bits: u32) -> Self {
        Modifiers(bits)
    }

    pub fn with(self, bits: u32) -> Self {
        Modifiers(self.0 | bits)
    }

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn access(self) -> AccessLevel {
        if self.contains(Self::PUBLIC) {
            AccessLevel::Public
        } else if self.contains(Self::PROTECTED) {
            AccessLevel::Protected
        } else if self.contains(Self::PRIVATE) {
            AccessLevel::Private
        } else {
            AccessLevel::Package
        }
    }
}

/// Java visibility, ordered from most to least restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessLevel {
    Private,
    Protected,
    Package,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveCode {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
}

impl PrimitiveCode {
    pub const ALL: [PrimitiveCode; 9] = [
        PrimitiveCode::Boolean,
        PrimitiveCode::Byte,
        PrimitiveCode::Char,
        PrimitiveCode::Double,
        PrimitiveCode::Float,
        PrimitiveCode::Int,
        PrimitiveCode::Long,
        PrimitiveCode::Short,
        PrimitiveCode::Void,
    ];

    pub fn from_keyword(keyword: &str) -> Option<PrimitiveCode> {
        PrimitiveCode::ALL
            .into_iter()
            .find(|code| code.keyword() == keyword)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveCode::Boolean => "boolean",
            PrimitiveCode::Byte => "byte",
            PrimitiveCode::Char => "char",
            PrimitiveCode::Double => "double",
            PrimitiveCode::Float => "float",
            PrimitiveCode::Int => "int",
            PrimitiveCode::Long => "long",
            PrimitiveCode::Short => "short",
            PrimitiveCode::Void => "void",
        }
    }

    /// Qualified name of the wrapper class holding the `TYPE` class literal
    pub fn box_class_name(self) -> &'static str {
        match self {
            PrimitiveCode::Boolean => "java.lang.Boolean",
            PrimitiveCode::Byte => "java.lang.Byte",
            PrimitiveCode::Char => "java.lang.Character",
            PrimitiveCode::Double => "java.lang.Double",
            PrimitiveCode::Float => "java.lang.Float",
            PrimitiveCode::Int => "java.lang.Integer",
            PrimitiveCode::Long => "java.lang.Long",
            PrimitiveCode::Short => "java.lang.Short",
            PrimitiveCode::Void => "java.lang.Void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Array { component: TypeId },
    Primitive(PrimitiveCode),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBinding {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub is_constructor: bool,

    // void for constructors
    pub return_type: TypeId,
    #[serde(default)]
    pub parameters: Vec<TypeId>,
    #[serde(default)]
    pub thrown: Vec<TypeId>,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub is_varargs: bool,
}

/// Erasure bridge reported by the front end for a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMethod {
    pub name: String,
    pub return_type: TypeId,
    #[serde(default)]
    pub parameters: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedType {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default)]
    pub superclass: Option<TypeId>,
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
    #[serde(default)]
    pub fields: Vec<VarId>,
    #[serde(default)]
    pub methods: Vec<MethodBinding>,
    #[serde(default)]
    pub nested_types: Vec<TypeId>,
    #[serde(default)]
    pub bridge_methods: Vec<BridgeMethod>,

    #[serde(default)]
    pub declaring_class: Option<TypeId>,
    #[serde(default)]
    pub declaring_method: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub is_anonymous: bool,

    // Local and anonymous types declared inside a static method or static initializer
    #[serde(default)]
    pub in_static_context: bool,

    /// Front-end unique key. Top-level and member types use their dotted qualified name.
    pub binding_key: String,
    #[serde(default)]
    pub source_path: Option<String>,
}

impl ResolvedType {
    pub fn new(package: Option<&str>, name: &str, kind: TypeKind) -> Self {
        let binding_key = match package {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_owned(),
        };

        ResolvedType {
            name: name.to_owned(),
            package: package.map(str::to_owned),
            kind,
            modifiers: Modifiers::default(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
            bridge_methods: Vec::new(),
            declaring_class: None,
            declaring_method: None,
            is_local: false,
            is_anonymous: false,
            in_static_context: false,
            binding_key,
            source_path: None,
        }
    }

    pub fn class(package: &str, name: &str) -> Self {
        Self::new(non_empty(package), name, TypeKind::Class)
    }

    pub fn interface(package: &str, name: &str) -> Self {
        Self::new(non_empty(package), name, TypeKind::Interface)
            .with_modifiers(Modifiers::ABSTRACT)
    }

    pub fn with_modifiers(mut self, bits: u32) -> Self {
        self.modifiers = self.modifiers.with(bits);
        self
    }

    pub fn with_superclass(mut self, superclass: TypeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<TypeId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Member type declared directly inside `declaring`
    pub fn nested_in(mut self, declaring: TypeId, declaring_key: &str) -> Self {
        self.binding_key = format!("{}.{}", declaring_key, self.name);
        self.declaring_class = Some(declaring);
        self
    }

    /// Local or anonymous type declared inside `method` of `declaring`
    pub fn local_in(mut self, declaring: TypeId, method: Option<&str>, anonymous: bool) -> Self {
        self.declaring_class = Some(declaring);
        self.declaring_method = method.map(str::to_owned);
        self.is_local = !anonymous;
        self.is_anonymous = anonymous;
        self.binding_key = format!(
            "{}${}${}",
            self.binding_key,
            method.unwrap_or_default(),
            declaring.0
        );
        self
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, TypeKind::Null)
    }

    pub fn is_reference(&self) -> bool {
        !self.is_primitive() && !self.is_null()
    }

    /// Local and anonymous types together
    pub fn is_local_or_anonymous(&self) -> bool {
        self.is_local || self.is_anonymous
    }

    /// Non-static member types and local/anonymous types outside static contexts
    /// carry a pointer to their enclosing instance
    pub fn has_outer_instance(&self) -> bool {
        let Some(_) = self.declaring_class else {
            return false;
        };

        if self.is_local_or_anonymous() {
            return !self.in_static_context;
        }

        !self.modifiers.is_static() && !self.is_interface() && !self.is_enum()
    }
}

fn non_empty(package: &str) -> Option<&str> {
    if package.is_empty() { None } else { Some(package) }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    types: Vec<ResolvedType>,

    #[serde(skip)]
    by_key: FxHashMap<String, TypeId>,

    #[serde(skip)]
    arrays_by_component: FxHashMap<TypeId, TypeId>,
}

impl TypeTable {
    /// A table with the primitive types and the null type already registered
    pub fn new() -> Self {
        let mut table = TypeTable::default();

        for code in PrimitiveCode::ALL {
            table.insert(ResolvedType::new(
                None,
                code.keyword(),
                TypeKind::Primitive(code),
            ));
        }

        table.insert(ResolvedType::new(None, "null", TypeKind::Null));
        table
    }

    pub fn insert(&mut self, resolved: ResolvedType) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.index_type(id, &resolved);
        self.types.push(resolved);
        id
    }

    fn index_type(&mut self, id: TypeId, resolved: &ResolvedType) {
        self.by_key.insert(resolved.binding_key.to_owned(), id);

        if let TypeKind::Array { component } = resolved.kind {
            self.arrays_by_component.entry(component).or_insert(id);
        }
    }

    /// Rebuilds the lookup maps after deserializing a table
    pub fn rebuild_index(&mut self) {
        self.by_key.clear();
        self.arrays_by_component.clear();

        for index in 0..self.types.len() {
            let resolved = self.types[index].clone();
            self.index_type(TypeId(index as u32), &resolved);
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(|index| TypeId(index as u32))
    }

    pub fn get(&self, id: TypeId) -> Result<&ResolvedType, TranslatorError> {
        self.types.get(id.0 as usize).ok_or_else(|| {
            TranslatorError::binding_gap(format!("Type id {} is not in the type table", id.0))
        })
    }

    pub fn get_mut(&mut self, id: TypeId) -> Result<&mut ResolvedType, TranslatorError> {
        self.types.get_mut(id.0 as usize).ok_or_else(|| {
            TranslatorError::binding_gap(format!("Type id {} is not in the type table", id.0))
        })
    }

    pub fn lookup(&self, binding_key: &str) -> Option<TypeId> {
        self.by_key.get(binding_key).copied()
    }

    pub fn primitive(&self, code: PrimitiveCode) -> Option<TypeId> {
        self.lookup(code.keyword())
    }

    pub fn null_type(&self) -> Option<TypeId> {
        self.lookup("null")
    }

    pub fn object(&self) -> Option<TypeId> {
        self.lookup("java.lang.Object")
    }

    pub fn array_of(&self, component: TypeId) -> Option<TypeId> {
        self.arrays_by_component.get(&component).copied()
    }

    pub fn method(&self, method: MethodRef) -> Result<&MethodBinding, TranslatorError> {
        let owner = self.get(method.owner)?;
        owner.methods.get(method.index as usize).ok_or_else(|| {
            TranslatorError::binding_gap(format!(
                "Method #{} does not exist on {}",
                method.index, owner.binding_key
            ))
        })
    }

    pub fn add_method(
        &mut self,
        owner: TypeId,
        method: MethodBinding,
    ) -> Result<MethodRef, TranslatorError> {
        let resolved = self.get_mut(owner)?;
        resolved.methods.push(method);
        Ok(MethodRef {
            owner,
            index: (resolved.methods.len() - 1) as u32,
        })
    }

    /// Registers the array type with the given component, or returns the existing one
    pub fn intern_array(&mut self, component: TypeId) -> Result<TypeId, TranslatorError> {
        if let Some(existing) = self.array_of(component) {
            return Ok(existing);
        }

        let component_key = self.get(component)?.binding_key.to_owned();
        let mut array = ResolvedType::new(None, "", TypeKind::Array { component });
        array.binding_key = format!("{}[]", component_key);
        array.superclass = self.object();

        Ok(self.insert(array))
    }

    /// Innermost non-array type of a (possibly multi-dimensional) array
    pub fn element_type(&self, id: TypeId) -> Result<TypeId, TranslatorError> {
        let mut current = id;
        while let TypeKind::Array { component } = self.get(current)?.kind {
            current = component;
        }
        Ok(current)
    }

    /// Walks the declaring-class links up to the top-level type
    pub fn outermost(&self, id: TypeId) -> Result<TypeId, TranslatorError> {
        let mut current = id;
        while let Some(declaring) = self.get(current)?.declaring_class {
            current = declaring;
        }
        Ok(current)
    }

    /// Reflexive and transitive over superclasses and interfaces
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }

        let Ok(resolved) = self.get(sub) else {
            return false;
        };

        resolved
            .superclass
            .into_iter()
            .chain(resolved.interfaces.iter().copied())
            .any(|parent| self.is_subtype(parent, sup))
    }

    /// Superclass and interfaces, transitively, in breadth-first order without repeats
    pub fn all_supertypes(&self, id: TypeId) -> Result<Vec<TypeId>, TranslatorError> {
        let mut seen = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            let resolved = self.get(current)?;
            for parent in resolved
                .superclass
                .into_iter()
                .chain(resolved.interfaces.iter().copied())
            {
                if !seen.contains(&parent) {
                    seen.push(parent);
                    queue.push_back(parent);
                }
            }
        }

        Ok(seen)
    }

    /// Makes sure every array type that a referenced array inherits from is registered.
    ///
    /// `Foo[]` derives from the array of `Foo`'s superclass (or `Object[]`) and from the
    /// array of each interface of `Foo`, so those identities must exist before the
    /// table is frozen for parallel emission.
    pub fn complete_array_types(&mut self) -> Result<(), TranslatorError> {
        let mut pending = self
            .ids()
            .filter(|id| self.types[id.0 as usize].is_array())
            .collect::<Vec<_>>();

        while let Some(array) = pending.pop() {
            for base_component in self.array_base_components(array)? {
                if self.array_of(base_component).is_none() {
                    let created = self.intern_array(base_component)?;
                    pending.push(created);
                }
            }
        }

        Ok(())
    }

    /// Components of the arrays an array type derives from.
    ///
    /// Empty for primitive arrays and for the object array, which are the roots.
    pub fn array_base_components(&self, array: TypeId) -> Result<Vec<TypeId>, TranslatorError> {
        let TypeKind::Array { component } = self.get(array)?.kind else {
            return Err(TranslatorError::compiler_error(format!(
                "{} is not an array type",
                self.get(array)?.binding_key
            )));
        };

        let component_type = self.get(component)?;
        if component_type.is_primitive() || Some(component) == self.object() {
            return Ok(Vec::new());
        }

        let object = self.object().ok_or_else(|| {
            TranslatorError::binding_gap("java.lang.Object is missing from the type table")
        })?;

        let mut bases = vec![component_type.superclass.unwrap_or(object)];
        bases.extend(component_type.interfaces.iter().copied());
        Ok(bases)
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
