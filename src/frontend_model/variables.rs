use crate::frontend_model::types::{Modifiers, TypeId};
use crate::translator_messages::translator_errors::TranslatorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableOwner {
    Field {
        declaring: TypeId,
    },

    /// Locals and parameters. `declaring_type` is the type whose method (or initializer)
    /// declares the variable.
    Local { declaring_type: TypeId },
}

/// Compile-time constant value of a field or local
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub name: String,
    pub ty: TypeId,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub effectively_final: bool,
    pub owner: VariableOwner,
    #[serde(default)]
    pub constant: Option<ConstantValue>,
}

impl VariableBinding {
    pub fn field(name: &str, ty: TypeId, declaring: TypeId, modifiers: u32) -> Self {
        VariableBinding {
            name: name.to_owned(),
            ty,
            modifiers: Modifiers::new(modifiers),
            effectively_final: false,
            owner: VariableOwner::Field { declaring },
            constant: None,
        }
    }

    pub fn local(name: &str, ty: TypeId, declaring_type: TypeId) -> Self {
        VariableBinding {
            name: name.to_owned(),
            ty,
            modifiers: Modifiers::default(),
            effectively_final: false,
            owner: VariableOwner::Local { declaring_type },
            constant: None,
        }
    }

    pub fn with_constant(mut self, constant: ConstantValue) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn effectively_final(mut self) -> Self {
        self.effectively_final = true;
        self
    }

    pub fn is_field(&self) -> bool {
        matches!(self.owner, VariableOwner::Field { .. })
    }

    /// Declared final or never reassigned after initialization
    pub fn is_capturable(&self) -> bool {
        self.modifiers.is_final() || self.effectively_final
    }

    /// Type that declares the field, or whose body declares the local
    pub fn declaring_type(&self) -> TypeId {
        match self.owner {
            VariableOwner::Field { declaring } => declaring,
            VariableOwner::Local { declaring_type } => declaring_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableTable {
    variables: Vec<VariableBinding>,
}

impl VariableTable {
    pub fn new() -> Self {
        VariableTable::default()
    }

    pub fn insert(&mut self, binding: VariableBinding) -> VarId {
        self.variables.push(binding);
        VarId((self.variables.len() - 1) as u32)
    }

    pub fn get(&self, id: VarId) -> Result<&VariableBinding, TranslatorError> {
        self.variables.get(id.0 as usize).ok_or_else(|| {
            TranslatorError::binding_gap(format!(
                "Variable id {} is not in the variable table",
                id.0
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
