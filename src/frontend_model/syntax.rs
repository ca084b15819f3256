//! Syntax tree of a compilation unit, with every name already bound.

use crate::frontend_model::types::{MethodRef, Modifiers, TypeId};
use crate::frontend_model::variables::VarId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub binding: TypeId,
    #[serde(default)]
    pub enum_constants: Vec<EnumConstant>,
    #[serde(default)]
    pub body: Vec<BodyDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub field: VarId,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub constructor: Option<MethodRef>,

    // Constant with its own class body
    #[serde(default)]
    pub body: Option<TypeDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyDeclaration {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Initializer(Initializer),
    Type(TypeDeclaration),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub fragments: Vec<VariableFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableFragment {
    pub variable: VarId,
    #[serde(default)]
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub method: MethodRef,
    #[serde(default)]
    pub parameters: Vec<VarId>,

    // None for abstract and native methods
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    #[serde(default)]
    pub is_static: bool,
    pub body: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    #[serde(default)]
    pub modifiers: Modifiers,
    pub fragments: Vec<VariableFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub parameter: VarId,

    // Multi-catch alternatives. Empty means the parameter's own type.
    #[serde(default)]
    pub alternatives: Vec<TypeId>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expressions(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwitchEntry {
    // None is `default:`
    Case(Option<Expression>),
    Statement(Statement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Block(Block),
    Empty,
    Expression(Expression),
    VariableDeclaration(VariableDeclaration),
    LocalClass(TypeDeclaration),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        #[serde(default)]
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },
    For {
        #[serde(default)]
        initializer: Option<ForInit>,
        #[serde(default)]
        condition: Option<Expression>,
        #[serde(default)]
        updaters: Vec<Expression>,
        body: Box<Statement>,
    },
    EnhancedFor {
        variable: VarId,
        iterable: Expression,
        body: Box<Statement>,
    },
    Return(Option<Expression>),
    Break(Option<String>),
    Continue(Option<String>),
    Throw(Expression),
    Labeled {
        label: String,
        body: Box<Statement>,
    },
    Switch {
        selector: Expression,
        entries: Vec<SwitchEntry>,
    },
    Synchronized {
        monitor: Expression,
        body: Block,
    },
    Try {
        #[serde(default)]
        resources: Vec<VariableDeclaration>,
        body: Block,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Block>,
    },

    /// `this(...)` as the first statement of a constructor
    ConstructorCall {
        constructor: MethodRef,
        #[serde(default)]
        arguments: Vec<Expression>,
    },

    /// `super(...)` or `outer.super(...)` as the first statement of a constructor
    SuperConstructorCall {
        constructor: MethodRef,
        #[serde(default)]
        outer: Option<Expression>,
        #[serde(default)]
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,

    /// Static type of the expression
    pub ty: TypeId,
}

impl Expression {
    pub fn new(kind: ExpressionKind, ty: TypeId) -> Self {
        Expression { kind, ty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Times,
    Divide,
    Remainder,
    Plus,
    Minus,
    LeftShift,
    RightShiftSigned,
    RightShiftUnsigned,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    Equals,
    NotEquals,
    Xor,
    And,
    Or,
    ConditionalAnd,
    ConditionalOr,
}

impl InfixOperator {
    pub fn token(self) -> &'static str {
        match self {
            InfixOperator::Times => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Remainder => "%",
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::LeftShift => "<<",
            InfixOperator::RightShiftSigned => ">>",
            InfixOperator::RightShiftUnsigned => ">>>",
            InfixOperator::Less => "<",
            InfixOperator::Greater => ">",
            InfixOperator::LessEquals => "<=",
            InfixOperator::GreaterEquals => ">=",
            InfixOperator::Equals => "==",
            InfixOperator::NotEquals => "!=",
            InfixOperator::Xor => "^",
            InfixOperator::And => "&",
            InfixOperator::Or => "|",
            InfixOperator::ConditionalAnd => "&&",
            InfixOperator::ConditionalOr => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    PlusAssign,
    MinusAssign,
    TimesAssign,
    DivideAssign,
    RemainderAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftSignedAssign,
    RightShiftUnsignedAssign,
}

impl AssignmentOperator {
    pub fn token(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::PlusAssign => "+=",
            AssignmentOperator::MinusAssign => "-=",
            AssignmentOperator::TimesAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
            AssignmentOperator::RemainderAssign => "%=",
            AssignmentOperator::AndAssign => "&=",
            AssignmentOperator::OrAssign => "|=",
            AssignmentOperator::XorAssign => "^=",
            AssignmentOperator::LeftShiftAssign => "<<=",
            AssignmentOperator::RightShiftSignedAssign => ">>=",
            AssignmentOperator::RightShiftUnsignedAssign => ">>>=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    Increment,
    Decrement,
    Plus,
    Minus,
    Complement,
    Not,
}

impl PrefixOperator {
    pub fn token(self) -> &'static str {
        match self {
            PrefixOperator::Increment => "++",
            PrefixOperator::Decrement => "--",
            PrefixOperator::Plus => "+",
            PrefixOperator::Minus => "-",
            PrefixOperator::Complement => "~",
            PrefixOperator::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl PostfixOperator {
    pub fn token(self) -> &'static str {
        match self {
            PostfixOperator::Increment => "++",
            PostfixOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Literal(Literal),

    /// Simple name bound to a local, parameter or field
    Variable(VarId),

    /// Name bound to a type, only valid as the qualifier of a static access
    TypeName(TypeId),

    FieldAccess {
        target: Box<Expression>,
        field: VarId,
    },
    SuperFieldAccess {
        #[serde(default)]
        qualifier: Option<TypeId>,
        field: VarId,
    },
    This {
        #[serde(default)]
        qualifier: Option<TypeId>,
    },
    MethodCall {
        #[serde(default)]
        target: Option<Box<Expression>>,
        method: MethodRef,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        type_arguments: Vec<TypeId>,
    },
    SuperMethodCall {
        #[serde(default)]
        qualifier: Option<TypeId>,
        method: MethodRef,
        #[serde(default)]
        arguments: Vec<Expression>,
    },

    /// Class instance creation. For anonymous classes `class` is the anonymous type and
    /// `constructor` the superclass constructor the arguments go to.
    New {
        #[serde(default)]
        outer: Option<Box<Expression>>,
        class: TypeId,
        #[serde(default)]
        constructor: Option<MethodRef>,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        type_arguments: Vec<TypeId>,
        #[serde(default)]
        anonymous: Option<Box<TypeDeclaration>>,
    },
    ArrayCreation {
        array_type: TypeId,
        #[serde(default)]
        dimensions: Vec<Expression>,
        #[serde(default)]
        initializer: Option<Vec<Expression>>,
    },
    ArrayInitializer(Vec<Expression>),
    ArrayAccess {
        array: Box<Expression>,
        index: Box<Expression>,
    },
    Assignment {
        target: Box<Expression>,
        operator: AssignmentOperator,
        value: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
        #[serde(default)]
        extended: Vec<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Postfix {
        operator: PostfixOperator,
        operand: Box<Expression>,
    },
    Cast {
        target: TypeId,
        operand: Box<Expression>,
    },
    InstanceOf {
        operand: Box<Expression>,
        target: TypeId,
    },
    Conditional {
        condition: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
    },
    TypeLiteral(TypeId),
    Parenthesized(Box<Expression>),
}
