//! Rye AST definitions
//!
//! This crate defines the abstract syntax tree (AST) for the Rye language
//! as it leaves the frontend: type-checked and scope-resolved. It serves as
//! the contract between the frontend and the code generator, and carries
//! serde derives so a frontend can hand the backend a serialized tree.

use serde::{Deserialize, Serialize};

/// The top-level program node: struct declarations, the entry point, and
/// function declarations, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub structs: Vec<StructDecl>,
    pub main: MainDecl,
    pub functions: Vec<FnDecl>,
}

/// Struct declaration: a named, ordered list of member declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<VarDecl>,
}

/// Program entry-point declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainDecl {
    pub body: Stmt,
}

/// Function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Stmt,
}

/// Typed function parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// Variable (or struct member) declaration with an optional default-value
/// expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub default: Option<Expr>,
}

/// Types in the Rye language.
///
/// `Int` and `Bool` are value types that box at machine boundaries;
/// `List`, `Fptr` and `Struct` are reference-identity types. `List` carries
/// no element type at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
    List,
    Fptr { params: Vec<Type>, ret: Box<Type> },
    Struct(String),
    Void,
}

/// Statements in the AST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
    },
    Loop {
        cond: Expr,
        body: Box<Stmt>,
        kind: LoopKind,
    },
    VarDecl(Vec<VarDecl>),
    Assign {
        target: Expr,
        value: Expr,
    },
    Return(Option<Expr>),
    Display(Expr),
    /// Bare call used for its effect.
    ExprStmt(Expr),
    /// Statement form of a `ListAppend` expression.
    ListAppend(Expr),
    /// Statement form of a `ListSize` expression.
    ListSize(Expr),
}

/// Whether a loop tests its condition before or after the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopKind {
    PreTest,
    PostTest,
}

/// Expressions in the AST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i32),
    BoolLit(bool),
    /// Resolved upstream to either a local slot or a bound-function value.
    Ident(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FieldAccess {
        instance: Box<Expr>,
        field: String,
    },
    /// `elem_ty` is the statically known element type the access narrows
    /// to; the `List` type itself is elementless.
    ListIndex {
        list: Box<Expr>,
        index: Box<Expr>,
        elem_ty: Type,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ListSize(Box<Expr>),
    ListAppend {
        list: Box<Expr>,
        element: Box<Expr>,
    },
    Paren(Box<Expr>),
}

/// Binary operators. `Assign` is an expression-level operator; the
/// assignment statement wraps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Gt,
    Lt,
    Eq,
    Assign,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Not,
}
