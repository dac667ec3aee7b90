//! Symbol information consumed during generation.
//!
//! Name resolution and type checking happen upstream; the backend only
//! needs a by-name index of each struct's member layout and each
//! function's signature, so it can re-enter those namespaces while
//! visiting the corresponding declarations. The table is built once from
//! the program and is read-only during generation.

use std::collections::HashMap;

use rye_ast::{Program, Type};

use crate::diagnostics::{Diagnostic, DiagnosticResult};

/// A function's declared signature.
#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

/// Ordered member layout of a struct.
#[derive(Debug, Clone)]
pub struct StructLayout {
    pub fields: Vec<(String, Type)>,
}

impl StructLayout {
    pub fn field_type(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

/// By-name index of struct layouts and function signatures.
pub struct SymbolTable {
    structs: HashMap<String, StructLayout>,
    functions: HashMap<String, FunctionSig>,
}

impl SymbolTable {
    /// Collect layouts and signatures from an already-validated program.
    /// A duplicate name at this stage is an upstream bug, not user input.
    pub fn from_program(program: &Program) -> DiagnosticResult<Self> {
        let mut structs = HashMap::new();
        for decl in &program.structs {
            let layout = StructLayout {
                fields: decl
                    .members
                    .iter()
                    .map(|m| (m.name.clone(), m.ty.clone()))
                    .collect(),
            };
            if structs.insert(decl.name.clone(), layout).is_some() {
                return Err(Diagnostic::invariant(format!(
                    "duplicate struct declaration `{}`",
                    decl.name
                )));
            }
        }

        let mut functions = HashMap::new();
        for decl in &program.functions {
            let sig = FunctionSig {
                params: decl.params.iter().map(|p| p.ty.clone()).collect(),
                ret: decl.ret.clone(),
            };
            if functions.insert(decl.name.clone(), sig).is_some() {
                return Err(Diagnostic::invariant(format!(
                    "duplicate function declaration `{}`",
                    decl.name
                )));
            }
        }

        Ok(SymbolTable { structs, functions })
    }

    pub fn struct_layout(&self, name: &str) -> Option<&StructLayout> {
        self.structs.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSig> {
        self.functions.get(name)
    }

    /// The `Fptr` type a reference to the named function evaluates to.
    pub fn function_type(&self, name: &str) -> Option<Type> {
        self.functions.get(name).map(|sig| Type::Fptr {
            params: sig.params.clone(),
            ret: Box::new(sig.ret.clone()),
        })
    }
}
