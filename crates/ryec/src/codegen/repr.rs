//! Boxed/unboxed representation mapping.
//!
//! The target machine's generic storage (fields, list elements, closure
//! arguments) only holds references, while arithmetic and branching
//! require raw primitives. These pure functions map a Rye type to its
//! reference descriptor and to the conversion instructions crossing that
//! boundary. `List`, `Fptr` and `Struct` values are always references and
//! have no conversion in either direction.

use rye_ast::Type;

use crate::codegen::instr::UnitBuffer;
use crate::diagnostics::{Diagnostic, DiagnosticResult};

/// Field/parameter/return descriptor for a Rye type.
pub fn descriptor(ty: &Type) -> String {
    match ty {
        Type::Int => "Ljava/lang/Integer;".to_string(),
        Type::Bool => "Ljava/lang/Boolean;".to_string(),
        Type::List => "LList;".to_string(),
        Type::Fptr { .. } => "LFptr;".to_string(),
        Type::Struct(name) => format!("L{};", name),
        Type::Void => "V".to_string(),
    }
}

/// Class name used when narrowing an untyped reference to `ty` with
/// `checkcast`. `Void` has no value and therefore no class.
pub fn class_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Int => Some("java/lang/Integer".to_string()),
        Type::Bool => Some("java/lang/Boolean".to_string()),
        Type::List => Some("List".to_string()),
        Type::Fptr { .. } => Some("Fptr".to_string()),
        Type::Struct(name) => Some(name.clone()),
        Type::Void => None,
    }
}

/// Instruction wrapping the raw primitive on top of the stack into its
/// reference type.
pub fn to_boxed(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Int => Some("invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;"),
        Type::Bool => Some("invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;"),
        _ => None,
    }
}

/// Instruction extracting the raw primitive from the reference on top of
/// the stack.
pub fn to_primitive(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Int => Some("invokevirtual java/lang/Integer/intValue()I"),
        Type::Bool => Some("invokevirtual java/lang/Boolean/booleanValue()Z"),
        _ => None,
    }
}

/// Emit the boxed default value for `ty`: zero/false for primitives, a
/// fresh empty list wrapper, a null function reference, or a
/// default-constructed struct instance. Struct members that are themselves
/// structs recurse through that struct's own constructor at runtime; the
/// struct graph is acyclic by construction upstream.
pub fn emit_default(ty: &Type, buf: &mut UnitBuffer) -> DiagnosticResult<()> {
    match ty {
        Type::Int | Type::Bool => {
            buf.instr("iconst_0");
            if let Some(boxing) = to_boxed(ty) {
                buf.instr(boxing);
            }
        }
        Type::List => {
            buf.instr("new List");
            buf.instr("dup");
            buf.instr("new java/util/ArrayList");
            buf.instr("dup");
            buf.instr("invokespecial java/util/ArrayList/<init>()V");
            buf.instr("invokespecial List/<init>(Ljava/util/ArrayList;)V");
        }
        Type::Fptr { .. } => {
            buf.instr("aconst_null");
        }
        Type::Struct(name) => {
            buf.instr(format!("new {}", name));
            buf.instr("dup");
            buf.instr(format!("invokespecial {}/<init>()V", name));
        }
        Type::Void => {
            return Err(Diagnostic::invariant(
                "no default value exists for the void type",
            ));
        }
    }
    Ok(())
}
