//! Type-directed code generation.
//!
//! The emitter drives one translation unit at a time (structs first, then
//! the entry unit with the program's functions); within a unit the
//! statement generator delegates to the expression generator, which
//! delegates to the representation converter in `repr`. Slot and label
//! allocation live in a per-unit `UnitCx` passed explicitly through the
//! recursive calls, so nothing leaks across units and units could be
//! generated in parallel without sharing mutable state.

pub mod emit;
pub mod expr;
pub mod instr;
pub mod repr;
pub mod stmt;

use std::collections::HashMap;

use rye_ast::Type;

use crate::sink::OutputSink;
use crate::types::SymbolTable;

/// Local-variable slot table for one logical unit.
///
/// Slots are 1-based; slot 0 is the implicit receiver in instance
/// contexts. The index assigned to a name is one plus the number of
/// distinct names seen strictly before it, in first-use order, which
/// makes emitted slot numbers reproducible byte-for-byte.
#[derive(Debug, Default)]
pub struct SlotTable {
    names: Vec<String>,
}

impl SlotTable {
    /// Index for `name`: the existing one if the name was seen before in
    /// this unit, otherwise the next fresh index.
    pub fn slot_of(&mut self, name: &str) -> usize {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            return pos + 1;
        }
        self.names.push(name.to_string());
        self.names.len()
    }

    /// Whether `name` has already claimed a slot in this unit.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Monotonic branch-target allocator, reset per unit.
#[derive(Debug, Default)]
pub struct LabelAlloc {
    next: u32,
}

impl LabelAlloc {
    pub fn fresh(&mut self) -> String {
        let label = format!("Label_{}", self.next);
        self.next += 1;
        label
    }
}

/// Per-logical-unit generation context.
///
/// One `UnitCx` lives for exactly one struct constructor, the entry body,
/// or one function body; nothing in it survives across units.
pub struct UnitCx {
    /// Unit name, used to tag diagnostics.
    pub unit: String,
    pub slots: SlotTable,
    pub labels: LabelAlloc,
    /// Declared types of locals (parameters and variable declarations).
    pub locals: HashMap<String, Type>,
    /// Set to the struct's name while generating its default constructor;
    /// member names then resolve to fields of the receiver.
    pub current_struct: Option<String>,
}

impl UnitCx {
    pub fn new(unit: &str) -> Self {
        UnitCx {
            unit: unit.to_string(),
            slots: SlotTable::default(),
            labels: LabelAlloc::default(),
            locals: HashMap::new(),
            current_struct: None,
        }
    }

    pub fn for_struct(name: &str) -> Self {
        let mut cx = UnitCx::new(name);
        cx.current_struct = Some(name.to_string());
        cx
    }
}

/// Shared state for one emission run: the symbol information collected
/// from the program and the sink that owns the output directory. All
/// mutable generation state is per-unit and lives in `UnitCx`.
pub struct CodeGen<'a> {
    pub symbols: &'a SymbolTable,
    pub sink: &'a OutputSink,
}
