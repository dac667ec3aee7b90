// Struct unit emission and default-value synthesis.

use anyhow::Result;
use rye_ast::{MainDecl, Program, Stmt, StructDecl, Type};

use super::common::{assert_seq, emit_to_map, int, var, var_init};

fn program_with_structs(structs: Vec<StructDecl>) -> Program {
    Program {
        structs,
        main: MainDecl {
            body: Stmt::Block(vec![]),
        },
        functions: vec![],
    }
}

// A struct with an uninitialized int member and a list member: the int
// defaults to boxed zero, the list to a fresh empty wrapper.
#[test]
fn struct_unit_synthesizes_member_defaults() -> Result<()> {
    let program = program_with_structs(vec![StructDecl {
        name: "Box".to_string(),
        members: vec![var("n", Type::Int), var("items", Type::List)],
    }]);
    let (_dir, units) = emit_to_map(&program)?;
    let unit = &units["Box.j"];

    assert_seq(
        unit,
        &[
            ".class public Box",
            ".super java/lang/Object",
            ".field public n Ljava/lang/Integer;",
            ".field public items LList;",
            ".method public <init>()V",
            "aload_0",
            "invokespecial java/lang/Object/<init>()V",
            "aload_0",
            "iconst_0",
            "invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;",
            "putfield Box/n Ljava/lang/Integer;",
            "aload_0",
            "new List",
            "dup",
            "new java/util/ArrayList",
            "dup",
            "invokespecial java/util/ArrayList/<init>()V",
            "invokespecial List/<init>(Ljava/util/ArrayList;)V",
            "putfield Box/items LList;",
            "return",
            ".end method",
        ],
    );
    Ok(())
}

#[test]
fn explicit_member_default_overrides_synthesis() -> Result<()> {
    let program = program_with_structs(vec![StructDecl {
        name: "Counter".to_string(),
        members: vec![var_init("start", Type::Int, int(5))],
    }]);
    let (_dir, units) = emit_to_map(&program)?;
    let unit = &units["Counter.j"];

    assert_seq(unit, &["ldc 5", "putfield Counter/start"]);
    assert!(!unit.contains("iconst_0"));
    Ok(())
}

// Synthesizing the default for the same type twice yields identical
// instruction sequences.
#[test]
fn default_synthesis_is_repeatable() -> Result<()> {
    let program = program_with_structs(vec![StructDecl {
        name: "Pair".to_string(),
        members: vec![var("first", Type::List), var("second", Type::List)],
    }]);
    let (_dir, units) = emit_to_map(&program)?;
    let unit = &units["Pair.j"];

    let list_default = [
        "new List",
        "dup",
        "new java/util/ArrayList",
        "dup",
        "invokespecial java/util/ArrayList/<init>()V",
        "invokespecial List/<init>(Ljava/util/ArrayList;)V",
    ];
    let mut twice: Vec<&str> = Vec::new();
    twice.extend_from_slice(&list_default);
    twice.push("putfield Pair/first LList;");
    twice.extend_from_slice(&list_default);
    twice.push("putfield Pair/second LList;");
    assert_seq(unit, &twice);
    Ok(())
}

// A struct-typed member default-constructs an instance of that struct,
// recursing through its constructor.
#[test]
fn struct_member_defaults_through_its_own_constructor() -> Result<()> {
    let program = program_with_structs(vec![
        StructDecl {
            name: "Inner".to_string(),
            members: vec![var("v", Type::Int)],
        },
        StructDecl {
            name: "Outer".to_string(),
            members: vec![var("inner", Type::Struct("Inner".to_string()))],
        },
    ]);
    let (_dir, units) = emit_to_map(&program)?;

    assert!(units.contains_key("Inner.j"));
    let outer = &units["Outer.j"];
    assert_seq(
        outer,
        &[
            ".field public inner LInner;",
            "new Inner",
            "dup",
            "invokespecial Inner/<init>()V",
            "putfield Outer/inner LInner;",
        ],
    );
    Ok(())
}

// Fptr members default to a null reference.
#[test]
fn fptr_member_defaults_to_null() -> Result<()> {
    let program = program_with_structs(vec![StructDecl {
        name: "Handler".to_string(),
        members: vec![var(
            "callback",
            Type::Fptr {
                params: vec![Type::Int],
                ret: Box::new(Type::Void),
            },
        )],
    }]);
    let (_dir, units) = emit_to_map(&program)?;
    let unit = &units["Handler.j"];

    assert_seq(
        unit,
        &[
            ".field public callback LFptr;",
            "aconst_null",
            "putfield Handler/callback LFptr;",
        ],
    );
    Ok(())
}
