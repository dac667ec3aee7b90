// Arithmetic, boxing discipline, and comparison lowering.

use anyhow::Result;
use rye_ast::{BinaryOp, Expr, Stmt, StructDecl, Type, UnaryOp};

use super::common::{assert_seq, bin, emit_to_map, entry_program, ident, int, label_defs, var, var_init};

// `int x; x = x + 1; display x;`: uninitialized x defaults to boxed zero
// in slot 1, the sum is re-boxed and stored back, and display unboxes.
#[test]
fn uninitialized_int_increments_from_zero() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![var("x", Type::Int)]),
        Stmt::Assign {
            target: ident("x"),
            value: bin(BinaryOp::Add, ident("x"), int(1)),
        },
        Stmt::Display(ident("x")),
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_seq(
        main,
        &[
            "iconst_0",
            "invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;",
            "astore 1",
            "aload 1",
            "invokevirtual java/lang/Integer/intValue()I",
            "ldc 1",
            "invokevirtual java/lang/Integer/intValue()I",
            "iadd",
            "invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;",
            "dup",
            "astore 1",
            "pop",
            "getstatic java/lang/System/out Ljava/io/PrintStream;",
            "aload 1",
            "invokevirtual java/lang/Integer/intValue()I",
            "invokevirtual java/io/PrintStream/println(I)V",
        ],
    );
    Ok(())
}

// `if (a > b) display 1; else display 0;`: one comparison branch, one
// unconditional join branch per construct, four distinct labels in total
// (two for the comparison, two for the conditional).
#[test]
fn greater_than_conditional_uses_two_labels_per_construct() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![
            var_init("a", Type::Int, int(2)),
            var_init("b", Type::Int, int(1)),
        ]),
        Stmt::If {
            cond: bin(BinaryOp::Gt, ident("a"), ident("b")),
            then: Box::new(Stmt::Display(int(1))),
            els: Some(Box::new(Stmt::Display(int(0)))),
        },
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_eq!(main.matches("if_icmple").count(), 1);
    assert_eq!(main.matches("goto").count(), 2);
    assert_eq!(main.matches("println(I)V").count(), 2);

    let defs = label_defs(main);
    assert_eq!(defs.len(), 4);
    let mut unique = defs.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4, "labels must be distinct: {:?}", defs);

    assert_seq(
        main,
        &[
            "if_icmple Label_0",
            "ldc 1",
            "goto Label_1",
            "Label_0:",
            "ldc 0",
            "Label_1:",
            "invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;",
            "invokevirtual java/lang/Boolean/booleanValue()Z",
            "ifeq Label_2",
        ],
    );
    Ok(())
}

#[test]
fn logical_ops_evaluate_both_operands_without_branching() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![
            var_init("p", Type::Bool, Expr::BoolLit(true)),
            var_init("q", Type::Bool, Expr::BoolLit(false)),
        ]),
        Stmt::Display(bin(BinaryOp::And, ident("p"), ident("q"))),
        Stmt::Display(bin(BinaryOp::Or, ident("p"), ident("q"))),
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_seq(main, &["iand"]);
    assert_seq(main, &["ior"]);
    // Both operands are loaded for each op; and/or never branch.
    assert_eq!(label_defs(main).len(), 0);
    assert_seq(
        main,
        &[
            "aload 1",
            "invokevirtual java/lang/Boolean/booleanValue()Z",
            "aload 2",
            "invokevirtual java/lang/Boolean/booleanValue()Z",
            "iand",
        ],
    );
    Ok(())
}

#[test]
fn equality_on_structs_compares_identity() -> Result<()> {
    let program = rye_ast::Program {
        structs: vec![StructDecl {
            name: "Point".to_string(),
            members: vec![var("x", Type::Int)],
        }],
        main: rye_ast::MainDecl {
            body: Stmt::Block(vec![
                Stmt::VarDecl(vec![
                    var("p", Type::Struct("Point".to_string())),
                    var("q", Type::Struct("Point".to_string())),
                ]),
                Stmt::Display(bin(BinaryOp::Eq, ident("p"), ident("q"))),
            ]),
        },
        functions: vec![],
    };
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_seq(main, &["aload 1", "aload 2", "if_acmpne"]);
    assert!(!main.contains("if_icmpne"));
    Ok(())
}

#[test]
fn equality_on_ints_compares_values() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![
            var_init("a", Type::Int, int(3)),
            var_init("b", Type::Int, int(3)),
        ]),
        Stmt::Display(bin(BinaryOp::Eq, ident("a"), ident("b"))),
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_seq(
        main,
        &[
            "aload 1",
            "invokevirtual java/lang/Integer/intValue()I",
            "aload 2",
            "invokevirtual java/lang/Integer/intValue()I",
            "if_icmpne",
        ],
    );
    assert!(!main.contains("if_acmpne"));
    Ok(())
}

#[test]
fn unary_minus_and_not_lower_without_branching() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![var_init("n", Type::Int, int(4))]),
        Stmt::Display(Expr::Unary {
            op: UnaryOp::Minus,
            operand: Box::new(ident("n")),
        }),
        Stmt::Display(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::BoolLit(false)),
        }),
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    assert_seq(
        main,
        &[
            "aload 1",
            "invokevirtual java/lang/Integer/intValue()I",
            "ineg",
            "invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;",
        ],
    );
    assert_seq(
        main,
        &[
            "invokevirtual java/lang/Boolean/booleanValue()Z",
            "ldc 1",
            "ixor",
            "invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;",
        ],
    );
    Ok(())
}

// A nested assignment is an expression yielding the assigned value, but
// only the statement-level assignment writes back.
#[test]
fn nested_assignment_does_not_store() -> Result<()> {
    let program = entry_program(vec![
        Stmt::VarDecl(vec![
            var_init("a", Type::Int, int(0)),
            var_init("b", Type::Int, int(0)),
        ]),
        Stmt::Assign {
            target: ident("a"),
            value: bin(BinaryOp::Assign, ident("b"), int(5)),
        },
    ]);
    let (_dir, units) = emit_to_map(&program)?;
    let main = &units["Main.j"];

    // Only the outer store to `a` (slot 1) happens; `b` (slot 2) is
    // stored exactly once, by its declaration.
    assert_eq!(main.matches("astore 1").count(), 2); // decl + assignment
    assert_eq!(main.matches("astore 2").count(), 1); // decl only
    Ok(())
}
