//! Statement and control-flow generation.
//!
//! Statements sequence the expression generator's output and consume
//! labels for branching. Conditions are generated boxed like every other
//! expression, then unboxed before the branch instruction.

use rye_ast::{Expr, LoopKind, Stmt, Type, VarDecl};

use crate::codegen::instr::UnitBuffer;
use crate::codegen::repr;
use crate::codegen::{CodeGen, UnitCx};
use crate::diagnostics::{Diagnostic, DiagnosticResult};

impl<'a> CodeGen<'a> {
    /// Main statement generation dispatch.
    pub(crate) fn gen_stmt(
        &self,
        stmt: &Stmt,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        match stmt {
            Stmt::Block(stmts) => {
                for stmt in stmts {
                    self.gen_stmt(stmt, buf, cx)?;
                }
                Ok(())
            }
            Stmt::VarDecl(decls) => {
                for decl in decls {
                    self.gen_var_decl(decl, buf, cx)?;
                }
                Ok(())
            }
            Stmt::Assign { target, value } => {
                // The statement form routes through the assignment
                // expression and discards the duplicated result.
                self.gen_assign(target, value, buf, cx, true)?;
                buf.instr("pop");
                Ok(())
            }
            Stmt::If { cond, then, els } => self.gen_if(cond, then, els.as_deref(), buf, cx),
            Stmt::Loop { cond, body, kind } => self.gen_loop(cond, body, *kind, buf, cx),
            Stmt::Return(value) => {
                match value {
                    Some(expr) => {
                        self.gen_expr(expr, buf, cx)?;
                        buf.instr("areturn");
                    }
                    None => buf.instr("return"),
                }
                Ok(())
            }
            Stmt::Display(arg) => self.gen_display(arg, buf, cx),
            Stmt::ExprStmt(expr) | Stmt::ListAppend(expr) | Stmt::ListSize(expr) => {
                let ty = self.gen_expr(expr, buf, cx)?;
                if ty != Type::Void {
                    buf.instr("pop");
                }
                Ok(())
            }
        }
    }

    /// Declared variable: run its default-or-explicit initializer, then
    /// store into a freshly allocated slot.
    fn gen_var_decl(
        &self,
        decl: &VarDecl,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        match &decl.default {
            Some(init) => {
                self.gen_rvalue(init, buf, cx)?;
            }
            None => {
                repr::emit_default(&decl.ty, buf).map_err(|d| d.in_unit(&cx.unit))?;
            }
        }
        cx.locals.insert(decl.name.clone(), decl.ty.clone());
        buf.instr(format!("astore {}", cx.slots.slot_of(&decl.name)));
        Ok(())
    }

    /// Condition value, unboxed and ready for `ifeq`/`ifne`.
    fn gen_condition(
        &self,
        cond: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        let ty = self.gen_expr(cond, buf, cx)?;
        if ty != Type::Bool {
            return Err(Diagnostic::invariant(format!(
                "branch condition has non-boolean type {:?}",
                ty
            ))
            .in_unit(&cx.unit));
        }
        self.unbox(&ty, buf, cx)
    }

    fn gen_if(
        &self,
        cond: &Expr,
        then: &Stmt,
        els: Option<&Stmt>,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        self.gen_condition(cond, buf, cx)?;
        match els {
            Some(els) => {
                let else_label = cx.labels.fresh();
                let join = cx.labels.fresh();
                buf.instr(format!("ifeq {}", else_label));
                self.gen_stmt(then, buf, cx)?;
                buf.instr(format!("goto {}", join));
                buf.label(else_label);
                self.gen_stmt(els, buf, cx)?;
                buf.label(join);
            }
            None => {
                // Without an else branch the false target is the join.
                let join = cx.labels.fresh();
                buf.instr(format!("ifeq {}", join));
                self.gen_stmt(then, buf, cx)?;
                buf.label(join);
            }
        }
        Ok(())
    }

    fn gen_loop(
        &self,
        cond: &Expr,
        body: &Stmt,
        kind: LoopKind,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        match kind {
            LoopKind::PreTest => {
                let test = cx.labels.fresh();
                let exit = cx.labels.fresh();
                buf.label(test.clone());
                self.gen_condition(cond, buf, cx)?;
                buf.instr(format!("ifeq {}", exit));
                self.gen_stmt(body, buf, cx)?;
                buf.instr(format!("goto {}", test));
                buf.label(exit);
            }
            LoopKind::PostTest => {
                let top = cx.labels.fresh();
                buf.label(top.clone());
                self.gen_stmt(body, buf, cx)?;
                self.gen_condition(cond, buf, cx)?;
                buf.instr(format!("ifne {}", top));
            }
        }
        Ok(())
    }

    fn gen_display(
        &self,
        arg: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        buf.instr("getstatic java/lang/System/out Ljava/io/PrintStream;");
        let ty = self.gen_expr(arg, buf, cx)?;
        match ty {
            Type::Int => {
                self.unbox(&ty, buf, cx)?;
                buf.instr("invokevirtual java/io/PrintStream/println(I)V");
                Ok(())
            }
            Type::Bool => {
                self.unbox(&ty, buf, cx)?;
                buf.instr("invokevirtual java/io/PrintStream/println(Z)V");
                Ok(())
            }
            other => Err(Diagnostic::invariant(format!(
                "display argument has non-primitive type {:?}",
                other
            ))
            .in_unit(&cx.unit)),
        }
    }
}
