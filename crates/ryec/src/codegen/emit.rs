//! Top-level unit emission.
//!
//! The emitter drives generation unit by unit: one class per struct, then
//! the entry class with the static process wrapper, the entry body, and
//! one method per declared function. Slot and label state is fresh for
//! every logical unit; a unit whose generation fails is reported and never
//! written.

use anyhow::Result;
use rye_ast::{FnDecl, Program, StructDecl, Type};

use crate::codegen::instr::UnitBuffer;
use crate::codegen::repr;
use crate::codegen::{CodeGen, UnitCx};
use crate::diagnostics::{self, Diagnostic, DiagnosticResult};

/// Report a generation failure and convert it for the driver.
fn report(d: Diagnostic) -> anyhow::Error {
    diagnostics::emit_diagnostic(&d);
    anyhow::Error::new(d)
}

impl<'a> CodeGen<'a> {
    /// Generate the complete unit set for `program`: structs first, then
    /// the entry unit.
    pub fn generate(&self, program: &Program) -> Result<()> {
        for decl in &program.structs {
            let unit = self.gen_struct_unit(decl).map_err(report)?;
            self.sink.write_unit(&unit)?;
        }
        let unit = self.gen_entry_unit(program).map_err(report)?;
        self.sink.write_unit(&unit)?;
        Ok(())
    }

    fn method_headers(&self, buf: &mut UnitBuffer) {
        buf.directive(".limit stack 128");
        buf.directive(".limit locals 128");
    }

    /// One class per struct: a type-tagged field per member and a default
    /// constructor that runs every member's initializer.
    fn gen_struct_unit(&self, decl: &StructDecl) -> DiagnosticResult<UnitBuffer> {
        let mut buf = UnitBuffer::new(&decl.name);
        buf.directive(format!(".class public {}", decl.name));
        buf.directive(".super java/lang/Object");
        for member in &decl.members {
            buf.directive(format!(
                ".field public {} {}",
                member.name,
                repr::descriptor(&member.ty)
            ));
        }

        buf.directive(".method public <init>()V");
        self.method_headers(&mut buf);
        buf.instr("aload_0");
        buf.instr("invokespecial java/lang/Object/<init>()V");

        let mut cx = UnitCx::for_struct(&decl.name);
        for member in &decl.members {
            buf.instr("aload_0");
            match &member.default {
                Some(init) => {
                    self.gen_rvalue(init, &mut buf, &mut cx)?;
                }
                None => {
                    repr::emit_default(&member.ty, &mut buf)
                        .map_err(|d| d.in_unit(&decl.name))?;
                }
            }
            buf.instr(format!(
                "putfield {}/{} {}",
                decl.name,
                member.name,
                repr::descriptor(&member.ty)
            ));
        }
        buf.instr("return");
        buf.directive(".end method");
        Ok(buf)
    }

    /// The entry unit: a static wrapper that allocates one instance of the
    /// entry class (whose constructor runs the top-level statements),
    /// followed by one method per declared function.
    fn gen_entry_unit(&self, program: &Program) -> DiagnosticResult<UnitBuffer> {
        let mut buf = UnitBuffer::new("Main");
        buf.directive(".class public Main");
        buf.directive(".super java/lang/Object");

        buf.directive(".method public static main([Ljava/lang/String;)V");
        self.method_headers(&mut buf);
        buf.instr("new Main");
        buf.instr("invokespecial Main/<init>()V");
        buf.instr("return");
        buf.directive(".end method");

        buf.directive(".method public <init>()V");
        self.method_headers(&mut buf);
        buf.instr("aload_0");
        buf.instr("invokespecial java/lang/Object/<init>()V");
        let mut cx = UnitCx::new("Main");
        self.gen_stmt(&program.main.body, &mut buf, &mut cx)?;
        buf.instr("return");
        buf.directive(".end method");

        for decl in &program.functions {
            self.gen_function(decl, &mut buf)?;
        }
        Ok(buf)
    }

    /// One method per function, with descriptors from the declared
    /// signature. Parameters claim slots 1..n in declaration order; slot 0
    /// is the receiver. Only void functions get the implicit trailing
    /// return; non-void functions exit through an explicit `Return`,
    /// verified upstream to exist on all paths.
    fn gen_function(&self, decl: &FnDecl, buf: &mut UnitBuffer) -> DiagnosticResult<()> {
        let mut param_descs = String::new();
        for param in &decl.params {
            param_descs.push_str(&repr::descriptor(&param.ty));
        }
        buf.directive(format!(
            ".method public {}({}){}",
            decl.name,
            param_descs,
            repr::descriptor(&decl.ret)
        ));
        self.method_headers(buf);

        let mut cx = UnitCx::new(&decl.name);
        for param in &decl.params {
            cx.slots.slot_of(&param.name);
            cx.locals.insert(param.name.clone(), param.ty.clone());
        }

        self.gen_stmt(&decl.body, buf, &mut cx)?;
        if decl.ret == Type::Void {
            buf.instr("return");
        }
        buf.directive(".end method");
        Ok(())
    }
}
