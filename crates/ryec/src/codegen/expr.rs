//! Expression generation.
//!
//! Every expression is lowered to an instruction sequence that leaves
//! exactly one value on the operand stack, boxed, in the statically
//! expected type. That is the contract the rest of the generator plans
//! stack depth against; the only exceptions are the void expressions
//! (`ListAppend`, void calls), which leave nothing. `gen_expr` returns the
//! static type of the produced value so callers can insert the right
//! conversion.

use rye_ast::{BinaryOp, Expr, Type, UnaryOp};

use crate::codegen::instr::UnitBuffer;
use crate::codegen::repr;
use crate::codegen::{CodeGen, UnitCx};
use crate::diagnostics::{Diagnostic, DiagnosticResult};

impl<'a> CodeGen<'a> {
    /// Main expression generation dispatch.
    pub(crate) fn gen_expr(
        &self,
        expr: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        match expr {
            Expr::IntLit(value) => {
                buf.instr(format!("ldc {}", value));
                buf.instr("invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;");
                Ok(Type::Int)
            }
            Expr::BoolLit(value) => {
                buf.instr(if *value { "ldc 1" } else { "ldc 0" });
                buf.instr("invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;");
                Ok(Type::Bool)
            }
            Expr::Ident(name) => self.gen_ident(name, buf, cx),
            Expr::Binary { op, lhs, rhs } => self.gen_binary(*op, lhs, rhs, buf, cx),
            Expr::Unary { op, operand } => self.gen_unary(*op, operand, buf, cx),
            Expr::FieldAccess { instance, field } => {
                self.gen_field_access(instance, field, buf, cx)
            }
            Expr::ListIndex {
                list,
                index,
                elem_ty,
            } => self.gen_list_index(list, index, elem_ty, buf, cx),
            Expr::Call { callee, args } => self.gen_call(callee, args, buf, cx),
            Expr::ListSize(list) => {
                self.expect_list(list, buf, cx)?;
                buf.instr("invokevirtual List/getSize()I");
                buf.instr("invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;");
                Ok(Type::Int)
            }
            Expr::ListAppend { list, element } => {
                self.expect_list(list, buf, cx)?;
                self.gen_expr(element, buf, cx)?;
                buf.instr("invokevirtual List/addElement(Ljava/lang/Object;)V");
                Ok(Type::Void)
            }
            Expr::Paren(inner) => self.gen_expr(inner, buf, cx),
        }
    }

    /// Static type of `expr`, without emitting code. The tree is already
    /// type-checked upstream; a failure here is an internal error.
    pub(crate) fn expr_type(&self, expr: &Expr, cx: &UnitCx) -> DiagnosticResult<Type> {
        match expr {
            Expr::IntLit(_) => Ok(Type::Int),
            Expr::BoolLit(_) => Ok(Type::Bool),
            Expr::Ident(name) => self.ident_type(name, cx),
            Expr::Binary { op, lhs, .. } => match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Ok(Type::Int),
                BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Gt
                | BinaryOp::Lt
                | BinaryOp::Eq => Ok(Type::Bool),
                BinaryOp::Assign => self.expr_type(lhs, cx),
            },
            Expr::Unary { op, .. } => match op {
                UnaryOp::Minus => Ok(Type::Int),
                UnaryOp::Not => Ok(Type::Bool),
            },
            Expr::FieldAccess { instance, field } => {
                let instance_ty = self.expr_type(instance, cx)?;
                let (_, field_ty) = self.field_lookup(&instance_ty, field, cx)?;
                Ok(field_ty)
            }
            Expr::ListIndex { elem_ty, .. } => Ok(elem_ty.clone()),
            Expr::Call { callee, .. } => match self.expr_type(callee, cx)? {
                Type::Fptr { ret, .. } => Ok(*ret),
                other => Err(Diagnostic::invariant(format!(
                    "call target has non-function type {:?}",
                    other
                ))
                .in_unit(&cx.unit)),
            },
            Expr::ListSize(_) => Ok(Type::Int),
            Expr::ListAppend { .. } => Ok(Type::Void),
            Expr::Paren(inner) => self.expr_type(inner, cx),
        }
    }

    fn ident_type(&self, name: &str, cx: &UnitCx) -> DiagnosticResult<Type> {
        if let Some(ty) = cx.locals.get(name) {
            return Ok(ty.clone());
        }
        if let Some(struct_name) = &cx.current_struct {
            let layout = self.symbols.struct_layout(struct_name).ok_or_else(|| {
                Diagnostic::invariant(format!("unknown struct `{}`", struct_name))
                    .in_unit(&cx.unit)
            })?;
            if let Some(ty) = layout.field_type(name) {
                return Ok(ty.clone());
            }
        }
        if let Some(ty) = self.symbols.function_type(name) {
            return Ok(ty);
        }
        Err(Diagnostic::invariant(format!("unresolved identifier `{}`", name)).in_unit(&cx.unit))
    }

    /// Resolve a member access: the owning struct's name and the member's
    /// declared type.
    fn field_lookup(
        &self,
        instance_ty: &Type,
        field: &str,
        cx: &UnitCx,
    ) -> DiagnosticResult<(String, Type)> {
        let Type::Struct(struct_name) = instance_ty else {
            return Err(Diagnostic::invariant(format!(
                "field access on non-struct type {:?}",
                instance_ty
            ))
            .in_unit(&cx.unit));
        };
        let layout = self.symbols.struct_layout(struct_name).ok_or_else(|| {
            Diagnostic::invariant(format!("unknown struct `{}`", struct_name)).in_unit(&cx.unit)
        })?;
        let field_ty = layout.field_type(field).cloned().ok_or_else(|| {
            Diagnostic::invariant(format!(
                "struct `{}` has no member `{}`",
                struct_name, field
            ))
            .in_unit(&cx.unit)
        })?;
        Ok((struct_name.clone(), field_ty))
    }

    fn gen_ident(&self, name: &str, buf: &mut UnitBuffer, cx: &mut UnitCx) -> DiagnosticResult<Type> {
        // Locals (parameters and declared variables) shadow everything else.
        if let Some(ty) = cx.locals.get(name).cloned() {
            buf.instr(format!("aload {}", cx.slots.slot_of(name)));
            return Ok(ty);
        }

        // Members of the struct whose constructor is being generated read
        // through the receiver.
        if let Some(struct_name) = cx.current_struct.clone() {
            let layout = self.symbols.struct_layout(&struct_name).ok_or_else(|| {
                Diagnostic::invariant(format!("unknown struct `{}`", struct_name))
                    .in_unit(&cx.unit)
            })?;
            if let Some(field_ty) = layout.field_type(name).cloned() {
                buf.instr("aload_0");
                buf.instr(format!(
                    "getfield {}/{} {}",
                    struct_name,
                    name,
                    repr::descriptor(&field_ty)
                ));
                return Ok(field_ty);
            }
        }

        // A function name evaluates to a bound-function value capturing
        // the current receiver and the member name. It is constructed and
        // stored on first sight in the unit, then reloaded.
        if let Some(fptr_ty) = self.symbols.function_type(name) {
            let first_use = !cx.slots.contains(name);
            let slot = cx.slots.slot_of(name);
            if first_use {
                buf.instr("new Fptr");
                buf.instr("dup");
                buf.instr("aload_0");
                buf.instr(format!("ldc \"{}\"", name));
                buf.instr("invokespecial Fptr/<init>(Ljava/lang/Object;Ljava/lang/String;)V");
                buf.instr(format!("astore {}", slot));
            }
            buf.instr(format!("aload {}", slot));
            return Ok(fptr_ty);
        }

        Err(Diagnostic::invariant(format!("unresolved identifier `{}`", name)).in_unit(&cx.unit))
    }

    fn gen_binary(
        &self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let lhs_ty = self.gen_expr(lhs, buf, cx)?;
                self.unbox(&lhs_ty, buf, cx)?;
                let rhs_ty = self.gen_expr(rhs, buf, cx)?;
                self.unbox(&rhs_ty, buf, cx)?;
                buf.instr(match op {
                    BinaryOp::Add => "iadd",
                    BinaryOp::Sub => "isub",
                    BinaryOp::Mul => "imul",
                    _ => "idiv",
                });
                buf.instr("invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;");
                Ok(Type::Int)
            }
            BinaryOp::And | BinaryOp::Or => {
                // Both operands are always evaluated: `and`/`or` are
                // bitwise on the unboxed booleans, not short-circuit.
                let lhs_ty = self.gen_expr(lhs, buf, cx)?;
                self.unbox(&lhs_ty, buf, cx)?;
                let rhs_ty = self.gen_expr(rhs, buf, cx)?;
                self.unbox(&rhs_ty, buf, cx)?;
                buf.instr(if op == BinaryOp::And { "iand" } else { "ior" });
                buf.instr("invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;");
                Ok(Type::Bool)
            }
            BinaryOp::Gt | BinaryOp::Lt => {
                let lhs_ty = self.gen_expr(lhs, buf, cx)?;
                self.unbox(&lhs_ty, buf, cx)?;
                let rhs_ty = self.gen_expr(rhs, buf, cx)?;
                self.unbox(&rhs_ty, buf, cx)?;
                let branch_false = if op == BinaryOp::Gt {
                    "if_icmple"
                } else {
                    "if_icmpge"
                };
                self.gen_compare(branch_false, buf, cx);
                Ok(Type::Bool)
            }
            BinaryOp::Eq => {
                let lhs_ty = self.gen_expr(lhs, buf, cx)?;
                match repr::to_primitive(&lhs_ty) {
                    // Primitive equality compares the raw values.
                    Some(unbox) => {
                        buf.instr(unbox);
                        let rhs_ty = self.gen_expr(rhs, buf, cx)?;
                        self.unbox(&rhs_ty, buf, cx)?;
                        self.gen_compare("if_icmpne", buf, cx);
                    }
                    // Reference equality is identity.
                    None => {
                        self.gen_expr(rhs, buf, cx)?;
                        self.gen_compare("if_acmpne", buf, cx);
                    }
                }
                Ok(Type::Bool)
            }
            BinaryOp::Assign => self.gen_assign(lhs, rhs, buf, cx, false),
        }
    }

    /// Two-label comparison: `branch_false` consumes both operands and
    /// jumps when the comparison does not hold; the join leaves a boxed
    /// boolean.
    fn gen_compare(&self, branch_false: &str, buf: &mut UnitBuffer, cx: &mut UnitCx) {
        let false_label = cx.labels.fresh();
        let join = cx.labels.fresh();
        buf.instr(format!("{} {}", branch_false, false_label));
        buf.instr("ldc 1");
        buf.instr(format!("goto {}", join));
        buf.label(false_label);
        buf.instr("ldc 0");
        buf.label(join);
        buf.instr("invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;");
    }

    fn gen_unary(
        &self,
        op: UnaryOp,
        operand: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        let operand_ty = self.gen_expr(operand, buf, cx)?;
        self.unbox(&operand_ty, buf, cx)?;
        match op {
            UnaryOp::Minus => {
                buf.instr("ineg");
                buf.instr("invokestatic java/lang/Integer/valueOf(I)Ljava/lang/Integer;");
                Ok(Type::Int)
            }
            UnaryOp::Not => {
                buf.instr("ldc 1");
                buf.instr("ixor");
                buf.instr("invokestatic java/lang/Boolean/valueOf(Z)Ljava/lang/Boolean;");
                Ok(Type::Bool)
            }
        }
    }

    fn gen_field_access(
        &self,
        instance: &Expr,
        field: &str,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        let instance_ty = self.gen_expr(instance, buf, cx)?;
        let (struct_name, field_ty) = self.field_lookup(&instance_ty, field, cx)?;
        buf.instr(format!(
            "getfield {}/{} {}",
            struct_name,
            field,
            repr::descriptor(&field_ty)
        ));
        Ok(field_ty)
    }

    fn gen_list_index(
        &self,
        list: &Expr,
        index: &Expr,
        elem_ty: &Type,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        self.expect_list(list, buf, cx)?;
        let index_ty = self.gen_expr(index, buf, cx)?;
        self.unbox(&index_ty, buf, cx)?;
        buf.instr("invokevirtual List/getElement(I)Ljava/lang/Object;");
        let class = repr::class_name(elem_ty).ok_or_else(|| {
            Diagnostic::invariant("list element annotated with the void type").in_unit(&cx.unit)
        })?;
        buf.instr(format!("checkcast {}", class));
        Ok(elem_ty.clone())
    }

    fn gen_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        let callee_ty = self.gen_expr(callee, buf, cx)?;
        let Type::Fptr { params, ret } = callee_ty else {
            return Err(Diagnostic::invariant(format!(
                "call target has non-function type {:?}",
                callee_ty
            ))
            .in_unit(&cx.unit));
        };
        if params.len() != args.len() {
            return Err(Diagnostic::invariant(format!(
                "call passes {} arguments to a function of {} parameters",
                args.len(),
                params.len()
            ))
            .in_unit(&cx.unit));
        }

        // Arguments travel boxed in a runtime-assembled list, appended in
        // left-to-right order.
        buf.instr("new java/util/ArrayList");
        buf.instr("dup");
        buf.instr("invokespecial java/util/ArrayList/<init>()V");
        for arg in args {
            buf.instr("dup");
            self.gen_expr(arg, buf, cx)?;
            buf.instr("invokevirtual java/util/ArrayList/add(Ljava/lang/Object;)Z");
            buf.instr("pop");
        }
        buf.instr("invokevirtual Fptr/invoke(Ljava/util/ArrayList;)Ljava/lang/Object;");

        // Narrow the untyped result to the declared return type. A void
        // call has no result; invoke's null placeholder is dropped here so
        // void-typed expressions uniformly leave nothing on the stack.
        match repr::class_name(&ret) {
            Some(class) => buf.instr(format!("checkcast {}", class)),
            None => buf.instr("pop"),
        }
        Ok(*ret)
    }

    /// Assignment expression. `store` is true only when the assignment is
    /// the direct target of an assignment statement: the value is then
    /// duplicated and written back, and the duplicate is what the
    /// expression yields. A nested assignment evaluates to its right-hand
    /// side without storing.
    pub(crate) fn gen_assign(
        &self,
        target: &Expr,
        value: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
        store: bool,
    ) -> DiagnosticResult<Type> {
        if !store {
            return self.gen_rvalue(value, buf, cx);
        }
        match target {
            Expr::Ident(name) => {
                let ty = self.gen_rvalue(value, buf, cx)?;
                buf.instr("dup");
                buf.instr(format!("astore {}", cx.slots.slot_of(name)));
                Ok(ty)
            }
            Expr::FieldAccess { instance, field } => {
                let instance_ty = self.gen_expr(instance, buf, cx)?;
                let (struct_name, field_ty) = self.field_lookup(&instance_ty, field, cx)?;
                let ty = self.gen_rvalue(value, buf, cx)?;
                buf.instr("dup_x1");
                buf.instr(format!(
                    "putfield {}/{} {}",
                    struct_name,
                    field,
                    repr::descriptor(&field_ty)
                ));
                Ok(ty)
            }
            Expr::ListIndex { list, index, .. } => {
                self.expect_list(list, buf, cx)?;
                let index_ty = self.gen_expr(index, buf, cx)?;
                self.unbox(&index_ty, buf, cx)?;
                let ty = self.gen_rvalue(value, buf, cx)?;
                buf.instr("dup_x2");
                buf.instr("invokevirtual List/setElement(ILjava/lang/Object;)V");
                Ok(ty)
            }
            other => Err(Diagnostic::invariant(format!(
                "assignment target is not a storage location: {:?}",
                other
            ))
            .in_unit(&cx.unit)),
        }
    }

    /// Generate the right-hand side of an assignment or initialization.
    /// Lists assign by value: a fresh wrapper is constructed over the
    /// source list's contents rather than aliasing it.
    pub(crate) fn gen_rvalue(
        &self,
        value: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<Type> {
        if self.expr_type(value, cx)? == Type::List {
            buf.instr("new List");
            buf.instr("dup");
            self.gen_expr(value, buf, cx)?;
            buf.instr("invokevirtual List/getElements()Ljava/util/ArrayList;");
            buf.instr("invokespecial List/<init>(Ljava/util/ArrayList;)V");
            return Ok(Type::List);
        }
        self.gen_expr(value, buf, cx)
    }

    /// Generate `list` and check it actually is one.
    fn expect_list(
        &self,
        list: &Expr,
        buf: &mut UnitBuffer,
        cx: &mut UnitCx,
    ) -> DiagnosticResult<()> {
        let ty = self.gen_expr(list, buf, cx)?;
        if ty != Type::List {
            return Err(Diagnostic::invariant(format!(
                "list operation on non-list type {:?}",
                ty
            ))
            .in_unit(&cx.unit));
        }
        Ok(())
    }

    /// Emit the conversion from the boxed value on top of the stack to its
    /// raw primitive. Only `Int` and `Bool` have one.
    pub(crate) fn unbox(
        &self,
        ty: &Type,
        buf: &mut UnitBuffer,
        cx: &UnitCx,
    ) -> DiagnosticResult<()> {
        match repr::to_primitive(ty) {
            Some(conversion) => {
                buf.instr(conversion);
                Ok(())
            }
            None => Err(Diagnostic::invariant(format!(
                "no primitive representation for type {:?}",
                ty
            ))
            .in_unit(&cx.unit)),
        }
    }
}
