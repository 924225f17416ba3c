//! Indented text view of a function, for tracing and IR dumps.

use std::fmt::{self, Write};

use crate::expr::{Alloc, ExprKind};
use crate::function::Function;
use crate::ids::ExprId;

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn(param: {}) -> {}", self.param_ty, self.result_ty)?;
        let mut printer = Printer {
            func: self,
            out: f,
            indent: 0,
        };
        printer.stmt(self.body)
    }
}

struct Printer<'a, 'f, 'w> {
    func: &'a Function,
    out: &'f mut fmt::Formatter<'w>,
    indent: usize,
}

impl Printer<'_, '_, '_> {
    fn line(&mut self) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        Ok(())
    }

    /// Print `id` on its own line(s).
    fn stmt(&mut self, id: ExprId) -> fmt::Result {
        self.line()?;
        self.expr(id)?;
        self.out.write_char('\n')
    }

    fn block_body(&mut self, id: ExprId) -> fmt::Result {
        self.out.write_str("{\n")?;
        self.indent += 1;
        let func = self.func;
        if let ExprKind::Block {
            locals,
            stmts,
            result,
        } = func.arena.kind(id)
        {
            for &local in locals {
                self.line()?;
                let decl = func.local(local);
                writeln!(self.out, "let {local} {}: {}", decl.name, decl.ty)?;
            }
            for &s in func.arena.list(*stmts) {
                self.stmt(s)?;
            }
            if let Some(r) = result {
                self.line()?;
                self.out.write_str("=> ")?;
                self.expr(*r)?;
                self.out.write_char('\n')?;
            }
        } else {
            self.stmt(id)?;
        }
        self.indent -= 1;
        self.line()?;
        self.out.write_char('}')
    }

    fn args(&mut self, ids: &[ExprId]) -> fmt::Result {
        for (i, &a) in ids.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            self.expr(a)?;
        }
        Ok(())
    }

    fn expr(&mut self, id: ExprId) -> fmt::Result {
        let func = self.func;
        match func.arena.kind(id) {
            ExprKind::Constant(v) => write!(self.out, "{v}"),
            ExprKind::Param => self.out.write_str("param"),
            ExprKind::Local(l) => write!(self.out, "{l}"),
            ExprKind::Assign { local, value } => {
                write!(self.out, "{local} = ")?;
                self.expr(*value)
            }
            ExprKind::Field { target, name, .. } => {
                self.expr(*target)?;
                write!(self.out, ".{name}")
            }
            ExprKind::SetField {
                target,
                name,
                value,
                ..
            } => {
                self.expr(*target)?;
                write!(self.out, ".{name} = ")?;
                self.expr(*value)
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                match receiver {
                    Some(r) => self.expr(*r)?,
                    None => write!(self.out, "{}", method.owner)?,
                }
                write!(self.out, ".{}(", method.name)?;
                self.args(func.arena.list(*args))?;
                self.out.write_char(')')
            }
            ExprKind::Construct {
                ty,
                alloc,
                args,
                inits,
            } => {
                let kind = match alloc {
                    Alloc::Record { .. } => "record",
                    Alloc::Sequence => "list",
                    Alloc::Map => "map",
                    Alloc::Host { .. } => "host",
                };
                write!(self.out, "new {kind} {ty}(")?;
                self.args(func.arena.list(*args))?;
                self.out.write_char(')')?;
                if !inits.is_empty() {
                    self.out.write_str(" { ")?;
                    for (i, init) in inits.iter().enumerate() {
                        if i > 0 {
                            self.out.write_str(", ")?;
                        }
                        write!(self.out, "{}: ", init.name)?;
                        self.expr(init.value)?;
                    }
                    self.out.write_str(" }")?;
                }
                Ok(())
            }
            ExprKind::Convert { value, target } => {
                write!(self.out, "({target})")?;
                self.expr(*value)
            }
            ExprKind::Binary { op, left, right } => {
                self.out.write_char('(')?;
                self.expr(*left)?;
                write!(self.out, " {} ", op.as_symbol())?;
                self.expr(*right)?;
                self.out.write_char(')')
            }
            ExprKind::Unary { op, operand } => {
                self.out.write_str(op.as_symbol())?;
                self.expr(*operand)
            }
            ExprKind::Step { op, local } => {
                let sym = if op.is_increment() { "++" } else { "--" };
                if op.yields_new() {
                    write!(self.out, "{sym}{local}")
                } else {
                    write!(self.out, "{local}{sym}")
                }
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.out.write_str("if ")?;
                self.expr(*cond)?;
                self.out.write_char(' ')?;
                self.block_body(*then_branch)?;
                if let Some(e) = else_branch {
                    self.out.write_str(" else ")?;
                    self.block_body(*e)?;
                }
                Ok(())
            }
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            } => {
                write!(self.out, "loop {break_label}/{continue_label} ")?;
                self.block_body(*body)
            }
            ExprKind::Block { .. } => self.block_body(id),
            ExprKind::Return(value) => {
                self.out.write_str("return")?;
                if let Some(v) = value {
                    self.out.write_char(' ')?;
                    self.expr(*v)?;
                }
                Ok(())
            }
            ExprKind::Break(label) => write!(self.out, "break {label}"),
            ExprKind::Continue(label) => write!(self.out, "continue {label}"),
        }
    }
}
