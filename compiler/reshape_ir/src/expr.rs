//! Expression nodes.
//!
//! Member and method names are resolved while building: nodes carry slot
//! indices and native function pointers, plus the names for the debug view.

use reshape_types::{MethodDef, NativeFn, TypeId, Value};

use crate::ids::{ExprId, ExprRange, LabelId, LocalId};
use crate::ops::{BinaryOp, StepOp, UnaryOp};

/// A resolved method: the overload chosen at build time.
#[derive(Clone, Debug)]
pub struct MethodRef {
    /// Declaring type.
    pub owner: TypeId,
    pub name: String,
    pub ret: TypeId,
    pub imp: NativeFn,
}

impl MethodRef {
    pub fn new(owner: TypeId, def: &MethodDef) -> Self {
        MethodRef {
            owner,
            name: def.name.clone(),
            ret: def.ret,
            imp: def.imp,
        }
    }
}

/// How a `Construct` node allocates its value.
#[derive(Clone, Debug)]
pub enum Alloc {
    /// Record with one slot per property, initialized to these defaults.
    Record { defaults: Vec<Value> },
    Sequence,
    Map,
    /// Host object built by its native constructor.
    Host { imp: NativeFn },
}

/// Named member initializer of a `Construct` node.
#[derive(Clone, Debug)]
pub struct FieldInit {
    pub index: usize,
    pub name: String,
    pub value: ExprId,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Constant(Value),
    /// The function's single input.
    Param,
    Local(LocalId),
    Assign {
        local: LocalId,
        value: ExprId,
    },
    /// Property read by slot.
    Field {
        target: ExprId,
        index: usize,
        name: String,
    },
    /// Property write by slot.
    SetField {
        target: ExprId,
        index: usize,
        name: String,
        value: ExprId,
    },
    /// Method call. `receiver` is `None` for static methods.
    Call {
        receiver: Option<ExprId>,
        method: MethodRef,
        args: ExprRange,
    },
    Construct {
        ty: TypeId,
        alloc: Alloc,
        args: ExprRange,
        inits: Vec<FieldInit>,
    },
    Convert {
        value: ExprId,
        target: TypeId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Step {
        op: StepOp,
        local: LocalId,
    },
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    /// Repeat `body` until a `Break` targeting `break_label`.
    Loop {
        body: ExprId,
        break_label: LabelId,
        continue_label: LabelId,
    },
    /// Statement sequence. `locals` are reset to their defaults on entry.
    Block {
        locals: Vec<LocalId>,
        stmts: ExprRange,
        result: Option<ExprId>,
    },
    Return(Option<ExprId>),
    Break(LabelId),
    Continue(LabelId),
}

/// Declared local variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDecl {
    pub name: String,
    pub ty: TypeId,
}
