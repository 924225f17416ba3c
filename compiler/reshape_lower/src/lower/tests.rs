use pretty_assertions::assert_eq;
use reshape_ir::{
    BinaryOp, BuildError, Builder, ExprArena, ExprKind, Function, LabelId, LocalDecl, StepOp,
};
use reshape_types::{EvalError, TypeId, TypeRegistry, Value};

use crate::{lower, LowerError};

fn person(reg: &TypeRegistry) -> TypeId {
    reg.record("Person")
        .property("Name", TypeId::STRING)
        .property("Age", TypeId::I32)
        .finish()
}

#[test]
fn reads_fields_and_concatenates() {
    let reg = TypeRegistry::new();
    let person = person(&reg);
    let mut b = Builder::new(&reg, person, TypeId::STRING);
    let p = b.param();
    let name = b.member(p, "Name").unwrap();
    let sep = b.str(":");
    let head = b.binary(BinaryOp::Add, name, sep).unwrap();
    let p = b.param();
    let age = b.member(p, "Age").unwrap();
    let text = b.binary(BinaryOp::Add, head, age).unwrap();
    let f = lower(&b.finish(text).unwrap()).unwrap();

    let obj = reshape_types::ObjectRef::new(person, vec![Value::string("Ann"), Value::I32(30)]);
    assert_eq!(f.call(Value::Object(obj)).unwrap(), Value::string("Ann:30"));
    assert!(matches!(
        f.call(Value::Null),
        Err(EvalError::NullReference { .. })
    ));
}

#[test]
fn constructs_records_with_initializers() {
    let reg = TypeRegistry::new();
    let person = person(&reg);
    let mut b = Builder::new(&reg, TypeId::STRING, person);
    let p = b.param();
    let obj = b.construct(person, &[], &[("Name", p)]).unwrap();
    let f = lower(&b.finish(obj).unwrap()).unwrap();

    let out = f.call(Value::string("Bo")).unwrap();
    let out = out.as_object().unwrap();
    assert_eq!(out.fields(), vec![Value::string("Bo"), Value::I32(0)]);
}

#[test]
fn for_range_sums_with_continue() {
    let reg = TypeRegistry::new();
    let mut b = Builder::new(&reg, TypeId::I32, TypeId::I32);
    let total = b.declare("total", TypeId::I32);
    let zero = b.int(0);
    let end = b.param();
    b.for_range("i", zero, end, |b, i, labels| {
        // Skip i == 2.
        let iv = b.local(i);
        let two = b.int(2);
        let is_two = b.binary(BinaryOp::Eq, iv, two)?;
        b.if_then(is_two, |b| {
            b.cont(labels);
            Ok::<(), BuildError>(())
        })?;
        let t = b.local(total);
        let iv = b.local(i);
        let sum = b.binary(BinaryOp::Add, t, iv)?;
        b.assign(total, sum)
    })
    .unwrap();
    let result = b.local(total);
    let f = lower(&b.finish(result).unwrap()).unwrap();

    assert_eq!(f.call(Value::I32(5)).unwrap(), Value::I32(8));
    assert_eq!(f.call(Value::I32(0)).unwrap(), Value::I32(0));
    // Fresh frame per call.
    assert_eq!(f.call(Value::I32(5)).unwrap(), Value::I32(8));
}

#[test]
fn early_return_and_break() {
    let reg = TypeRegistry::new();
    let mut b = Builder::new(&reg, TypeId::I32, TypeId::STRING);
    let zero = b.int(0);
    let n = b.var("n", zero);
    b.while_loop(
        |b| Ok::<_, BuildError>(b.bool(true)),
        |b, labels| {
            let step = b.step(StepOp::PreInc, n)?;
            let p = b.param();
            let hit = b.binary(BinaryOp::GtEq, step, p)?;
            b.if_then(hit, |b| {
                b.brk(labels);
                Ok::<(), BuildError>(())
            })
        },
    )
    .unwrap();
    let nv = b.local(n);
    let hundred = b.int(100);
    let big = b.binary(BinaryOp::Gt, nv, hundred).unwrap();
    b.if_then(big, |b| {
        let s = b.str("big");
        b.ret(Some(s))
    })
    .unwrap();
    let nv = b.local(n);
    let text = b.convert(nv, TypeId::STRING);
    let f = lower(&b.finish(text).unwrap()).unwrap();

    assert_eq!(f.call(Value::I32(7)).unwrap(), Value::string("7"));
    assert_eq!(f.call(Value::I32(101)).unwrap(), Value::string("big"));
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let reg = TypeRegistry::new();
    let person = person(&reg);
    let mut b = Builder::new(&reg, person, TypeId::BOOL);
    let p = b.param();
    let present = b.not_null(p).unwrap();
    let p = b.param();
    let age = b.member(p, "Age").unwrap();
    let zero = b.int(0);
    let positive = b.binary(BinaryOp::Gt, age, zero).unwrap();
    let both = b.binary(BinaryOp::And, present, positive).unwrap();
    let f = lower(&b.finish(both).unwrap()).unwrap();

    // A null input would fail the field read if it were evaluated.
    assert_eq!(f.call(Value::Null).unwrap(), Value::Bool(false));
}

#[test]
fn runtime_errors_are_scoped_to_the_call() {
    let reg = TypeRegistry::new();
    let mut b = Builder::new(&reg, TypeId::STRING, TypeId::I32);
    let p = b.param();
    let n = b.convert(p, TypeId::I32);
    let f = lower(&b.finish(n).unwrap()).unwrap();

    assert!(matches!(
        f.call(Value::string("x")),
        Err(EvalError::InvalidConversion { .. })
    ));
    assert_eq!(f.call(Value::string("12")).unwrap(), Value::I32(12));
    assert!(matches!(
        f.call(Value::I32(1)),
        Err(EvalError::TypeMismatch { .. })
    ));
}

#[test]
fn host_objects_through_native_methods() {
    let reg = TypeRegistry::new();
    let mut b = Builder::new(&reg, TypeId::STRING, TypeId::STRING);
    let buf = b.construct(TypeId::TEXT_BUFFER, &[], &[]).unwrap();
    let buf = b.var("buf", buf);
    let target = b.local(buf);
    let p = b.param();
    let append = b.call(target, "AppendJsonString", &[p]).unwrap();
    b.emit(append);
    let target = b.local(buf);
    let text = b.call(target, "ToString", &[]).unwrap();
    let f = lower(&b.finish(text).unwrap()).unwrap();

    assert_eq!(
        f.call(Value::string("a\"b")).unwrap(),
        Value::string("\"a\\\"b\"")
    );
    assert_eq!(f.call(Value::Null).unwrap(), Value::string("null"));
}

/// Hand-assembled IR the builder would never produce.
fn raw(kinds: Vec<(ExprKind, TypeId)>, result_ty: TypeId) -> Function {
    let mut arena = ExprArena::new();
    let mut last = None;
    for (kind, ty) in kinds {
        last = Some(arena.push(kind, ty));
    }
    let body = last.unwrap();
    Function {
        arena,
        body,
        param_ty: TypeId::VOID,
        result_ty,
        locals: vec![LocalDecl {
            name: "x".into(),
            ty: TypeId::I32,
        }],
    }
}

#[test]
fn dangling_jumps_are_rejected() {
    let func = raw(vec![(ExprKind::Break(LabelId::new(3)), TypeId::VOID)], TypeId::VOID);
    assert!(matches!(lower(&func), Err(LowerError::InvalidIr(_))));
}

#[test]
fn unsupported_conversions_are_rejected() {
    let mut arena = ExprArena::new();
    let flag = arena.push(ExprKind::Constant(Value::Bool(true)), TypeId::BOOL);
    let body = arena.push(
        ExprKind::Convert {
            value: flag,
            target: TypeId::I32,
        },
        TypeId::I32,
    );
    let func = Function {
        arena,
        body,
        param_ty: TypeId::VOID,
        result_ty: TypeId::I32,
        locals: Vec::new(),
    };
    assert_eq!(
        lower(&func).unwrap_err(),
        LowerError::UnsupportedOperation {
            op: "convert".into(),
            operands: format!("{} to {}", TypeId::BOOL, TypeId::I32),
        }
    );
}

#[test]
fn lowering_is_repeatable() {
    let reg = TypeRegistry::new();
    let mut b = Builder::new(&reg, TypeId::I64, TypeId::I64);
    let p = b.param();
    let two = b.constant(Value::I64(2), TypeId::I64);
    let double = b.binary(BinaryOp::Mul, p, two).unwrap();
    let func = b.finish(double).unwrap();
    let first = lower(&func).unwrap();
    let second = lower(&func).unwrap();
    for n in [-3_i64, 0, 21] {
        assert_eq!(first.call(Value::I64(n)), second.call(Value::I64(n)));
    }
    assert!(matches!(
        first.call(Value::I64(i64::MAX)),
        Err(EvalError::IntegerOverflow { .. })
    ));
}
