//! The pure expression evaluator (§4.3): `eval(expr, scope) -> Value`.
//! No statement-level side effects happen here, only reads.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::ast::{BinOp, Expr, Lookup, UnOp};
use crate::error::{RailwayError, RailwayResult};
use crate::scope::Scope;
use crate::value::Value;

/// Supplies the things an expression can read that aren't in its own
/// scope frame: other modules' (already-evaluated) globals, and this
/// thread's identity. Implemented by [`crate::thread_ctx::ThreadContext`]
/// for normal execution, and by a lightweight bootstrap resolver while
/// a module's own globals are still being computed (see
/// [`crate::registry`]).
pub trait NameResolver {
    fn resolve_global(&self, name: &str) -> RailwayResult<Value>;
    fn thread_id(&self) -> usize;
    fn num_threads(&self) -> usize;
}

pub fn eval(expr: &Expr, scope: &Scope, resolver: &dyn NameResolver) -> RailwayResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(n.clone())),
        Expr::Lookup(lookup) => eval_lookup(lookup, scope, resolver),
        Expr::ArrayLiteral(items) => {
            let values = items
                .iter()
                .map(|e| eval(e, scope, resolver))
                .collect::<RailwayResult<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        Expr::ArrayRange { start, end, step } => {
            let start = as_rational(eval(start, scope, resolver)?)?;
            let end = as_rational(eval(end, scope, resolver)?)?;
            let step = match step {
                Some(s) => as_rational(eval(s, scope, resolver)?)?,
                None => BigRational::from_integer(BigInt::from(1)),
            };
            eval_range(&start, &end, &step)
        }
        Expr::ArrayTensor { fill, shape } => {
            let fill_val = eval(fill, scope, resolver)?;
            let dims = shape
                .iter()
                .map(|e| {
                    let v = eval(e, scope, resolver)?;
                    as_usize(&v)
                })
                .collect::<RailwayResult<Vec<_>>>()?;
            Ok(build_tensor(&fill_val, &dims))
        }
        Expr::Len(inner) => {
            let v = eval(inner, scope, resolver)?;
            Ok(Value::from_i64(v.len()? as i64))
        }
        Expr::BinOp(op, lhs, rhs) => {
            let l = eval(lhs, scope, resolver)?;
            let r = eval(rhs, scope, resolver)?;
            eval_binop(*op, &l, &r)
        }
        Expr::UnOp(op, inner) => {
            let v = eval(inner, scope, resolver)?;
            match op {
                UnOp::Neg => v.negate(),
                UnOp::Not => v.logical_not(),
            }
        }
        Expr::ThreadId => Ok(Value::from_i64(resolver.thread_id() as i64)),
        Expr::NumThreads => Ok(Value::from_i64(resolver.num_threads() as i64)),
    }
}

fn eval_lookup(lookup: &Lookup, scope: &Scope, resolver: &dyn NameResolver) -> RailwayResult<Value> {
    let mut value = if crate::ast::split_qualified(&lookup.name).is_some() {
        resolver.resolve_global(&lookup.name)?
    } else if scope.contains(&lookup.name) {
        scope.get(&lookup.name)?
    } else {
        resolver.resolve_global(&lookup.name)?
    };
    for index_expr in &lookup.indices {
        let index = eval(index_expr, scope, resolver)?;
        let idx_num = index.as_number()?;
        let items = value.as_array()?;
        let i = Value::resolve_index(items.len(), idx_num)?;
        value = items[i].clone();
    }
    Ok(value)
}

fn eval_binop(op: BinOp, l: &Value, r: &Value) -> RailwayResult<Value> {
    match op {
        BinOp::Add => l.add(r),
        BinOp::Sub => l.sub(r),
        BinOp::Mul => l.mul(r),
        BinOp::Div => l.div(r),
        BinOp::FloorDiv => l.floor_div(r),
        BinOp::Mod => l.rem(r),
        BinOp::Pow => l.pow(r),
        BinOp::Xor => l.bitxor(r),
        BinOp::And => l.bitand(r),
        BinOp::Or => l.bitor(r),
        BinOp::Lt => l.cmp_lt(r),
        BinOp::Le => l.cmp_le(r),
        BinOp::Gt => l.cmp_gt(r),
        BinOp::Ge => l.cmp_ge(r),
        BinOp::Eq => Ok(l.cmp_eq(r)),
        BinOp::Ne => Ok(l.cmp_ne(r)),
    }
}

fn as_rational(v: Value) -> RailwayResult<BigRational> {
    match v {
        Value::Number(n) => Ok(n),
        Value::Array(_) => Err(RailwayError::type_error("expected a number")),
    }
}

fn as_usize(v: &Value) -> RailwayResult<usize> {
    let n = v.as_number()?;
    if !n.is_integer() || n.is_negative() {
        return Err(RailwayError::type_error("expected a non-negative integer"));
    }
    n.to_integer()
        .to_usize()
        .ok_or_else(|| RailwayError::type_error("value out of representable range"))
}

fn eval_range(start: &BigRational, end: &BigRational, step: &BigRational) -> RailwayResult<Value> {
    if step.is_zero() {
        return Err(RailwayError::arithmetic_error("array range step of zero"));
    }
    let mut values = Vec::new();
    let mut cur = start.clone();
    if step.is_positive() {
        while &cur < end {
            values.push(Value::Number(cur.clone()));
            cur += step;
        }
    } else {
        while &cur > end {
            values.push(Value::Number(cur.clone()));
            cur += step;
        }
    }
    Ok(Value::Array(values))
}

fn build_tensor(fill: &Value, shape: &[usize]) -> Value {
    match shape.split_first() {
        None => fill.clone(),
        Some((&head, rest)) => Value::Array((0..head).map(|_| build_tensor(fill, rest)).collect()),
    }
}
