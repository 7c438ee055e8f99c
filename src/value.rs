//! The Railway value model.
//!
//! A [`Value`] is either an exact rational number or an ordered array of
//! values. Arithmetic is always exact: numbers are arbitrary-precision
//! rationals, never floats. Arrays nest to arbitrary depth but never form
//! cycles, so [`Clone`] is always a full, independent deep copy.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{RailwayError, RailwayResult};

/// A runtime value: an exact rational scalar or a nested array of values.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Number(BigRational),
    Array(Vec<Value>),
}

impl Value {
    pub fn zero() -> Self {
        Value::Number(BigRational::zero())
    }

    pub fn from_i64(n: i64) -> Self {
        Value::Number(BigRational::from_integer(BigInt::from(n)))
    }

    /// `#` applied to this value: the array length.
    pub fn len(&self) -> RailwayResult<usize> {
        match self {
            Value::Array(items) => Ok(items.len()),
            Value::Number(_) => Err(RailwayError::type_error("'#' applied to a scalar, not an array")),
        }
    }

    pub fn as_number(&self) -> RailwayResult<&BigRational> {
        match self {
            Value::Number(n) => Ok(n),
            Value::Array(_) => Err(RailwayError::type_error("expected a number, found an array")),
        }
    }

    pub fn as_array(&self) -> RailwayResult<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            Value::Number(_) => Err(RailwayError::type_error("expected an array, found a number")),
        }
    }

    pub fn as_array_mut(&mut self) -> RailwayResult<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Ok(items),
            Value::Number(_) => Err(RailwayError::type_error("expected an array, found a number")),
        }
    }

    /// True (nonzero) or false (zero), per Railway's boolean convention.
    pub fn truthy(&self) -> RailwayResult<bool> {
        Ok(!self.as_number()?.is_zero())
    }

    pub fn logical_not(&self) -> RailwayResult<Value> {
        Ok(if self.truthy()? { Value::zero() } else { Value::Number(BigRational::from_integer(BigInt::from(1))) })
    }

    pub fn negate(&self) -> RailwayResult<Value> {
        Ok(Value::Number(-self.as_number()?.clone()))
    }

    /// Resolve an array index, wrapping negative indices modulo length
    /// (so `key[-i % klen]`-style usages behave as the sample programs
    /// expect) and rejecting out-of-range positive indices.
    pub fn resolve_index(len: usize, index: &BigRational) -> RailwayResult<usize> {
        if !index.is_integer() {
            return Err(RailwayError::type_error("array index must be an integer"));
        }
        let idx = index
            .to_integer()
            .to_i64()
            .ok_or_else(|| RailwayError::index_error("array index out of representable range"))?;
        let len_i = len as i64;
        let resolved = if idx < 0 {
            if len_i == 0 {
                return Err(RailwayError::index_error("index into an empty array"));
            }
            let wrapped = idx % len_i;
            if wrapped == 0 { 0 } else { len_i + wrapped }
        } else {
            idx
        };
        if resolved < 0 || resolved >= len_i {
            return Err(RailwayError::index_error(format!(
                "index {idx} out of range for array of length {len}"
            )));
        }
        Ok(resolved as usize)
    }

    pub fn add(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::Number(self.as_number()? + other.as_number()?))
    }

    pub fn sub(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::Number(self.as_number()? - other.as_number()?))
    }

    pub fn mul(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::Number(self.as_number()? * other.as_number()?))
    }

    pub fn div(&self, other: &Value) -> RailwayResult<Value> {
        let rhs = other.as_number()?;
        if rhs.is_zero() {
            return Err(RailwayError::arithmetic_error("division by zero"));
        }
        Ok(Value::Number(self.as_number()? / rhs))
    }

    pub fn floor_div(&self, other: &Value) -> RailwayResult<Value> {
        let rhs = other.as_number()?;
        if rhs.is_zero() {
            return Err(RailwayError::arithmetic_error("floor division by zero"));
        }
        let quotient = self.as_number()? / rhs;
        Ok(Value::Number(BigRational::from_integer(quotient.floor().to_integer())))
    }

    pub fn rem(&self, other: &Value) -> RailwayResult<Value> {
        let rhs = other.as_number()?;
        if rhs.is_zero() {
            return Err(RailwayError::arithmetic_error("remainder by zero"));
        }
        let lhs = self.as_number()?;
        let quotient = (lhs / rhs).floor();
        Ok(Value::Number(lhs - quotient * rhs))
    }

    pub fn pow(&self, other: &Value) -> RailwayResult<Value> {
        let base = self.as_number()?;
        let exp = other.as_number()?;
        if !exp.is_integer() {
            return Err(RailwayError::type_error("'**' requires an integer exponent"));
        }
        let exp_i = exp
            .to_integer()
            .to_i64()
            .ok_or_else(|| RailwayError::arithmetic_error("exponent out of representable range"))?;
        if exp_i >= 0 {
            Ok(Value::Number(pow_rational(base, exp_i as u64)))
        } else {
            if base.is_zero() {
                return Err(RailwayError::arithmetic_error("zero to a negative power"));
            }
            Ok(Value::Number(pow_rational(&base.recip(), (-exp_i) as u64)))
        }
    }

    fn as_bigint_operand(&self, what: &str) -> RailwayResult<BigInt> {
        let n = self.as_number()?;
        if !n.is_integer() {
            return Err(RailwayError::arithmetic_error(format!("'{what}' requires integer-valued operands")));
        }
        Ok(n.to_integer())
    }

    pub fn bitxor(&self, other: &Value) -> RailwayResult<Value> {
        let a = self.as_bigint_operand("^")?;
        let b = other.as_bigint_operand("^")?;
        Ok(Value::Number(BigRational::from_integer(a ^ b)))
    }

    pub fn bitand(&self, other: &Value) -> RailwayResult<Value> {
        let a = self.as_bigint_operand("&")?;
        let b = other.as_bigint_operand("&")?;
        Ok(Value::Number(BigRational::from_integer(a & b)))
    }

    pub fn bitor(&self, other: &Value) -> RailwayResult<Value> {
        let a = self.as_bigint_operand("|")?;
        let b = other.as_bigint_operand("|")?;
        Ok(Value::Number(BigRational::from_integer(a | b)))
    }

    pub fn cmp_lt(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::from_bool(self.as_number()? < other.as_number()?))
    }
    pub fn cmp_le(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::from_bool(self.as_number()? <= other.as_number()?))
    }
    pub fn cmp_gt(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::from_bool(self.as_number()? > other.as_number()?))
    }
    pub fn cmp_ge(&self, other: &Value) -> RailwayResult<Value> {
        Ok(Value::from_bool(self.as_number()? >= other.as_number()?))
    }
    pub fn cmp_eq(&self, other: &Value) -> Value {
        Value::from_bool(self == other)
    }
    pub fn cmp_ne(&self, other: &Value) -> Value {
        Value::from_bool(self != other)
    }

    fn from_bool(b: bool) -> Value {
        if b { Value::from_i64(1) } else { Value::zero() }
    }
}

fn pow_rational(base: &BigRational, exp: u64) -> BigRational {
    let mut result = BigRational::from_integer(BigInt::from(1));
    let mut b = base.clone();
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = &result * &b;
        }
        b = &b * &b;
        e >>= 1;
    }
    result
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_integer() {
                    write!(f, "{}", n.to_integer())
                } else {
                    write!(f, "{}/{}", n.numer(), n.denom())
                }
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Whether this value is negative (used by `//`/`%` sign conventions and
/// sanity-checking typed-file loading).
pub fn is_negative(v: &Value) -> RailwayResult<bool> {
    Ok(v.as_number()?.is_negative())
}
