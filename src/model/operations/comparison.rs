//! Equality and hashing with per-object overrides.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::model::error::ProtoError;
use crate::model::function::Args;
use crate::model::object::Node;
use crate::model::operations::bind::bind_found;
use crate::model::operations::lookup::lookup;
use crate::model::space::{Space, EQ, HASH};
use crate::model::value::Value;

/// `lhs == rhs`.
///
/// A prototype's `_eq` is looked up through its chain and called with the other
/// operand. The left operand is asked first; when it has no override the right
/// one is asked with the operands swapped. Without any override, values compare
/// by [`Value`] equality, which is identity for prototypes.
pub fn equals(space: &mut Space, lhs: &Value, rhs: &Value) -> Result<bool, ProtoError> {
    if let Some(method) = find_override(space, lhs, EQ)? {
        let result = space.call(&method, Args::new().arg(rhs.clone()))?;
        return Ok(result.is_truthy());
    }
    if let Some(method) = find_override(space, rhs, EQ)? {
        let result = space.call(&method, Args::new().arg(lhs.clone()))?;
        return Ok(result.is_truthy());
    }
    Ok(lhs == rhs)
}

/// Hash of `value`, consistent with [`equals`] as long as overrides agree.
pub fn hash_value(space: &mut Space, value: &Value) -> Result<u64, ProtoError> {
    if let Some(method) = find_override(space, value, HASH)? {
        let result = space.call(&method, Args::new())?;
        return Ok(result.as_int()? as u64);
    }
    let mut hasher = DefaultHasher::new();
    hash_into(value, &mut hasher);
    Ok(hasher.finish())
}

fn find_override(space: &Space, value: &Value, name: &str) -> Result<Option<Value>, ProtoError> {
    let node = match value {
        Value::Object(id) => Node::Proto(*id),
        _ => return Ok(None),
    };
    match lookup(space, &node, name, None) {
        Ok(found) => Ok(Some(bind_found(value, found))),
        Err(e) if e.is_missing(name) => Ok(None),
        Err(e) => Err(e),
    }
}

fn hash_into<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::None => 0u8.hash(state),
        Value::Bool(b) => b.hash(state),
        // Ints compare with floats as f64, so both hash as f64.
        Value::Int(i) => number_bits(*i as f64).hash(state),
        Value::Float(f) => number_bits(*f).hash(state),
        Value::Str(s) => s.hash(state),
        Value::Tuple(items) => {
            items.len().hash(state);
            for item in items.iter() {
                hash_into(item, state);
            }
        }
        Value::Function(f) => (std::rc::Rc::as_ptr(f) as usize).hash(state),
        Value::Method(m) => {
            (std::rc::Rc::as_ptr(m.function()) as usize).hash(state);
            hash_into(m.receiver(), state);
        }
        Value::Object(id) => Node::Proto(*id).hash(state),
        Value::Foreign(f) => Node::Foreign(f.clone()).hash(state),
    }
}

fn number_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_equality_is_identity() {
        let mut space = Space::new();
        let a = space.new_object(Args::new().kw("x", 1)).unwrap();
        let b = space.new_object(Args::new().kw("x", 1)).unwrap();
        assert!(equals(&mut space, &Value::Object(a), &Value::Object(a)).unwrap());
        assert!(!equals(&mut space, &Value::Object(a), &Value::Object(b)).unwrap());
    }

    #[test]
    fn test_int_and_integral_float_hash_alike() {
        let mut space = Space::new();
        let i = hash_value(&mut space, &Value::Int(2)).unwrap();
        let f = hash_value(&mut space, &Value::Float(2.0)).unwrap();
        assert_eq!(i, f);
    }

    #[test]
    fn test_equal_numbers_hash_alike_beyond_exact_range() {
        let mut space = Space::new();
        let big = Value::Int(9_007_199_254_740_993);
        let near = Value::Float(9_007_199_254_740_992.0);
        assert_eq!(big, near);
        assert_eq!(
            hash_value(&mut space, &big).unwrap(),
            hash_value(&mut space, &near).unwrap()
        );

        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(
            hash_value(&mut space, &Value::Float(-0.0)).unwrap(),
            hash_value(&mut space, &Value::Int(0)).unwrap()
        );
    }

    #[test]
    fn test_reflected_override() {
        let mut space = Space::new();
        let always = crate::model::function::Function::new("_eq", &["self", "other"], |_, _| {
            Ok(Value::Bool(true))
        });
        let lenient = space.new_object(Args::new().kw(EQ, always)).unwrap();
        assert!(equals(&mut space, &Value::Int(1), &Value::Object(lenient)).unwrap());
    }
}
