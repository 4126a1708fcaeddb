use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::model::error::ProtoError;
use crate::model::foreign::{same_foreign, ForeignRef};
use crate::model::function::{BoundMethod, Function};
use crate::model::object::ObjectId;

pub const TYPE_STR_NONE: &str = "none";
pub const TYPE_STR_BOOL: &str = "bool";
pub const TYPE_STR_INT: &str = "int";
pub const TYPE_STR_FLOAT: &str = "float";
pub const TYPE_STR_STR: &str = "str";
pub const TYPE_STR_TUPLE: &str = "tuple";
pub const TYPE_STR_FUNCTION: &str = "function";
pub const TYPE_STR_METHOD: &str = "method";
pub const TYPE_STR_OBJECT: &str = "prototype";
pub const TYPE_STR_FOREIGN: &str = "foreign";

/// A host value. Data is compared structurally, everything with identity by identity.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Tuple(Rc<Vec<Value>>),
    Function(Rc<Function>),
    Method(Rc<BoundMethod>),
    Object(ObjectId),
    Foreign(ForeignRef),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => TYPE_STR_NONE,
            Value::Bool(_) => TYPE_STR_BOOL,
            Value::Int(_) => TYPE_STR_INT,
            Value::Float(_) => TYPE_STR_FLOAT,
            Value::Str(_) => TYPE_STR_STR,
            Value::Tuple(_) => TYPE_STR_TUPLE,
            Value::Function(_) => TYPE_STR_FUNCTION,
            Value::Method(_) => TYPE_STR_METHOD,
            Value::Object(_) => TYPE_STR_OBJECT,
            Value::Foreign(_) => TYPE_STR_FOREIGN,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::Method(_) | Value::Object(_) | Value::Foreign(_) => true,
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            _ => true,
        }
    }

    pub fn as_int(&self) -> Result<i64, ProtoError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i64),
            other => Err(mismatch(TYPE_STR_INT, other)),
        }
    }

    pub fn as_float(&self) -> Result<f64, ProtoError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch(TYPE_STR_FLOAT, other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ProtoError> {
        match self {
            Value::Str(s) => Ok(&**s),
            other => Err(mismatch(TYPE_STR_STR, other)),
        }
    }

    pub fn as_tuple(&self) -> Result<&[Value], ProtoError> {
        match self {
            Value::Tuple(items) => Ok(items.as_slice()),
            other => Err(mismatch(TYPE_STR_TUPLE, other)),
        }
    }

    pub fn as_object(&self) -> Result<ObjectId, ProtoError> {
        match self {
            Value::Object(id) => Ok(*id),
            other => Err(mismatch(TYPE_STR_OBJECT, other)),
        }
    }

    pub fn as_method(&self) -> Result<&Rc<BoundMethod>, ProtoError> {
        match self {
            Value::Method(m) => Ok(m),
            other => Err(mismatch(TYPE_STR_METHOD, other)),
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> ProtoError {
    ProtoError::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "{}", TYPE_STR_NONE),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Method(m) => write!(
                f,
                "<method {} of {}>",
                m.function().name(),
                m.receiver()
            ),
            Value::Object(id) => write!(f, "<prototype {}>", id),
            Value::Foreign(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "Value::None"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Int(i) => write!(f, "Value::Int({})", i),
            Value::Float(n) => write!(f, "Value::Float({:?})", n),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Tuple(items) => write!(f, "Value::Tuple({:?})", items),
            Value::Function(func) => write!(f, "Value::Function({})", func.name()),
            Value::Method(m) => write!(f, "Value::Method({})", m.function().name()),
            Value::Object(id) => write!(f, "Value::Object({})", id),
            Value::Foreign(o) => write!(f, "Value::Foreign({})", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => {
                Rc::ptr_eq(a.function(), b.function())
                    && a.receiver() == b.receiver()
                    && a.definer() == b.definer()
            }
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Foreign(a), Value::Foreign(b)) => same_foreign(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(Rc::new(f))
    }
}

impl From<Rc<Function>> for Value {
    fn from(f: Rc<Function>) -> Self {
        Value::Function(f)
    }
}

impl From<ForeignRef> for Value {
    fn from(o: ForeignRef) -> Self {
        Value::Foreign(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_data() {
        assert_eq!(Value::None.to_string(), "none");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::str("hi").to_string(), "\"hi\"");
        assert_eq!(
            Value::tuple(vec![Value::Int(1), Value::Bool(true)]).to_string(),
            "(1, true)"
        );
        assert_eq!(Value::tuple(vec![Value::Int(7)]).to_string(), "(7,)");
    }

    #[test]
    fn test_numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Int(3), Value::Float(3.0));
        assert_ne!(Value::Int(3), Value::str("3"));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = Rc::new(Function::new("f", &[], |_, _| Ok(Value::None)));
        let g = Rc::new(Function::new("f", &[], |_, _| Ok(Value::None)));
        assert_eq!(Value::Function(f.clone()), Value::Function(f.clone()));
        assert_ne!(Value::Function(f), Value::Function(g));
    }

    #[test]
    fn test_conversions_report_mismatch() {
        let err = Value::str("x").as_int().unwrap_err();
        assert_eq!(
            err,
            ProtoError::TypeMismatch {
                expected: "int".to_string(),
                found: "str".to_string(),
            }
        );
        assert_eq!(Value::Int(2).as_float().unwrap(), 2.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::str("x").is_truthy());
        assert!(!Value::tuple(vec![]).is_truthy());
    }
}
