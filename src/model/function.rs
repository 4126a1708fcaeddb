use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::model::error::ProtoError;
use crate::model::object::Node;
use crate::model::space::Space;
use crate::model::value::Value;

lazy_static! {
    static ref RESERVED_PARAMETERS: HashMap<&'static str, ParamRole> = {
        let mut m = HashMap::new();
        m.insert("self", ParamRole::Receiver);
        m.insert("this", ParamRole::Definer);
        m.insert("super", ParamRole::Resend);
        m.insert("cls", ParamRole::Owner);
        m
    };
}

/// What a declared parameter receives when the function is invoked bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    /// `self`: the object the call was made on.
    Receiver,
    /// `this`: the object whose attribute map holds the function.
    Definer,
    /// `super`: the bound method itself, used to resend past the definer.
    Resend,
    /// `cls`: the definer, following the host classmethod convention.
    Owner,
    /// Filled from the caller's arguments.
    Positional,
}

impl ParamRole {
    pub fn for_name(name: &str) -> ParamRole {
        RESERVED_PARAMETERS
            .get(name)
            .copied()
            .unwrap_or(ParamRole::Positional)
    }

    pub fn is_injected(&self) -> bool {
        *self != ParamRole::Positional
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    role: ParamRole,
    default: Option<Value>,
}

impl Param {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ParamRole {
        self.role
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Signature of a function body.
///
/// The body receives its declared parameters in order as `args.positional`,
/// followed by any surplus positional arguments; unclaimed keywords stay in
/// `args.keywords`.
pub type NativeFn = dyn Fn(&mut Space, Args) -> Result<Value, ProtoError>;

/// A host function together with its declared parameter list.
pub struct Function {
    name: String,
    params: Vec<Param>,
    body: Rc<NativeFn>,
}

impl Function {
    /// Create a function. Parameter roles are resolved here, once.
    ///
    /// `cls` only names the definer when `self` is not declared; next to
    /// `self` it is an ordinary parameter.
    pub fn new<F>(name: impl Into<String>, params: &[&str], body: F) -> Self
    where
        F: Fn(&mut Space, Args) -> Result<Value, ProtoError> + 'static,
    {
        let has_receiver = params.contains(&"self");
        Function {
            name: name.into(),
            params: params
                .iter()
                .map(|p| Param {
                    name: p.to_string(),
                    role: match ParamRole::for_name(p) {
                        ParamRole::Owner if has_receiver => ParamRole::Positional,
                        role => role,
                    },
                    default: None,
                })
                .collect(),
            body: Rc::new(body),
        }
    }

    /// Give an ordinary parameter a default value.
    pub fn with_default(mut self, param: &str, value: impl Into<Value>) -> Self {
        if let Some(p) = self.params.iter_mut().find(|p| p.name == param) {
            p.default = Some(value.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Roles of the injected parameters, in declaration order.
    pub fn injections(&self) -> Vec<ParamRole> {
        self.params
            .iter()
            .map(|p| p.role)
            .filter(|r| r.is_injected())
            .collect()
    }

    pub(crate) fn body(&self) -> Rc<NativeFn> {
        self.body.clone()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        write!(f, "Function({}({}))", self.name, names.join(", "))
    }
}

/// Arguments of a call: positional values plus keywords in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Args::default()
    }

    pub fn from_values(positional: Vec<Value>) -> Self {
        Args {
            positional,
            keywords: IndexMap::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kw(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value, ProtoError> {
        self.positional
            .get(index)
            .ok_or_else(|| ProtoError::MissingArgument {
                function: String::new(),
                parameter: format!("#{}", index),
            })
    }

    pub fn int(&self, index: usize) -> Result<i64, ProtoError> {
        self.get(index)?.as_int()
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Everything from `index` on, as a tuple.
    pub fn rest(&self, index: usize) -> Value {
        Value::tuple(self.positional.iter().skip(index).cloned().collect())
    }
}

/// A function packaged with the receiver it was fetched through and the object
/// that defines it.
///
/// Bound methods are transient. Passed as a `super` argument, the same value
/// acts as the resend handle: attribute access on it continues the search past
/// the definer while keeping the receiver.
pub struct BoundMethod {
    function: Rc<Function>,
    receiver: Value,
    definer: Node,
}

impl BoundMethod {
    pub fn new(function: Rc<Function>, receiver: Value, definer: Node) -> Self {
        BoundMethod {
            function,
            receiver,
            definer,
        }
    }

    pub fn function(&self) -> &Rc<Function> {
        &self.function
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn definer(&self) -> &Node {
        &self.definer
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundMethod({} of {} defined by {:?})",
            self.function.name, self.receiver, self.definer
        )
    }
}
