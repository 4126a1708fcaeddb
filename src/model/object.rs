use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::model::foreign::{foreign_key, ForeignRef};
use crate::model::value::Value;

/// Stable index of a prototype inside its [`Space`](crate::model::space::Space).
///
/// Two handles name the same object exactly when their indices match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of a delegation chain: a prototype or a foreign value.
#[derive(Clone)]
pub enum Node {
    Proto(ObjectId),
    Foreign(ForeignRef),
}

/// Identity of a [`Node`], usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Proto(usize),
    Foreign(usize),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Proto(id) => NodeKey::Proto(id.0),
            Node::Foreign(f) => NodeKey::Foreign(foreign_key(f)),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Node::Proto(id) => Value::Object(*id),
            Node::Foreign(f) => Value::Foreign(f.clone()),
        }
    }

    /// The node a value stands for, if it can take part in a chain at all.
    pub fn from_value(value: &Value) -> Option<Node> {
        match value {
            Value::Object(id) => Some(Node::Proto(*id)),
            Value::Foreign(f) => Some(Node::Foreign(f.clone())),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Proto(id) => write!(f, "Node::Proto({})", id),
            Node::Foreign(o) => write!(f, "Node::Foreign({})", o.type_name()),
        }
    }
}

/// Storage of a single prototype.
///
/// The parent list is fixed at construction. The attribute map stays mutable and
/// keeps insertion order, and every child delegating here observes its changes.
#[derive(Debug)]
pub struct PrototypeData {
    parents: Vec<Node>,
    attributes: IndexMap<String, Value>,
}

impl PrototypeData {
    pub fn new(parents: Vec<Node>, attributes: IndexMap<String, Value>) -> Self {
        PrototypeData {
            parents,
            attributes,
        }
    }

    pub fn parents(&self) -> &[Node] {
        &self.parents
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn get_own(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_own(&mut self, name: String, value: Value) {
        self.attributes.insert(name, value);
    }

    /// Removes an own attribute, keeping the order of the others.
    pub fn delete_own(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(name)
    }

    /// Own attribute names that do not start with `private_prefix`, in insertion order.
    pub fn public_names<'a>(&'a self, private_prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .keys()
            .map(|k| k.as_str())
            .filter(move |k| private_prefix.is_empty() || !k.starts_with(private_prefix))
    }
}
