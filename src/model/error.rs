use std::fmt;

/// Everything that can go wrong while building, resolving or calling prototypes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoError {
    /// The name was not found anywhere in the delegation chain.
    MissingAttribute(String),
    /// No linearization satisfies the declared parent orders.
    InconsistentPrecedence { object: String, detail: String },
    /// A node turned out to be its own ancestor.
    CyclicDelegation(String),
    /// A positional construction argument was neither a parent nor a function.
    InvalidConstructorArgument(String),
    /// Two unrelated owners disagree about a name.
    AmbiguousAttribute { name: String, owners: Vec<String> },
    NotCallable(String),
    MissingArgument { function: String, parameter: String },
    TypeMismatch { expected: String, found: String },
    UnknownObject(usize),
    SpaceExhausted(usize),
    /// Sheet parse or build failure.
    Sheet(String),
}

impl ProtoError {
    /// True when this is the "not found" signal for exactly `name`.
    pub fn is_missing(&self, name: &str) -> bool {
        match self {
            ProtoError::MissingAttribute(n) => n == name,
            _ => false,
        }
    }
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtoError::MissingAttribute(name) => write!(f, "missing attribute: {}", name),
            ProtoError::InconsistentPrecedence { object, detail } => write!(
                f,
                "cannot linearize {}: inconsistent precedence ({})",
                object, detail
            ),
            ProtoError::CyclicDelegation(node) => {
                write!(f, "cyclic delegation: {} is its own ancestor", node)
            }
            ProtoError::InvalidConstructorArgument(value) => {
                write!(f, "not a valid argument: {}", value)
            }
            ProtoError::AmbiguousAttribute { name, owners } => write!(
                f,
                "ambiguous attribute {}: defined by {}",
                name,
                owners.join(" and ")
            ),
            ProtoError::NotCallable(value) => write!(f, "not callable: {}", value),
            ProtoError::MissingArgument {
                function,
                parameter,
            } => write!(f, "{}() missing argument: {}", function, parameter),
            ProtoError::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ProtoError::UnknownObject(index) => write!(f, "unknown object #{}", index),
            ProtoError::SpaceExhausted(limit) => {
                write!(f, "space exhausted: limit of {} objects reached", limit)
            }
            ProtoError::Sheet(msg) => write!(f, "sheet error: {}", msg),
        }
    }
}

impl std::error::Error for ProtoError {}
