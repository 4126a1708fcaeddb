//! The seam that lets host (non-prototype) values take part in delegation.
//!
//! A foreign value reached as an ancestor is treated as a shallow prototype: its
//! members are fetched through the host's own member resolution, and any bound
//! method the host hands back is taken apart again so the binder can re-bind the
//! plain function to the delegation receiver.

use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::model::error::ProtoError;
use crate::model::function::Args;
use crate::model::object::Node;
use crate::model::space::Space;
use crate::model::value::Value;

pub type ForeignRef = Rc<dyn ForeignObject>;

/// What the host must supply for a value to be usable as a parent.
pub trait ForeignObject: fmt::Debug {
    /// Human-readable type name, used in errors and display.
    fn type_name(&self) -> String;

    /// Fetch a named member, honouring the host's own inheritance.
    ///
    /// `None` means "not found", which is distinct from a member holding
    /// [`Value::None`]. `me` is the handle this object is reached through, so
    /// that bound members can refer back to it.
    fn member(&self, me: &ForeignRef, name: &str) -> Option<Value>;

    /// Declared bases, in priority order. Instances have none.
    fn bases(&self) -> Vec<ForeignRef> {
        Vec::new()
    }

    fn call(&self, _me: &ForeignRef, _space: &mut Space, _args: Args) -> Result<Value, ProtoError> {
        Err(ProtoError::NotCallable(self.type_name()))
    }
}

/// Identity of a foreign value: the address of its allocation.
pub fn foreign_key(f: &ForeignRef) -> usize {
    Rc::as_ptr(f) as *const () as usize
}

pub fn same_foreign(a: &ForeignRef, b: &ForeignRef) -> bool {
    foreign_key(a) == foreign_key(b)
}

/// Look `name` up on a foreign ancestor and normalise the result to
/// (plain value, owner).
///
/// A host bound method is split into its function and the object it was bound
/// to; everything else is owned by the foreign value itself.
pub fn resolve_member(foreign: &ForeignRef, name: &str) -> Option<(Value, Node)> {
    let member = foreign.member(foreign, name)?;
    match member {
        Value::Method(bound) => {
            let owner = Node::from_value(bound.receiver())
                .unwrap_or_else(|| Node::Foreign(foreign.clone()));
            trace!(
                "unwrapped host method {} of {}",
                bound.function().name(),
                foreign.type_name()
            );
            Some((Value::Function(bound.function().clone()), owner))
        }
        other => Some((other, Node::Foreign(foreign.clone()))),
    }
}
