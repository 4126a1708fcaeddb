//! The arena owning every prototype.
//!
//! A [`Space`] hands out [`ObjectId`]s and is the entry point for every
//! public operation: construction, attribute access, calls, comparison and
//! display. Function bodies get `&mut Space` so they can re-enter the model.

use log::debug;

use crate::model::config::{Resolution, SpaceConfig};
use crate::model::error::ProtoError;
use crate::model::function::{Args, Function};
use crate::model::object::{Node, ObjectId, PrototypeData};
use crate::model::operations::bind::{bind_found, invoke, invoke_unbound, resend};
use crate::model::operations::comparison;
use crate::model::operations::linearize::linearize;
use crate::model::operations::lookup::{lookup, Found};
use crate::model::value::Value;

/// Attribute consulted when a prototype is called.
pub const CALL: &str = "_call";
/// Equality override.
pub const EQ: &str = "_eq";
/// Hash override.
pub const HASH: &str = "_hash";
/// Display name.
pub const NAME: &str = "_name";

#[derive(Debug)]
pub struct Space {
    objects: Vec<PrototypeData>,
    config: SpaceConfig,
}

impl Space {
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    pub fn with_config(config: SpaceConfig) -> Self {
        Space {
            objects: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every prototype in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.objects.len()).map(ObjectId)
    }

    pub fn data(&self, id: ObjectId) -> Result<&PrototypeData, ProtoError> {
        self.objects
            .get(id.0)
            .ok_or(ProtoError::UnknownObject(id.0))
    }

    fn data_mut(&mut self, id: ObjectId) -> Result<&mut PrototypeData, ProtoError> {
        self.objects
            .get_mut(id.0)
            .ok_or(ProtoError::UnknownObject(id.0))
    }

    pub fn parents_of(&self, node: &Node) -> Result<Vec<Node>, ProtoError> {
        match node {
            Node::Proto(id) => Ok(self.data(*id)?.parents().to_vec()),
            Node::Foreign(f) => Ok(f.bases().into_iter().map(Node::Foreign).collect()),
        }
    }

    /// Short name for messages: the own `_name` string if there is one.
    pub fn describe(&self, node: &Node) -> String {
        match node {
            Node::Proto(id) => match self.data(*id).ok().and_then(|d| d.get_own(NAME)) {
                Some(Value::Str(s)) => s.to_string(),
                _ => id.to_string(),
            },
            Node::Foreign(f) => f.type_name(),
        }
    }

    /// Start building a prototype step by step.
    pub fn object(&mut self) -> ObjectBuilder<'_> {
        ObjectBuilder {
            space: self,
            args: Args::new(),
        }
    }

    /// Create a prototype.
    ///
    /// Positional prototypes and foreign values become parents, in order.
    /// Positional functions are installed under their own name, after the
    /// keywords. Under C3 resolution the new object is linearized right away,
    /// so a contradictory parent list is refused here.
    pub fn new_object(&mut self, args: Args) -> Result<ObjectId, ProtoError> {
        if let Some(limit) = self.config.max_objects {
            if self.objects.len() >= limit {
                debug!("refusing new prototype: limit of {} reached", limit);
                return Err(ProtoError::SpaceExhausted(limit));
            }
        }

        let Args {
            positional,
            keywords,
        } = args;
        let mut parents = Vec::new();
        let mut attributes = keywords;
        for value in positional {
            match value {
                Value::Object(id) => {
                    self.data(id)?;
                    parents.push(Node::Proto(id));
                }
                Value::Foreign(f) => parents.push(Node::Foreign(f)),
                Value::Function(f) => {
                    attributes.insert(f.name().to_string(), Value::Function(f));
                }
                other => {
                    debug!("invalid constructor argument {:?}", other);
                    return Err(ProtoError::InvalidConstructorArgument(other.to_string()));
                }
            }
        }

        let id = ObjectId(self.objects.len());
        self.objects.push(PrototypeData::new(parents, attributes));

        if self.config.resolution == Resolution::C3 {
            if let Err(e) = linearize(self, &Node::Proto(id)) {
                self.objects.pop();
                return Err(e);
            }
        }

        debug!(
            "created {} with {} parents",
            self.describe(&Node::Proto(id)),
            self.objects[id.0].parents().len()
        );
        Ok(id)
    }

    /// A new prototype delegating to `id` first, then to any parents in `args`.
    pub fn derive(&mut self, id: ObjectId, mut args: Args) -> Result<ObjectId, ProtoError> {
        args.positional.insert(0, Value::Object(id));
        self.new_object(args)
    }

    /// Resolve `name` on `id` and bind a function to it.
    pub fn get(&self, id: ObjectId, name: &str) -> Result<Value, ProtoError> {
        let found = lookup(self, &Node::Proto(id), name, None)?;
        Ok(bind_found(&Value::Object(id), found))
    }

    /// Attribute access on any value.
    ///
    /// A bound method is treated as a resend handle. Foreign values answer
    /// through their own member resolution.
    pub fn get_attr(&self, target: &Value, name: &str) -> Result<Value, ProtoError> {
        match target {
            Value::Object(id) => self.get(*id, name),
            Value::Method(handle) => resend(self, handle, name),
            Value::Foreign(f) => f
                .member(f, name)
                .ok_or_else(|| ProtoError::MissingAttribute(name.to_string())),
            _ => Err(ProtoError::MissingAttribute(name.to_string())),
        }
    }

    /// Write to the own map of `id`. Parents are never touched.
    pub fn set(
        &mut self,
        id: ObjectId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ProtoError> {
        self.data_mut(id)?.set_own(name.into(), value.into());
        Ok(())
    }

    pub fn delete(&mut self, id: ObjectId, name: &str) -> Result<Value, ProtoError> {
        self.data_mut(id)?
            .delete_own(name)
            .ok_or_else(|| ProtoError::MissingAttribute(name.to_string()))
    }

    pub fn call(&mut self, callee: &Value, args: Args) -> Result<Value, ProtoError> {
        match callee {
            Value::Method(method) => invoke(self, method, args),
            Value::Function(function) => invoke_unbound(self, function, args),
            Value::Object(id) => {
                let target = match lookup(self, &Node::Proto(*id), CALL, None) {
                    Ok(found) => Some(bind_found(callee, found)),
                    Err(e) if e.is_missing(CALL) => None,
                    Err(e) => return Err(e),
                };
                match target {
                    Some(target) if target.is_callable() => self.call(&target, args),
                    _ => Ok(Value::Object(self.derive(*id, args)?)),
                }
            }
            Value::Foreign(f) => {
                let f = f.clone();
                f.call(&f, self, args)
            }
            other => Err(ProtoError::NotCallable(other.to_string())),
        }
    }

    /// Call the attribute `name` of `id`.
    pub fn call_method(&mut self, id: ObjectId, name: &str, args: Args) -> Result<Value, ProtoError> {
        let method = self.get(id, name)?;
        self.call(&method, args)
    }

    pub fn lookup(&self, id: ObjectId, name: &str) -> Result<Found, ProtoError> {
        lookup(self, &Node::Proto(id), name, None)
    }

    pub fn linearize(&self, id: ObjectId) -> Result<Vec<Node>, ProtoError> {
        linearize(self, &Node::Proto(id))
    }

    pub fn equals(&mut self, lhs: &Value, rhs: &Value) -> Result<bool, ProtoError> {
        comparison::equals(self, lhs, rhs)
    }

    pub fn hash_value(&mut self, value: &Value) -> Result<u64, ProtoError> {
        comparison::hash_value(self, value)
    }

    /// Own attributes only.
    pub fn contains(&self, id: ObjectId, name: &str) -> Result<bool, ProtoError> {
        Ok(self.data(id)?.has_own(name))
    }

    /// Own attributes only; unlike [`Space::get`] nothing is inherited or bound.
    pub fn item(&self, id: ObjectId, name: &str) -> Result<Value, ProtoError> {
        self.data(id)?
            .get_own(name)
            .cloned()
            .ok_or_else(|| ProtoError::MissingAttribute(name.to_string()))
    }

    pub fn get_own(&self, id: ObjectId, name: &str) -> Option<Value> {
        self.data(id).ok()?.get_own(name).cloned()
    }

    /// Own public attribute names in insertion order.
    pub fn public_names(&self, id: ObjectId) -> Result<impl Iterator<Item = &str>, ProtoError> {
        Ok(self.data(id)?.public_names(&self.config.private_prefix))
    }

    /// `name[a = 1, f = <function f>]`. Unnamed objects render as `[a = 1]`.
    pub fn repr(&self, id: ObjectId) -> Result<String, ProtoError> {
        let data = self.data(id)?;
        let fields: Vec<String> = data
            .public_names(&self.config.private_prefix)
            .filter_map(|k| data.get_own(k).map(|v| format!("{} = {}", k, self.show(v))))
            .collect();
        let name = match data.get_own(NAME) {
            Some(Value::Str(s)) => s.to_string(),
            _ => String::new(),
        };
        Ok(format!("{}[{}]", name, fields.join(", ")))
    }

    fn show(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => self.describe(&Node::Proto(*id)),
            other => other.to_string(),
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by [`Space::object`].
pub struct ObjectBuilder<'s> {
    space: &'s mut Space,
    args: Args,
}

impl<'s> ObjectBuilder<'s> {
    pub fn parent(mut self, parent: impl Into<Value>) -> Self {
        self.args.positional.push(parent.into());
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.attr(NAME, name)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.keywords.insert(name.into(), value.into());
        self
    }

    pub fn method(mut self, function: Function) -> Self {
        self.args.positional.push(Value::from(function));
        self
    }

    pub fn build(self) -> Result<ObjectId, ProtoError> {
        self.space.new_object(self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_shadows_inherited() {
        let mut space = Space::new();
        let a = space.object().attr("x", 1).attr("y", 2).build().unwrap();
        let b = space.object().parent(a).attr("x", 10).build().unwrap();
        assert_eq!(space.get(b, "x").unwrap(), Value::Int(10));
        assert_eq!(space.get(b, "y").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_invalid_constructor_argument_names_value() {
        let mut space = Space::new();
        let err = space.new_object(Args::new().arg(42)).unwrap_err();
        assert_eq!(err, ProtoError::InvalidConstructorArgument("42".to_string()));
        assert!(space.is_empty());
    }

    #[test]
    fn test_positional_function_installed_by_name() {
        let mut space = Space::new();
        let f = Function::new("greet", &[], |_, _| Ok(Value::str("hi")));
        let a = space.object().attr("greet", 0).method(f).build().unwrap();
        let greet = space.item(a, "greet").unwrap();
        assert_eq!(greet.type_name(), "function");
    }

    #[test]
    fn test_limit() {
        let mut space = Space::with_config(SpaceConfig::new().with_limit(1));
        space.new_object(Args::new()).unwrap();
        assert_eq!(
            space.new_object(Args::new()).unwrap_err(),
            ProtoError::SpaceExhausted(1)
        );
    }

    #[test]
    fn test_inconsistent_parents_leave_no_object() {
        let mut space = Space::new();
        let a = space.new_object(Args::new()).unwrap();
        let b = space.new_object(Args::new().arg(a)).unwrap();
        let err = space.new_object(Args::new().arg(a).arg(b)).unwrap_err();
        match err {
            ProtoError::InconsistentPrecedence { .. } => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_item_and_contains_ignore_parents() {
        let mut space = Space::new();
        let a = space.object().attr("x", 1).build().unwrap();
        let b = space.object().parent(a).build().unwrap();
        assert!(!space.contains(b, "x").unwrap());
        assert!(space.item(b, "x").unwrap_err().is_missing("x"));
        assert_eq!(space.get_own(a, "x"), Some(Value::Int(1)));
        assert_eq!(space.get_own(b, "x"), None);
    }

    #[test]
    fn test_delete() {
        let mut space = Space::new();
        let a = space.object().attr("x", 1).build().unwrap();
        assert_eq!(space.delete(a, "x").unwrap(), Value::Int(1));
        assert!(space.delete(a, "x").is_err());
    }

    #[test]
    fn test_repr() {
        let mut space = Space::new();
        let f = Function::new("f", &[], |_, _| Ok(Value::None));
        let a = space
            .object()
            .name("thing")
            .attr("a", 1)
            .method(f)
            .build()
            .unwrap();
        assert_eq!(space.repr(a).unwrap(), "thing[a = 1, f = <function f>]");
        let names: Vec<&str> = space.public_names(a).unwrap().collect();
        assert_eq!(names, vec!["a", "f"]);
    }

    #[test]
    fn test_repr_without_name() {
        let mut space = Space::new();
        let empty = space.new_object(Args::new()).unwrap();
        let a = space.object().attr("a", 1).build().unwrap();
        assert_eq!(space.repr(empty).unwrap(), "[]");
        assert_eq!(space.repr(a).unwrap(), "[a = 1]");
        // errors still say which object
        assert_eq!(space.describe(&Node::Proto(a)), "#1");
    }

    #[test]
    fn test_unknown_object() {
        let space = Space::new();
        assert_eq!(
            space.get(ObjectId(3), "x").unwrap_err(),
            ProtoError::UnknownObject(3)
        );
    }

    #[test]
    fn test_calling_data_is_not_callable() {
        let mut space = Space::new();
        assert_eq!(
            space.call(&Value::Int(1), Args::new()).unwrap_err(),
            ProtoError::NotCallable("1".to_string())
        );
    }
}
