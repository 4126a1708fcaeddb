//! A small class-based host object model.
//!
//! Classes hold members of four kinds and inherit through their own C3 order.
//! Both classes and their instances implement [`ForeignObject`], so they can
//! be used as parents of prototypes.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::model::error::ProtoError;
use crate::model::foreign::{ForeignObject, ForeignRef};
use crate::model::function::{Args, BoundMethod, Function};
use crate::model::object::Node;
use crate::model::operations::linearize::merge;
use crate::model::space::Space;
use crate::model::value::Value;

#[derive(Clone)]
pub enum Member {
    Data(Value),
    /// Plain on the class, bound to the instance on an instance.
    Method(Rc<Function>),
    /// Always bound to the class it was reached through.
    ClassMethod(Rc<Function>),
    /// Never bound.
    Static(Rc<Function>),
}

impl Member {
    pub fn method(function: Function) -> Self {
        Member::Method(Rc::new(function))
    }

    pub fn class_method(function: Function) -> Self {
        Member::ClassMethod(Rc::new(function))
    }

    pub fn static_method(function: Function) -> Self {
        Member::Static(Rc::new(function))
    }
}

pub struct HostClass {
    name: String,
    me: Weak<HostClass>,
    bases: Vec<Rc<HostClass>>,
    /// Linearization without the class itself.
    ancestors: Vec<Rc<HostClass>>,
    members: IndexMap<String, Member>,
}

impl HostClass {
    pub fn new(
        name: &str,
        bases: Vec<Rc<HostClass>>,
        members: Vec<(&str, Member)>,
    ) -> Result<Rc<HostClass>, ProtoError> {
        let mut sequences: Vec<Vec<Rc<HostClass>>> = bases
            .iter()
            .map(|base| {
                let mut seq = vec![base.clone()];
                seq.extend(base.ancestors.iter().cloned());
                seq
            })
            .collect();
        sequences.push(bases.clone());
        let ancestors = merge(sequences, |a, b| Rc::ptr_eq(a, b)).map_err(|blocked| {
            let heads: Vec<&str> = blocked.iter().map(|c| c.name.as_str()).collect();
            ProtoError::InconsistentPrecedence {
                object: name.to_string(),
                detail: format!("cannot order {}", heads.join(", ")),
            }
        })?;

        let members: IndexMap<String, Member> = members
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Ok(Rc::new_cyclic(|me| HostClass {
            name: name.to_string(),
            me: me.clone(),
            bases,
            ancestors,
            members,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First definition of `name` in this class or its ancestors.
    pub fn find(&self, name: &str) -> Option<&Member> {
        self.members
            .get(name)
            .or_else(|| self.ancestors.iter().find_map(|c| c.members.get(name)))
    }

    pub fn instantiate(self: &Rc<Self>, fields: IndexMap<String, Value>) -> Rc<HostInstance> {
        Rc::new(HostInstance {
            class: self.clone(),
            fields: RefCell::new(fields),
        })
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostClass({})", self.name)
    }
}

impl ForeignObject for HostClass {
    fn type_name(&self) -> String {
        self.name.clone()
    }

    fn member(&self, me: &ForeignRef, name: &str) -> Option<Value> {
        Some(match self.find(name)? {
            Member::Data(v) => v.clone(),
            Member::Method(f) | Member::Static(f) => Value::Function(f.clone()),
            Member::ClassMethod(f) => bound_to(f, Value::Foreign(me.clone()), me),
        })
    }

    fn bases(&self) -> Vec<ForeignRef> {
        self.bases
            .iter()
            .map(|b| b.clone() as ForeignRef)
            .collect()
    }

    /// Instantiate; keywords become the instance's fields.
    fn call(&self, _me: &ForeignRef, _space: &mut Space, args: Args) -> Result<Value, ProtoError> {
        if let Some(extra) = args.positional.first() {
            return Err(ProtoError::InvalidConstructorArgument(extra.to_string()));
        }
        let class = self
            .me
            .upgrade()
            .ok_or_else(|| ProtoError::NotCallable(self.name.clone()))?;
        Ok(Value::Foreign(class.instantiate(args.keywords)))
    }
}

pub struct HostInstance {
    class: Rc<HostClass>,
    fields: RefCell<IndexMap<String, Value>>,
}

impl HostInstance {
    pub fn class(&self) -> &Rc<HostClass> {
        &self.class
    }

    pub fn set_field(&self, name: &str, value: impl Into<Value>) {
        self.fields.borrow_mut().insert(name.to_string(), value.into());
    }
}

impl fmt::Debug for HostInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostInstance({})", self.class.name)
    }
}

impl ForeignObject for HostInstance {
    fn type_name(&self) -> String {
        format!("{} instance", self.class.name)
    }

    fn member(&self, me: &ForeignRef, name: &str) -> Option<Value> {
        if let Some(v) = self.fields.borrow().get(name) {
            return Some(v.clone());
        }
        let class: ForeignRef = self.class.clone();
        Some(match self.class.find(name)? {
            Member::Data(v) => v.clone(),
            Member::Method(f) => bound_to(f, Value::Foreign(me.clone()), &class),
            Member::ClassMethod(f) => bound_to(f, Value::Foreign(class.clone()), &class),
            Member::Static(f) => Value::Function(f.clone()),
        })
    }
}

fn bound_to(function: &Rc<Function>, receiver: Value, class: &ForeignRef) -> Value {
    Value::Method(Rc::new(BoundMethod::new(
        function.clone(),
        receiver,
        Node::Foreign(class.clone()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(name: &str, params: &[&str]) -> Function {
        Function::new(name, params, |_, args| Ok(Value::tuple(args.positional)))
    }

    fn class_a() -> Rc<HostClass> {
        HostClass::new(
            "A",
            vec![],
            vec![
                (
                    "normal",
                    Member::method(echo("normal", &["self"]).with_default("self", Value::None)),
                ),
                ("classs", Member::class_method(echo("classs", &["cls"]))),
                ("static", Member::static_method(echo("static", &[]))),
                ("kind", Member::Data(Value::str("a"))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_class_access() {
        let a = class_a();
        let me: ForeignRef = a.clone();
        let mut space = Space::new();

        let normal = a.member(&me, "normal").unwrap();
        assert_eq!(normal.type_name(), "function");
        assert_eq!(
            space.call(&normal, Args::new()).unwrap(),
            Value::tuple(vec![Value::None])
        );

        let classs = a.member(&me, "classs").unwrap();
        assert_eq!(
            space.call(&classs, Args::new()).unwrap(),
            Value::tuple(vec![Value::Foreign(me.clone())])
        );

        let stat = a.member(&me, "static").unwrap();
        assert_eq!(space.call(&stat, Args::new()).unwrap(), Value::tuple(vec![]));
        assert!(a.member(&me, "missing").is_none());
    }

    #[test]
    fn test_instance_access() {
        let a = class_a();
        let class: ForeignRef = a.clone();
        let inst: ForeignRef = a.instantiate(IndexMap::new());
        let mut space = Space::new();

        let normal = inst.member(&inst, "normal").unwrap();
        assert_eq!(
            space.call(&normal, Args::new()).unwrap(),
            Value::tuple(vec![Value::Foreign(inst.clone())])
        );
        let classs = inst.member(&inst, "classs").unwrap();
        assert_eq!(
            space.call(&classs, Args::new()).unwrap(),
            Value::tuple(vec![Value::Foreign(class)])
        );
        assert_eq!(inst.member(&inst, "kind"), Some(Value::str("a")));
    }

    #[test]
    fn test_class_method_binds_to_subclass() {
        let a = class_a();
        let b = HostClass::new(
            "B",
            vec![a],
            vec![("classs_b", Member::class_method(echo("classs_b", &["cls"])))],
        )
        .unwrap();
        let b_ref: ForeignRef = b.clone();
        let inst: ForeignRef = b.instantiate(IndexMap::new());
        let mut space = Space::new();

        for name in &["classs", "classs_b"] {
            let m = inst.member(&inst, name).unwrap();
            assert_eq!(
                space.call(&m, Args::new()).unwrap(),
                Value::tuple(vec![Value::Foreign(b_ref.clone())])
            );
        }
    }

    #[test]
    fn test_fields_shadow_class_members() {
        let a = class_a();
        let inst = a.instantiate(IndexMap::new());
        inst.set_field("kind", 7);
        let me: ForeignRef = inst.clone();
        assert_eq!(inst.member(&me, "kind"), Some(Value::Int(7)));
    }

    #[test]
    fn test_calling_class_instantiates() {
        let a = class_a();
        let me: ForeignRef = a.clone();
        let mut space = Space::new();
        let inst = space
            .call(&Value::Foreign(me), Args::new().kw("kind", "z"))
            .unwrap();
        assert_eq!(space.get_attr(&inst, "kind").unwrap(), Value::str("z"));
    }

    #[test]
    fn test_inconsistent_bases() {
        let x = HostClass::new("X", vec![], vec![]).unwrap();
        let y = HostClass::new("Y", vec![x.clone()], vec![]).unwrap();
        let err = HostClass::new("Z", vec![x, y], vec![]).unwrap_err();
        match err {
            ProtoError::InconsistentPrecedence { object, .. } => assert_eq!(object, "Z"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
