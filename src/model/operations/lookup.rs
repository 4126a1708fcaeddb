//! Attribute resolution along the search order.

use std::collections::HashSet;

use log::trace;

use crate::model::config::{AmbiguityPolicy, Resolution};
use crate::model::error::ProtoError;
use crate::model::foreign::resolve_member;
use crate::model::object::Node;
use crate::model::operations::linearize::{depth_first, linearize};
use crate::model::space::Space;
use crate::model::value::Value;

/// A resolved attribute together with the ancestor that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    pub value: Value,
    pub definer: Node,
}

/// Ancestors of `start` in the order the configured strategy searches them.
pub fn search_order(space: &Space, start: &Node) -> Result<Vec<Node>, ProtoError> {
    match space.config().resolution {
        Resolution::C3 => linearize(space, start),
        Resolution::DepthFirst => depth_first(space, start),
    }
}

/// Find the first owner of `name` in the search order of `start`.
///
/// `skip`, when given, is never examined itself; resend uses it to continue
/// past the current definer.
pub fn lookup(
    space: &Space,
    start: &Node,
    name: &str,
    skip: Option<&Node>,
) -> Result<Found, ProtoError> {
    let order = search_order(space, start)?;
    let mut candidates = order
        .iter()
        .filter(|node| skip.map_or(true, |s| *node != s));

    let mut first = None;
    for node in &mut candidates {
        trace!("lookup {} in {}", name, space.describe(node));
        if let Some(found) = probe(space, node, name)? {
            first = Some(found);
            break;
        }
    }
    let first = first.ok_or_else(|| ProtoError::MissingAttribute(name.to_string()))?;

    if space.config().ambiguity == AmbiguityPolicy::Reject {
        let rest: Vec<&Node> = candidates.collect();
        check_ambiguity(space, name, &first, &rest)?;
    }
    Ok(first)
}

/// Look only at what `node` itself provides.
///
/// A prototype is never asked to run its own lookup: the caller's order decides.
pub fn probe(space: &Space, node: &Node, name: &str) -> Result<Option<Found>, ProtoError> {
    match node {
        Node::Proto(id) => Ok(space.data(*id)?.get_own(name).map(|value| Found {
            value: value.clone(),
            definer: node.clone(),
        })),
        Node::Foreign(f) => Ok(resolve_member(f, name).map(|(value, definer)| Found { value, definer })),
    }
}

/// A later owner is a rival when it is not an ancestor of the first owner and
/// holds a different value.
fn check_ambiguity(
    space: &Space,
    name: &str,
    first: &Found,
    rest: &[&Node],
) -> Result<(), ProtoError> {
    let inherited: HashSet<_> = search_order(space, &first.definer)?
        .iter()
        .map(|n| n.key())
        .collect();
    for node in rest {
        if inherited.contains(&node.key()) {
            continue;
        }
        if let Some(rival) = probe(space, node, name)? {
            if rival.value != first.value && !inherited.contains(&rival.definer.key()) {
                return Err(ProtoError::AmbiguousAttribute {
                    name: name.to_string(),
                    owners: vec![space.describe(&first.definer), space.describe(&rival.definer)],
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::SpaceConfig;
    use crate::model::function::Args;

    #[test]
    fn test_own_attribute_found_first() {
        let mut space = Space::new();
        let a = space.new_object(Args::new().kw("x", 1)).unwrap();
        let b = space.new_object(Args::new().arg(a).kw("x", 2)).unwrap();
        let found = lookup(&space, &Node::Proto(b), "x", None).unwrap();
        assert_eq!(found.value, Value::Int(2));
        assert_eq!(found.definer, Node::Proto(b));
    }

    #[test]
    fn test_skip_continues_past_definer() {
        let mut space = Space::new();
        let a = space.new_object(Args::new().kw("x", 1)).unwrap();
        let b = space.new_object(Args::new().arg(a).kw("x", 2)).unwrap();
        let start = Node::Proto(b);
        let found = lookup(&space, &start, "x", Some(&start)).unwrap();
        assert_eq!(found.value, Value::Int(1));
        assert_eq!(found.definer, Node::Proto(a));
    }

    #[test]
    fn test_missing_reports_name() {
        let mut space = Space::new();
        let a = space.new_object(Args::new()).unwrap();
        let err = lookup(&space, &Node::Proto(a), "nope", None).unwrap_err();
        assert_eq!(err, ProtoError::MissingAttribute("nope".to_string()));
    }

    #[test]
    fn test_depth_first_prefers_first_parent_branch() {
        // root(x=0), left(root), right(x=1); bottom(left, right)
        let build = |space: &mut Space| {
            let root = space.new_object(Args::new().kw("x", 0)).unwrap();
            let left = space.new_object(Args::new().arg(root)).unwrap();
            let right = space.new_object(Args::new().arg(root).kw("x", 1)).unwrap();
            space.new_object(Args::new().arg(left).arg(right)).unwrap()
        };

        let mut c3 = Space::new();
        let bottom = build(&mut c3);
        assert_eq!(lookup(&c3, &Node::Proto(bottom), "x", None).unwrap().value, Value::Int(1));

        let mut dfs = Space::with_config(SpaceConfig::new().with_resolution(Resolution::DepthFirst));
        let bottom = build(&mut dfs);
        assert_eq!(lookup(&dfs, &Node::Proto(bottom), "x", None).unwrap().value, Value::Int(0));
    }

    #[test]
    fn test_reject_policy_flags_unrelated_owners() {
        let mut space =
            Space::with_config(SpaceConfig::new().with_ambiguity(AmbiguityPolicy::Reject));
        let b = space.new_object(Args::new().kw("x", 1)).unwrap();
        let c = space.new_object(Args::new().kw("x", 2)).unwrap();
        let d = space.new_object(Args::new().arg(b).arg(c)).unwrap();
        let err = lookup(&space, &Node::Proto(d), "x", None).unwrap_err();
        match err {
            ProtoError::AmbiguousAttribute { name, owners } => {
                assert_eq!(name, "x");
                assert_eq!(owners.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reject_policy_allows_overrides_and_equal_values() {
        let mut space =
            Space::with_config(SpaceConfig::new().with_ambiguity(AmbiguityPolicy::Reject));
        let a = space.new_object(Args::new().kw("x", 0).kw("y", 7)).unwrap();
        let b = space.new_object(Args::new().arg(a).kw("x", 5)).unwrap();
        let c = space.new_object(Args::new().arg(a).kw("y", 7)).unwrap();
        let d = space.new_object(Args::new().arg(b).arg(c)).unwrap();
        // b overrides a's x; c is unrelated to b but does not define x.
        assert_eq!(lookup(&space, &Node::Proto(d), "x", None).unwrap().value, Value::Int(5));
        // c and a agree on y.
        assert_eq!(lookup(&space, &Node::Proto(d), "y", None).unwrap().value, Value::Int(7));
    }
}
