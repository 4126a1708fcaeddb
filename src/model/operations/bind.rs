//! Turning found functions into callables.
//!
//! A bound method carries the receiver the attribute was fetched through and
//! the object whose map held the function. When it runs, declared parameters
//! named after a [`ParamRole`] are injected from those two, and every other
//! parameter is filled from the caller's arguments.

use std::rc::Rc;

use log::trace;

use crate::model::error::ProtoError;
use crate::model::function::{Args, BoundMethod, Function, ParamRole};
use crate::model::object::Node;
use crate::model::operations::lookup::{lookup, Found};
use crate::model::space::Space;
use crate::model::value::Value;

pub fn bind(function: Rc<Function>, receiver: Value, definer: Node) -> Rc<BoundMethod> {
    trace!(
        "bind {} to {} (defined by {:?})",
        function.name(),
        receiver,
        definer
    );
    Rc::new(BoundMethod::new(function, receiver, definer))
}

/// Bind a lookup result to `receiver`. Only functions are bound; data passes
/// through unchanged.
pub fn bind_found(receiver: &Value, found: Found) -> Value {
    match found.value {
        Value::Function(function) => {
            Value::Method(bind(function, receiver.clone(), found.definer))
        }
        other => other,
    }
}

/// Build the argument list the body of `function` sees.
///
/// Without `bound` the reserved names get no special treatment.
pub fn fill_parameters(
    function: &Function,
    bound: Option<&Rc<BoundMethod>>,
    args: Args,
) -> Result<Args, ProtoError> {
    if function.params().is_empty() {
        return Ok(args);
    }

    let Args {
        positional,
        mut keywords,
    } = args;
    let mut supplied = positional.into_iter();
    let mut filled = Vec::with_capacity(function.params().len());

    for param in function.params() {
        let injected = match (param.role(), bound) {
            (ParamRole::Positional, _) | (_, None) => None,
            (ParamRole::Receiver, Some(m)) => Some(m.receiver().clone()),
            (ParamRole::Definer, Some(m)) | (ParamRole::Owner, Some(m)) => {
                Some(m.definer().to_value())
            }
            (ParamRole::Resend, Some(m)) => Some(Value::Method(m.clone())),
        };
        if let Some(value) = injected {
            filled.push(value);
            continue;
        }

        let value = match supplied.next() {
            Some(value) => value,
            None => match keywords.shift_remove(param.name()) {
                Some(value) => value,
                None => match param.default() {
                    Some(value) => value.clone(),
                    None => {
                        return Err(ProtoError::MissingArgument {
                            function: function.name().to_string(),
                            parameter: param.name().to_string(),
                        })
                    }
                },
            },
        };
        filled.push(value);
    }

    filled.extend(supplied);
    Ok(Args {
        positional: filled,
        keywords,
    })
}

pub fn invoke(space: &mut Space, method: &Rc<BoundMethod>, args: Args) -> Result<Value, ProtoError> {
    let function = method.function().clone();
    let args = fill_parameters(&function, Some(method), args)?;
    trace!("invoke {} on {}", function.name(), method.receiver());
    let body = function.body();
    body(space, args)
}

pub fn invoke_unbound(
    space: &mut Space,
    function: &Rc<Function>,
    args: Args,
) -> Result<Value, ProtoError> {
    let args = fill_parameters(function, None, args)?;
    trace!("invoke unbound {}", function.name());
    let body = function.body();
    body(space, args)
}

/// `super.name`: continue past the handle's definer in the definer's own
/// search order, binding whatever is found to the handle's receiver.
pub fn resend(space: &Space, handle: &BoundMethod, name: &str) -> Result<Value, ProtoError> {
    let definer = handle.definer();
    let found = lookup(space, definer, name, Some(definer))?;
    trace!(
        "resend {} past {} found it in {}",
        name,
        space.describe(definer),
        space.describe(&found.definer)
    );
    Ok(bind_found(handle.receiver(), found))
}
