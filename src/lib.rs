//! # prototype - Self-style delegation objects in Rust
//!
//! Objects in this crate have no classes. Every object (a *prototype*) owns an
//! ordered list of parents and an attribute map, and attribute access walks the
//! parent graph at the moment of the access:
//! - C3-compatible linearization of diamond-shaped parent graphs
//! - First-owner-wins lookup that reports the *defining* object
//! - Method binding that tells `self`, `this` and `super` apart
//! - Per-object equality and hash overrides
//! - Delegation to foreign (host) classes and instances
//!
//! ## Quick Start
//!
//! ```
//! use prototype::model::function::{Args, Function};
//! use prototype::model::space::Space;
//! use prototype::model::value::Value;
//!
//! let mut space = Space::new();
//!
//! // a.f(n) = n * 3
//! let a_f = Function::new("f", &["n"], |_, args| Ok(Value::Int(args.int(0)? * 3)));
//! let a = space.new_object(Args::new().kw("f", a_f)).unwrap();
//!
//! // b.f(n) = 2 * super.f(n)
//! let b_f = Function::new("f", &["self", "super", "n"], |space, args| {
//!     let next = space.get_attr(args.get(1)?, "f")?;
//!     let n = args.get(2)?.clone();
//!     let result = space.call(&next, Args::new().arg(n))?;
//!     Ok(Value::Int(2 * result.as_int()?))
//! });
//! let b = space.new_object(Args::new().arg(a).kw("f", b_f)).unwrap();
//!
//! let f = space.get(b, "f").unwrap();
//! let result = space.call(&f, Args::new().arg(5)).unwrap();
//! assert_eq!(result, Value::Int(30));
//! ```
//!
//! ## Sheets
//!
//! Prototype graphs made only of data can be written down as a *sheet* and
//! loaded with [`sheet::load_str`]:
//!
//! ```
//! use prototype::sheet;
//!
//! let source = r#"
//!     [options]
//!     resolution = "c3"
//!
//!     proto creature { legs = 4 alive = true }
//!     proto person : creature { legs = 2 }
//! "#;
//! let sheet = sheet::load_str(source).unwrap();
//! let person = sheet.object("person").unwrap();
//! let legs = sheet.space().get(person, "legs").unwrap();
//! assert_eq!(legs.as_int().unwrap(), 2);
//! ```
//!
//! ## Architecture
//!
//! - **[`model`]** - The object model
//!   - **[`model::space`]** - The arena owning every prototype, and the public surface
//!   - **[`model::operations`]** - Linearization, lookup, binding, comparison
//!   - **[`model::foreign`]** - The seam for host classes and instances
//!   - **[`model::host`]** - A small concrete host class model
//! - **[`sheet`]** - PEG grammar and builder for sheet files

#[macro_use]
extern crate lazy_static;

pub mod model;
pub mod sheet;
