//! Declarative descriptions of prototype graphs.
//!
//! A sheet lists runtime options and then prototypes, each with its parents
//! and data attributes. Parents and references must name prototypes declared
//! earlier in the sheet. Every loaded prototype gets its declared name as
//! `_name`.

pub mod api;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::model::config::SpaceConfig;
use crate::model::error::ProtoError;
use crate::model::function::Args;
use crate::model::object::ObjectId;
use crate::model::space::{Space, NAME};
use crate::model::value::Value;

use self::api::{parse_sheet, Literal, ProtoDecl};

/// A loaded sheet: the space it built and the names it declared.
#[derive(Debug)]
pub struct Sheet {
    space: Space,
    names: IndexMap<String, ObjectId>,
}

impl Sheet {
    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    pub fn into_space(self) -> Space {
        self.space
    }

    pub fn object(&self, name: &str) -> Result<ObjectId, ProtoError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ProtoError::Sheet(format!("no prototype named `{}`", name)))
    }

    /// Declared names in sheet order.
    pub fn names(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.names.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

pub fn load_str(source: &str) -> Result<Sheet, ProtoError> {
    let parsed = parse_sheet(source)?;
    let config = SpaceConfig::from_options(&parsed.options)?;
    let mut sheet = Sheet {
        space: Space::with_config(config),
        names: IndexMap::new(),
    };
    for decl in &parsed.prototypes {
        declare(&mut sheet, decl)?;
    }
    Ok(sheet)
}

pub fn load_file(path: &Path) -> Result<Sheet, ProtoError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ProtoError::Sheet(format!("failed to read {}: {}", path.display(), e)))?;
    load_str(&content)
}

fn declare(sheet: &mut Sheet, decl: &ProtoDecl) -> Result<(), ProtoError> {
    if sheet.names.contains_key(&decl.name) {
        return Err(ProtoError::Sheet(format!(
            "line {}: `{}` is declared twice",
            decl.line, decl.name
        )));
    }

    let mut args = Args::new().kw(NAME, decl.name.as_str());
    for parent in &decl.parents {
        args = args.arg(resolve(sheet, parent, decl.line)?);
    }
    for (key, literal) in &decl.attributes {
        let value = to_value(sheet, literal, decl.line)?;
        args.keywords.insert(key.clone(), value);
    }

    let id = sheet.space.new_object(args)?;
    debug!("sheet line {}: declared {} as {}", decl.line, decl.name, id);
    sheet.names.insert(decl.name.clone(), id);
    Ok(())
}

fn resolve(sheet: &Sheet, name: &str, line: usize) -> Result<ObjectId, ProtoError> {
    sheet.names.get(name).copied().ok_or_else(|| {
        ProtoError::Sheet(format!("line {}: unknown prototype `{}`", line, name))
    })
}

fn to_value(sheet: &Sheet, literal: &Literal, line: usize) -> Result<Value, ProtoError> {
    Ok(match literal {
        Literal::None => Value::None,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::str(s),
        Literal::Tuple(items) => Value::tuple(
            items
                .iter()
                .map(|item| to_value(sheet, item, line))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Literal::Reference(name) => Value::Object(resolve(sheet, name, line)?),
    })
}
