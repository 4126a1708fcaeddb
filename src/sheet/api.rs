use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::model::error::ProtoError;

#[derive(Parser)]
#[grammar = "sheet/sheet.pest"] // relative to src
pub struct SheetParser;

/// A literal as written in a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Literal>),
    /// Name of a prototype declared earlier in the same sheet.
    Reference(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoDecl {
    pub name: String,
    pub parents: Vec<String>,
    pub attributes: Vec<(String, Literal)>,
    /// 1-based line of the declaration.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetSource {
    pub options: Vec<(String, Literal)>,
    pub prototypes: Vec<ProtoDecl>,
}

pub fn parse_sheet(source: &str) -> Result<SheetSource, ProtoError> {
    let mut pairs = SheetParser::parse(Rule::sheet, source)
        .map_err(|e| ProtoError::Sheet(format!("parse error\n{}", e)))?;
    let sheet = pairs
        .next()
        .ok_or_else(|| ProtoError::Sheet("empty parse".to_string()))?;

    let mut result = SheetSource::default();
    for pair in sheet.into_inner() {
        match pair.as_rule() {
            Rule::options => {
                for option in pair.into_inner() {
                    result.options.push(build_assignment(option)?);
                }
            }
            Rule::prototype => result.prototypes.push(build_prototype(pair)?),
            Rule::EOI => {}
            _ => return Err(unexpected(&pair)),
        }
    }
    Ok(result)
}

fn build_prototype(pair: Pair<Rule>) -> Result<ProtoDecl, ProtoError> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut decl = ProtoDecl {
        name: String::new(),
        parents: vec![],
        attributes: vec![],
        line,
    };
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::proto_kw => {}
            Rule::identifier => decl.name = inner.as_str().to_string(),
            Rule::parents => {
                decl.parents = inner.into_inner().map(|p| p.as_str().to_string()).collect();
            }
            Rule::attribute => decl.attributes.push(build_assignment(inner)?),
            _ => return Err(unexpected(&inner)),
        }
    }
    Ok(decl)
}

/// `identifier = value`, used by both options and attributes.
fn build_assignment(pair: Pair<Rule>) -> Result<(String, Literal), ProtoError> {
    let mut inner = pair.into_inner();
    let name = next_pair(&mut inner, "name")?.as_str().to_string();
    let value = build_value(next_pair(&mut inner, "value")?)?;
    Ok((name, value))
}

fn build_value(pair: Pair<Rule>) -> Result<Literal, ProtoError> {
    let inner = next_pair(&mut pair.into_inner(), "literal")?;
    Ok(match inner.as_rule() {
        Rule::float => Literal::Float(
            inner
                .as_str()
                .parse()
                .map_err(|_| invalid(&inner, "float"))?,
        ),
        Rule::integer => Literal::Int(
            inner
                .as_str()
                .parse()
                .map_err(|_| invalid(&inner, "integer"))?,
        ),
        Rule::string => {
            let body = next_pair(&mut inner.into_inner(), "string body")?;
            Literal::Str(unescape(body.as_str()))
        }
        Rule::boolean => Literal::Bool(inner.as_str() == "true"),
        Rule::none => Literal::None,
        Rule::tuple => Literal::Tuple(
            inner
                .into_inner()
                .map(build_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Rule::reference => Literal::Reference(inner.as_str().to_string()),
        _ => return Err(unexpected(&inner)),
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>, ProtoError> {
    pairs
        .next()
        .ok_or_else(|| ProtoError::Sheet(format!("missing {}", what)))
}

fn unexpected(pair: &Pair<Rule>) -> ProtoError {
    let (line, col) = pair.as_span().start_pos().line_col();
    ProtoError::Sheet(format!(
        "unexpected {:?} at {}:{}",
        pair.as_rule(),
        line,
        col
    ))
}

fn invalid(pair: &Pair<Rule>, kind: &str) -> ProtoError {
    let (line, _) = pair.as_span().start_pos().line_col();
    ProtoError::Sheet(format!("line {}: invalid {} `{}`", line, kind, pair.as_str()))
}
