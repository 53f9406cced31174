//! In-place rewriting of payload leaves addressed by field path.

use crate::error::Result;
use crate::value::{Message, Value};
use std::mem;

/// Apply `f` to the field `name` of every container reached by `path`.
///
/// Repeated fields fan out: a list met on the way applies the rest of the
/// path to each of its messages, and a list leaf has `f` applied to each
/// item. Missing fields and `Null` nodes end the walk for that branch.
pub fn map_leaves<F>(message: &mut Message, path: &[String], name: &str, f: &F) -> Result<()>
where
    F: Fn(Value) -> Result<Value>,
{
    match path.split_first() {
        Some((head, rest)) => match message.get_mut(head.as_str()) {
            Some(node) => descend(node, rest, name, f),
            None => Ok(()),
        },
        None => match message.get_mut(name) {
            Some(Value::List(items)) => {
                for item in items.iter_mut() {
                    apply(item, f)?;
                }
                Ok(())
            }
            Some(leaf) => apply(leaf, f),
            None => Ok(()),
        },
    }
}

fn descend<F>(node: &mut Value, path: &[String], name: &str, f: &F) -> Result<()>
where
    F: Fn(Value) -> Result<Value>,
{
    match node {
        Value::Message(inner) => map_leaves(inner, path, name, f),
        Value::List(items) => {
            for item in items.iter_mut() {
                descend(item, path, name, f)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn apply<F>(leaf: &mut Value, f: &F) -> Result<()>
where
    F: Fn(Value) -> Result<Value>,
{
    if leaf.is_null() {
        return Ok(());
    }
    *leaf = f(mem::take(leaf))?;
    Ok(())
}
