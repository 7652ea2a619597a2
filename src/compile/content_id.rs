//! Content identities for named composite expressions.
//!
//! An expression is encoded into a canonical string and hashed into a
//! 128-bit name-based UUID. Identities inside the encoding are length
//! prefixed, and every multiset (relations, groups, group members, composite
//! children) is sorted by member encoding before it is joined, so two
//! structurally equal expressions encode identically whatever order their
//! members were written in.
//!
//! Grammar:
//!
//! ```text
//! expr     = "E(" focus "|" rel,* "|" group,* ")"
//! focus    = ident | "J[" expr,* "]"
//! rel      = "R(" ident "=" dest ")"
//! group    = "G{" rel,* "}"
//! dest     = expr | meas | "T" len ":" text | "B:" bool
//! meas     = "M(" ("U" ident | "-") ";" value ")"
//! ident    = "C" len ":" identity
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CompileResult;
use crate::lego::{Bound, Destination, Expression, Focus, Measurement, Point, PointValue, Relation};

use super::identity::{IdentityResolver, name_uuid_from_bytes};
use super::measurement::measurement_units;

/// Deterministic identity of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Hash a canonical encoding into an identity.
    pub fn from_encoding(encoding: &str) -> Self {
        Self(name_uuid_from_bytes(encoding.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Canonical encoding of `expression`.
pub fn canonical_encoding(
    resolver: &IdentityResolver<'_>,
    expression: &Expression,
) -> CompileResult<String> {
    let mut out = String::new();
    encode_expression(resolver, expression, &mut out)?;
    Ok(out)
}

fn encode_identity(identity: &str, out: &mut String) {
    out.push('C');
    out.push_str(&identity.len().to_string());
    out.push(':');
    out.push_str(identity);
}

/// Encode each item separately, sort, and join with commas.
fn encode_sorted<T>(
    items: impl IntoIterator<Item = T>,
    mut encode: impl FnMut(T, &mut String) -> CompileResult<()>,
    out: &mut String,
) -> CompileResult<()> {
    let mut parts = Vec::new();
    for item in items {
        let mut part = String::new();
        encode(item, &mut part)?;
        parts.push(part);
    }
    parts.sort();
    out.push_str(&parts.join(","));
    Ok(())
}

fn encode_expression(
    resolver: &IdentityResolver<'_>,
    expression: &Expression,
    out: &mut String,
) -> CompileResult<()> {
    out.push_str("E(");
    match expression.focus()? {
        Focus::Concept(concept) => encode_identity(&resolver.resolve(concept)?, out),
        Focus::Conjunction(children) => {
            out.push_str("J[");
            encode_sorted(children, |child, o| encode_expression(resolver, child, o), out)?;
            out.push(']');
        }
    }
    out.push('|');
    encode_sorted(&expression.relations, |r, o| encode_relation(resolver, r, o), out)?;
    out.push('|');
    let groups = expression.relation_groups.iter().filter(|g| !g.relations.is_empty());
    encode_sorted(
        groups,
        |group, o| {
            o.push_str("G{");
            encode_sorted(&group.relations, |r, o| encode_relation(resolver, r, o), o)?;
            o.push('}');
            Ok(())
        },
        out,
    )?;
    out.push(')');
    Ok(())
}

fn encode_relation(
    resolver: &IdentityResolver<'_>,
    relation: &Relation,
    out: &mut String,
) -> CompileResult<()> {
    out.push_str("R(");
    encode_identity(&resolver.resolve(&relation.relation_type)?, out);
    out.push('=');
    match &relation.destination {
        Destination::Expression(expression) => encode_expression(resolver, expression, out)?,
        Destination::Measurement(measurement) => encode_measurement(resolver, measurement, out)?,
        Destination::Text(text) => {
            out.push('T');
            out.push_str(&text.len().to_string());
            out.push(':');
            out.push_str(text);
        }
        Destination::Boolean(value) => {
            out.push_str("B:");
            out.push_str(if *value { "true" } else { "false" });
        }
    }
    out.push(')');
    Ok(())
}

fn encode_measurement(
    resolver: &IdentityResolver<'_>,
    measurement: &Measurement,
    out: &mut String,
) -> CompileResult<()> {
    out.push_str("M(");
    match measurement_units(resolver, measurement)? {
        Some((identity, _)) => {
            out.push('U');
            encode_identity(&identity, out);
        }
        None => out.push('-'),
    }
    out.push(';');
    match measurement {
        Measurement::Point(point) => {
            out.push('P');
            encode_point(point, out);
        }
        Measurement::Bound(bound) => encode_bound(bound, out),
        Measurement::Interval(interval) => {
            out.push('I');
            for bound in [&interval.lower, &interval.upper] {
                match bound {
                    Some(b) => encode_bound(b, out),
                    None => out.push('-'),
                }
            }
        }
    }
    out.push(')');
    Ok(())
}

/// An absent limit encodes as `-` alone, since its inclusivity flag has no
/// effect on the lowered concept.
fn encode_bound(bound: &Bound, out: &mut String) {
    match &bound.lower {
        Some(p) => {
            out.push(if bound.is_lower_inclusive() { '[' } else { '(' });
            encode_point(p, out);
        }
        None => out.push('-'),
    }
    out.push('~');
    match &bound.upper {
        Some(p) => {
            encode_point(p, out);
            out.push(if bound.is_upper_inclusive() { ']' } else { ')' });
        }
        None => out.push('-'),
    }
}

fn encode_point(point: &Point, out: &mut String) {
    match point.value {
        PointValue::Integer(v) => {
            out.push('i');
            out.push_str(&v.to_string());
        }
        PointValue::Float(v) => {
            out.push('f');
            out.push_str(&v.to_string());
        }
        PointValue::Constant(c) => {
            out.push('k');
            out.push_str(c.name());
        }
    }
}
