//! Role-group aggregation.
//!
//! Ungrouped relations become conjuncts directly. Each relation group becomes
//! one conjunct: `∃RoleGroup.(member₁ ⊓ … ⊓ memberₙ)`. Every group shares the
//! same grouping role; groups differ only by their members.

use crate::dl::Concept;
use crate::error::CompileResult;
use crate::lego::{Expression, RelationGroup};

use super::{CompileContext, ExpressionCompiler};

impl ExpressionCompiler {
    /// The conjuncts an expression's relations contribute, in canonical order.
    pub fn aggregate_relations(
        &self,
        expression: &Expression,
        ctx: &mut CompileContext,
    ) -> CompileResult<Vec<Concept>> {
        let mut conjuncts =
            Vec::with_capacity(expression.relations.len() + expression.relation_groups.len());
        for relation in &expression.relations {
            conjuncts.push(self.lower_relation(relation, ctx)?);
        }
        for (index, group) in expression.relation_groups.iter().enumerate() {
            match self.aggregate_group(group, ctx)? {
                Some(grouped) => conjuncts.push(grouped),
                None => tracing::debug!(group = index, "dropping empty relation group"),
            }
        }
        conjuncts.sort();
        conjuncts.dedup();
        Ok(conjuncts)
    }

    /// One relation group under the grouping role, or `None` for an empty group.
    pub fn aggregate_group(
        &self,
        group: &RelationGroup,
        ctx: &mut CompileContext,
    ) -> CompileResult<Option<Concept>> {
        let members = group
            .relations
            .iter()
            .map(|r| self.lower_relation(r, ctx))
            .collect::<CompileResult<Vec<_>>>()?;
        if members.is_empty() {
            return Ok(None);
        }
        let role = self.role_group(ctx);
        Ok(Some(Concept::existential(role, Concept::conjunction(members))))
    }
}
