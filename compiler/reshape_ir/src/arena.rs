//! Expression arena.
//!
//! Struct-of-arrays storage: `kinds` and `types` are parallel arrays
//! indexed by `ExprId`; argument and statement lists live flattened in
//! `expr_lists` and are addressed by `ExprRange`.

use reshape_types::TypeId;

use crate::expr::ExprKind;
use crate::ids::{ExprId, ExprRange};

#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    types: Vec<TypeId>,
    expr_lists: Vec<ExprId>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "generated functions stay far below u32 limits"
)]
impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its id.
    pub fn push(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        let id = ExprId::new(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.types.push(ty);
        id
    }

    pub fn push_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = self.expr_lists.len() as u32;
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, ids.len() as u32)
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: ExprId) -> TypeId {
        self.types[id.index()]
    }

    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reshape_types::Value;

    #[test]
    fn lists_longer_than_u16_keep_every_id() {
        let mut arena = ExprArena::new();
        let leaf = arena.push(ExprKind::Constant(Value::I32(0)), TypeId::I32);
        let ids = vec![leaf; 70_000];

        let range = arena.push_list(&ids);
        assert_eq!(range.len(), 70_000);
        assert_eq!(arena.list(range).len(), 70_000);
    }
}
