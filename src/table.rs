use crate::{
    expression::{Expr, ExprId, Link},
    reference::Ref,
};

/// Expression table with union-find style substitution.
///
/// Slot 0 is never used. After expansion, ids `1..=reserved` hold one
/// `zero` expression per bit width; these are the only substitution
/// targets and are never replaced themselves.
pub struct ExprTable {
    pub(crate) e: Vec<Option<Expr>>,
    pub(crate) max_width: u32,
    pub(crate) reserved: u32,
}

impl ExprTable {
    pub fn new() -> Self {
        Self {
            e: vec![None],
            max_width: 0,
            reserved: 0,
        }
    }

    /// Number of slots, including the unused slot 0.
    pub fn size(&self) -> usize {
        self.e.len()
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Number of synthetic zero expressions at the start of the table.
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.e.get(id as usize).and_then(Option::as_ref)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        match self.get(id) {
            Some(expr) => expr,
            None => panic!("Expression {} is not defined.", id),
        }
    }

    pub(crate) fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        match self.e.get_mut(id as usize).and_then(Option::as_mut) {
            Some(expr) => expr,
            None => panic!("Expression {} is not defined.", id),
        }
    }

    /// Iterates over ids of all defined expressions.
    pub fn ids(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.e
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(id, _)| id as ExprId)
    }

    /// Stores `expr` at `id`, growing the table as needed. Returns false
    /// if the slot is already taken.
    pub(crate) fn insert(&mut self, id: ExprId, expr: Expr) -> bool {
        assert_ne!(id, 0);
        let idx = id as usize;
        if idx >= self.e.len() {
            self.e.resize_with(idx + 1, || None);
        }
        if self.e[idx].is_some() {
            return false;
        }
        self.max_width = self.max_width.max(expr.width);
        self.e[idx] = Some(expr);
        true
    }

    // Follows redirections without touching the table.
    fn find(&self, id: ExprId) -> (ExprId, bool) {
        let mut cur = id;
        let mut negated = false;
        loop {
            match self.expr(cur).link {
                Link::Alive => return (cur, negated),
                Link::Redirect { target, negated: n } => {
                    negated ^= n;
                    cur = target;
                }
            }
        }
    }

    /// Returns the representative of `r`, with the sign accumulated along
    /// the chain. Every slot on the chain is rewritten to point straight
    /// at the representative.
    pub fn resolve(&mut self, r: Ref) -> Ref {
        let (repr, parity) = self.find(r.id());
        let mut cur = r.id();
        let mut prefix = false;
        while cur != repr {
            let expr = self.expr_mut(cur);
            let Link::Redirect { target, negated } = expr.link else {
                panic!("Unreachable code.");
            };
            expr.link = Link::Redirect {
                target: repr,
                negated: parity ^ prefix,
            };
            prefix ^= negated;
            cur = target;
        }
        Ref::from_id(repr, r.is_negated() ^ parity)
    }

    /// Resolves `r` and returns the output index of its representative.
    /// Must only be called for expressions in the current cone.
    pub fn resolve_output_index(&mut self, r: Ref) -> Ref {
        let repr = self.resolve(r);
        let index = self.expr(repr.id()).index;
        assert_ne!(index, 0, "Expression {} is not reachable.", repr.id());
        Ref::from_id(index, repr.is_negated())
    }

    pub fn checkpoint(&mut self) {
        for expr in self.e.iter_mut().flatten() {
            expr.saved = expr.link;
        }
    }

    pub fn restore(&mut self) {
        for expr in self.e.iter_mut().flatten() {
            expr.link = expr.saved;
        }
    }

    /// Replaces `id` by the zero expression of `width`, or by its
    /// complement if `negated`.
    pub fn substitute(&mut self, id: ExprId, width: u32, negated: bool) {
        assert!(
            width >= 1 && width <= self.reserved,
            "No zero expression of width {}.",
            width
        );
        self.expr_mut(id).link = Link::Redirect {
            target: width,
            negated,
        };
    }

    /// Resets all output indices.
    pub fn clear(&mut self) {
        for expr in self.e.iter_mut().flatten() {
            expr.index = 0;
        }
    }
}

impl Default for ExprTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expression::Operator;

    fn table_with_zeros(width: u32) -> ExprTable {
        let mut table = ExprTable::new();
        for w in 1..=width {
            assert!(table.insert(w, Expr::zero(w)));
        }
        table.reserved = width;
        table
    }

    #[test]
    fn test_insert_grows_and_rejects_duplicates() {
        let mut table = ExprTable::new();
        assert!(table.insert(5, Expr::new(Operator::Var, 8, vec![], None)));
        assert_eq!(table.size(), 6);
        assert!(table.get(3).is_none());
        assert!(!table.insert(5, Expr::new(Operator::Var, 4, vec![], None)));
        assert_eq!(table.max_width(), 8);
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_resolve_alive() {
        let mut table = table_with_zeros(2);
        table.insert(3, Expr::new(Operator::Var, 2, vec![], None));
        assert_eq!(table.resolve(Ref::new(3)), Ref::new(3));
        assert_eq!(table.resolve(Ref::new(-3)), Ref::new(-3));
    }

    #[test]
    fn test_resolve_substituted() {
        let mut table = table_with_zeros(4);
        table.insert(5, Expr::new(Operator::Var, 4, vec![], None));
        table.substitute(5, 4, true);
        assert_eq!(table.resolve(Ref::new(5)), Ref::new(-4));
        assert_eq!(table.resolve(Ref::new(-5)), Ref::new(4));
    }

    #[test]
    fn test_resolve_compresses_path() {
        let mut table = table_with_zeros(1);
        table.insert(2, Expr::new(Operator::Not, 1, vec![1], None));
        table.insert(3, Expr::new(Operator::Not, 1, vec![2], None));
        table.insert(4, Expr::new(Operator::Not, 1, vec![3], None));
        // Build a chain 4 -> -3 -> -2 -> 1 by hand.
        table.expr_mut(2).link = Link::Redirect {
            target: 1,
            negated: true,
        };
        table.expr_mut(3).link = Link::Redirect {
            target: 2,
            negated: true,
        };
        table.expr_mut(4).link = Link::Redirect {
            target: 3,
            negated: false,
        };

        assert_eq!(table.resolve(Ref::new(4)), Ref::new(1));
        assert_eq!(
            table.expr(4).link(),
            Link::Redirect {
                target: 1,
                negated: false
            }
        );
        assert_eq!(
            table.expr(3).link(),
            Link::Redirect {
                target: 1,
                negated: false
            }
        );
        assert_eq!(
            table.expr(2).link(),
            Link::Redirect {
                target: 1,
                negated: true
            }
        );
        assert_eq!(table.resolve(Ref::new(-2)), Ref::new(1));
    }

    #[test]
    fn test_resolve_idempotent() {
        let mut table = table_with_zeros(8);
        table.insert(9, Expr::new(Operator::Var, 8, vec![], None));
        table.insert(10, Expr::new(Operator::Not, 8, vec![9], None));
        table.substitute(9, 8, false);
        table.expr_mut(10).link = Link::Redirect {
            target: 9,
            negated: true,
        };
        let first = table.resolve(Ref::new(10));
        let link = table.expr(10).link();
        let second = table.resolve(Ref::new(10));
        assert_eq!(first, second);
        assert_eq!(table.expr(10).link(), link);
        // A compressed slot is one step away from its representative.
        assert_eq!(
            link,
            Link::Redirect {
                target: 8,
                negated: true
            }
        );
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut table = table_with_zeros(8);
        table.insert(9, Expr::new(Operator::Var, 8, vec![], None));
        table.insert(10, Expr::new(Operator::Var, 3, vec![], None));
        table.checkpoint();
        table.substitute(9, 8, false);
        table.substitute(10, 3, true);
        assert!(!table.expr(9).is_alive());
        table.restore();
        assert!(table.expr(9).is_alive());
        assert!(table.expr(10).is_alive());

        table.substitute(9, 8, false);
        table.checkpoint();
        table.substitute(10, 3, true);
        table.restore();
        assert!(!table.expr(9).is_alive());
        assert!(table.expr(10).is_alive());
    }

    #[test]
    #[should_panic(expected = "not reachable")]
    fn test_resolve_output_index_unreachable() {
        let mut table = table_with_zeros(1);
        table.resolve_output_index(Ref::new(1));
    }

    #[test]
    #[should_panic(expected = "not defined")]
    fn test_resolve_unused_slot() {
        let mut table = table_with_zeros(1);
        table.insert(4, Expr::new(Operator::Var, 1, vec![], None));
        table.resolve(Ref::new(3));
    }
}
