use crate::{expression::Expr, table::ExprTable};

/// Reserves ids `1..=W` (W = maximal width) for one `zero` expression per
/// width, shifting every parsed expression and reference up by W.
pub(crate) fn expand(table: &mut ExprTable) {
    assert_eq!(table.reserved, 0, "Table is already expanded.");
    let shift = table.max_width;
    if shift == 0 {
        return;
    }

    let mut e: Vec<Option<Expr>> = Vec::with_capacity(table.e.len() + shift as usize);
    e.push(None);
    e.extend((1..=shift).map(|width| Some(Expr::zero(width))));
    for slot in table.e.drain(1..) {
        e.push(slot.map(|mut expr| {
            for pos in 0..expr.operands.len() {
                if !expr.op.is_reference(pos) {
                    continue;
                }
                let operand = &mut expr.operands[pos];
                if *operand < 0 {
                    *operand -= shift as i32;
                } else {
                    *operand += shift as i32;
                }
            }
            expr
        }));
    }
    table.e = e;
    table.reserved = shift;
}
