use crate::{
    expression::{ExprId, Operator},
    reference::Ref,
    table::ExprTable,
};
use anyhow::{bail, Result};

/// Numbers the cone of influence of all `root` expressions in post-order,
/// so that every expression gets a larger output index than its operands.
/// Returns the number of reachable expressions.
///
/// Output indices must be cleared with [`ExprTable::clear`] before the
/// next call.
pub(crate) fn cone(table: &mut ExprTable) -> Result<u32> {
    let roots: Vec<ExprId> = table
        .ids()
        .filter(|&id| table.expr(id).op == Operator::Root)
        .collect();

    let mut count = 0;
    let mut on_stack = vec![false; table.size()];
    // (expression, next operand position to look at)
    let mut stack: Vec<(ExprId, usize)> = Vec::new();
    for root in roots {
        if table.expr(root).index != 0 {
            continue;
        }
        stack.push((root, 0));
        on_stack[root as usize] = true;

        while let Some((id, pos)) = stack.last_mut() {
            let expr = table.expr(*id);
            if *pos < expr.operands.len() {
                let operand = expr.operands[*pos];
                let is_reference = expr.is_reference(*pos);
                *pos += 1;
                if !is_reference {
                    continue;
                }
                let child = table.resolve(Ref::new(operand)).id();
                if on_stack[child as usize] {
                    bail!("cyclic dependency through expression {}", child);
                }
                if table.expr(child).index == 0 {
                    on_stack[child as usize] = true;
                    stack.push((child, 0));
                }
                continue;
            }

            let id = *id;
            stack.pop();
            on_stack[id as usize] = false;
            count += 1;
            table.expr_mut(id).index = count;
        }
    }
    Ok(count)
}
