use crate::{expression::ExprId, reference::Ref, table::ExprTable};

/// Prints the current cone of influence back in BTOR format, renumbered
/// by output index.
pub(crate) struct BtorPrinter<'a> {
    table: &'a mut ExprTable,
}

impl<'a> BtorPrinter<'a> {
    pub(crate) fn new(table: &'a mut ExprTable) -> Self {
        Self { table }
    }

    pub(crate) fn print(mut self) -> Vec<u8> {
        let mut order: Vec<ExprId> = Vec::new();
        for id in self.table.ids() {
            let expr = self.table.expr(id);
            if !expr.is_alive() || expr.index == 0 {
                continue;
            }
            let index = expr.index as usize;
            if order.len() < index {
                order.resize(index, 0);
            }
            order[index - 1] = id;
        }

        let mut output = Vec::new();
        for id in order {
            assert_ne!(id, 0, "Gap in output indices.");
            self.print_expr(id, &mut output);
        }
        output
    }

    fn print_expr(&mut self, id: ExprId, output: &mut Vec<u8>) {
        let expr = self.table.expr(id);
        let (index, width) = (expr.index, expr.width);
        let op = expr.op.clone();
        let operands: Vec<(i32, bool)> = expr
            .operands
            .iter()
            .enumerate()
            .map(|(pos, &operand)| (operand, expr.is_reference(pos)))
            .collect();
        let symbol = expr.symbol.clone();

        let mut line = format!("{} {} {}", index, op, width);
        for (operand, is_reference) in operands {
            if is_reference {
                let target = self.table.resolve_output_index(Ref::new(operand));
                line.push_str(&format!(" {}", target));
            } else {
                line.push_str(&format!(" {}", operand));
            }
        }
        output.extend_from_slice(line.as_bytes());
        // Symbols and payloads are copied byte for byte.
        if let Some(symbol) = symbol {
            output.push(b' ');
            output.extend_from_slice(&symbol);
        }
        output.push(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{cone::cone, expand::expand, parser::Parser};

    fn print(source: &str) -> String {
        String::from_utf8(print_bytes(source.as_bytes())).unwrap()
    }

    fn print_bytes(source: &[u8]) -> Vec<u8> {
        let mut table = Parser::new("test").parse(source).unwrap();
        expand(&mut table);
        cone(&mut table).unwrap();
        BtorPrinter::new(&mut table).print()
    }

    #[test]
    fn test_print_renumbers() {
        let source = "10 var 8 x\n20 const 8 00000001\n30 add 8 10 -20\n35 slice 4 30 3 0\n40 root 4 -35\n";
        assert_eq!(
            print(source),
            "1 var 8 x\n2 const 8 00000001\n3 add 8 1 -2\n4 slice 4 3 3 0\n5 root 4 -4\n"
        );
    }

    #[test]
    fn test_print_skips_dead_code() {
        let source = "1 var 1 a\n2 var 1 b\n3 root 1 2\n";
        assert_eq!(print(source), "1 var 1 b\n2 root 1 1\n");
    }

    #[test]
    fn test_print_symbols() {
        let source = "1 var 1\n2 not 1 1 negated\n3 root 1 2\n";
        assert_eq!(print(source), "1 var 1\n2 not 1 1 negated\n3 root 1 2\n");
    }

    #[test]
    fn test_print_raw_symbols() {
        let source = b"1 var 8 caf\xe9\n2 consth 8 \xff\n3 add 8 1 2\n4 root 8 3\n";
        assert_eq!(print_bytes(source), source.to_vec());
    }

    #[test]
    fn test_print_substituted() {
        let mut table = Parser::new("test")
            .parse("1 var 3\n2 var 3\n3 and 3 1 -2\n4 root 3 3\n")
            .unwrap();
        expand(&mut table);
        table.substitute(4, 3, false);
        table.substitute(5, 3, true);
        cone(&mut table).unwrap();
        assert_eq!(
            BtorPrinter::new(&mut table).print(),
            b"1 zero 3\n2 and 3 1 1\n3 root 3 2\n"
        );
    }

    #[test]
    fn test_print_empty() {
        assert_eq!(print("1 var 1\n"), "");
    }
}
