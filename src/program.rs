use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::{
    expand::expand,
    parser::Parser,
    reducer::{render, ReduceOptions, Reducer, ReductionStats},
    runner::Oracle,
    table::ExprTable,
};

/// Parsed BTOR program, expanded with one zero expression per bit width
/// and ready to be reduced.
pub struct BtorProgram {
    table: ExprTable,
}

impl BtorProgram {
    /// Parses BTOR source. `name` is used in error messages. Symbols and
    /// payloads are kept as raw bytes.
    ///
    /// ```
    /// use deltabtor_rust::BtorProgram;
    /// let source = "1 var 4 x\n2 not 4 1\n3 var 4 unused\n4 root 4 -2\n";
    /// let mut program = BtorProgram::parse("<input>", source).unwrap();
    /// assert_eq!(program.to_source().unwrap(), "1 var 4 x\n2 not 4 1\n3 root 4 -2\n");
    /// ```
    pub fn parse(name: &str, source: impl AsRef<[u8]>) -> Result<Self> {
        let mut table = Parser::new(name).parse(source)?;
        expand(&mut table);
        Ok(Self { table })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source =
            fs::read(path).with_context(|| format!("can not read '{}'", path.display()))?;
        Self::parse(&path.display().to_string(), source)
    }

    pub fn table(&self) -> &ExprTable {
        &self.table
    }

    /// Produces BTOR source for the cone of influence of the current
    /// configuration, exactly as it is written for the oracle.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(render(&mut self.table)?.0)
    }

    /// Like `to_bytes`, with symbols that are not valid UTF-8 replaced by
    /// `U+FFFD`.
    pub fn to_source(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.to_bytes()?).into_owned())
    }

    /// Number of expressions that would be printed by `to_source`.
    pub fn live_size(&mut self) -> Result<u32> {
        Ok(render(&mut self.table)?.1)
    }

    /// Shrinks the program while `oracle` keeps reporting the status it
    /// gives for the unmodified program. The best program found so far is
    /// always available in `output`.
    pub fn reduce<O: Oracle>(
        &mut self,
        output: &Path,
        oracle: O,
        options: &ReduceOptions,
    ) -> Result<ReductionStats> {
        Reducer::new(&mut self.table, oracle, output, options)?.run()
    }
}
