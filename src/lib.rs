mod cone;
mod expand;
mod expression;
mod io;
mod parser;
mod printer;
mod program;
mod reducer;
mod reference;
mod runner;
mod table;

pub use expression::{Expr, ExprId, Link, Operator};
pub use parser::Parser;
pub use program::BtorProgram;
pub use reducer::{next_interval, ReduceOptions, ReductionStats};
pub use reference::Ref;
pub use runner::{CommandOracle, Oracle, Status};
pub use table::ExprTable;
