use std::fmt::{Display, Formatter};

pub type ExprId = u32;

macro_rules! operators {
    ($($variant:ident => $name:literal,)*) => {
        /// Operator of a BTOR expression.
        ///
        /// Names outside the known set are kept verbatim in `Other`, so the
        /// reducer never rejects a program just because it uses an operator
        /// it does not know about.
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum Operator {
            $($variant,)*
            Other(String),
        }

        impl Operator {
            pub fn from_name(name: &str) -> Self {
                match name {
                    $($name => Self::$variant,)*
                    _ => Self::Other(name.to_owned()),
                }
            }

            pub fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)*
                    Self::Other(name) => name,
                }
            }
        }
    };
}

operators! {
    Add => "add",
    And => "and",
    Array => "array",
    Concat => "concat",
    Cond => "cond",
    Const => "const",
    Constd => "constd",
    Consth => "consth",
    Dec => "dec",
    Eq => "eq",
    Iff => "iff",
    Implies => "implies",
    Inc => "inc",
    Mul => "mul",
    Nand => "nand",
    Ne => "ne",
    Neg => "neg",
    Nor => "nor",
    Not => "not",
    One => "one",
    Ones => "ones",
    Or => "or",
    Read => "read",
    Redand => "redand",
    Redor => "redor",
    Redxor => "redxor",
    Rol => "rol",
    Ror => "ror",
    Root => "root",
    Saddo => "saddo",
    Sdiv => "sdiv",
    Sdivo => "sdivo",
    Sext => "sext",
    Sgt => "sgt",
    Sgte => "sgte",
    Slice => "slice",
    Sll => "sll",
    Slt => "slt",
    Slte => "slte",
    Smod => "smod",
    Smulo => "smulo",
    Sra => "sra",
    Srem => "srem",
    Srl => "srl",
    Ssubo => "ssubo",
    Sub => "sub",
    Uaddo => "uaddo",
    Udiv => "udiv",
    Uext => "uext",
    Ugt => "ugt",
    Ugte => "ugte",
    Ult => "ult",
    Ulte => "ulte",
    Umulo => "umulo",
    Urem => "urem",
    Usubo => "usubo",
    Var => "var",
    Write => "write",
    Xnor => "xnor",
    Xor => "xor",
    Zero => "zero",
}

impl Operator {
    /// Whether the operand at `position` names another expression.
    ///
    /// Everything else is an opaque literal (array index widths, slice
    /// bounds, extension amounts, ...) that is copied through untouched.
    pub fn is_reference(&self, position: usize) -> bool {
        match self {
            Self::Array | Self::Const | Self::Consth | Self::Constd | Self::Var | Self::Zero => {
                false
            }
            Self::Root | Self::Sext | Self::Slice | Self::Uext => position == 0,
            _ => true,
        }
    }

    /// Operators whose token after the width is a literal or a name.
    pub fn has_payload(&self) -> bool {
        matches!(self, Self::Const | Self::Consth | Self::Constd | Self::Var)
    }

    /// Roots define what is checked and arrays have no scalar constant,
    /// so neither can be replaced by a zero.
    pub fn is_substitutable(&self) -> bool {
        !matches!(self, Self::Root | Self::Array)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Union-find state of an expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Link {
    /// The expression is its own representative.
    Alive,
    /// The expression was replaced by `target` (complemented if `negated`).
    Redirect { target: ExprId, negated: bool },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub(crate) link: Link,
    pub(crate) saved: Link,
    // Position in dependency order, 0 if not reachable.
    pub(crate) index: u32,
    pub op: Operator,
    pub width: u32,
    pub operands: Vec<i32>,
    pub symbol: Option<Vec<u8>>,
}

impl Expr {
    pub fn new(op: Operator, width: u32, operands: Vec<i32>, symbol: Option<Vec<u8>>) -> Self {
        assert!(operands.len() <= 3, "more than three operands");
        Self {
            link: Link::Alive,
            saved: Link::Alive,
            index: 0,
            op,
            width,
            operands,
            symbol,
        }
    }

    pub fn zero(width: u32) -> Self {
        Self::new(Operator::Zero, width, Vec::new(), None)
    }

    pub fn is_reference(&self, position: usize) -> bool {
        position < self.operands.len() && self.op.is_reference(position)
    }

    pub fn is_alive(&self) -> bool {
        self.link == Link::Alive
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn output_index(&self) -> u32 {
        self.index
    }
}
