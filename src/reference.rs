use std::fmt::{Display, Formatter};
use std::ops::Neg;

use crate::expression::ExprId;

/// Signed reference to an expression, the sign standing for bitwise
/// negation. Used both for expression ids and for output indices.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn from_id(id: ExprId, negated: bool) -> Self {
        let raw = i32::try_from(id).expect("expression id out of range");
        if negated {
            Self(-raw)
        } else {
            Self(raw)
        }
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn id(self) -> ExprId {
        self.0.unsigned_abs()
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
