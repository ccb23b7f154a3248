//! Condition codes of `Jcc`, `SETcc` and `CMOVcc`.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Condition codes in encoding order.
///
/// The low nibble of the `7x`, `0F 8x`, `0F 9x` and `0F 4x` opcodes indexes this table.
/// Each condition has a logical negation accessible via [`Condition::negate`], which
/// always differs from it in the lowest encoding bit.
///
/// | Condition | Flags Checked | Common Use |
/// |-----------|---------------|------------|
/// | `E`/`Ne` | ZF | Equality comparison |
/// | `L`/`Ge`/`Le`/`G` | SF, OF, ZF | Signed comparison |
/// | `B`/`Ae`/`Be`/`A` | CF, ZF | Unsigned comparison |
/// | `S`/`Ns` | SF | Sign check |
/// | `O`/`No` | OF | Overflow check |
/// | `P`/`Np` | PF | Parity check |
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
    /// Overflow (OF=1)
    O,
    /// Not overflow (OF=0)
    No,
    /// Below (CF=1)
    B,
    /// Above or equal (CF=0)
    Ae,
    /// Equal (ZF=1)
    E,
    /// Not equal (ZF=0)
    Ne,
    /// Below or equal (CF=1 or ZF=1)
    Be,
    /// Above (CF=0 and ZF=0)
    A,
    /// Sign (SF=1)
    S,
    /// Not sign (SF=0)
    Ns,
    /// Parity even (PF=1)
    P,
    /// Parity odd (PF=0)
    Np,
    /// Less than (SF!=OF)
    L,
    /// Greater than or equal (SF=OF)
    Ge,
    /// Less than or equal (ZF=1 or SF!=OF)
    Le,
    /// Greater than (ZF=0 and SF=OF)
    G,
}

/// All conditions, indexed by their four-bit code.
pub static CONDITIONS: [Condition; 16] = [
    Condition::O,
    Condition::No,
    Condition::B,
    Condition::Ae,
    Condition::E,
    Condition::Ne,
    Condition::Be,
    Condition::A,
    Condition::S,
    Condition::Ns,
    Condition::P,
    Condition::Np,
    Condition::L,
    Condition::Ge,
    Condition::Le,
    Condition::G,
];

impl Condition {
    /// Returns the condition encoded in the low nibble of an opcode byte.
    #[must_use]
    pub fn from_code(code: u8) -> Condition {
        CONDITIONS[usize::from(code & 0x0F)]
    }

    /// Returns the four-bit code of this condition.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns the negation of this condition.
    #[must_use]
    pub fn negate(self) -> Condition {
        Condition::from_code(self.code() ^ 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_round_trip() {
        for condition in Condition::iter() {
            assert_eq!(Condition::from_code(condition.code()), condition);
        }
        assert_eq!(Condition::from_code(0x74), Condition::E);
        assert_eq!(Condition::from_code(0x8F), Condition::G);
    }

    #[test]
    fn negation_is_an_involution() {
        assert_eq!(Condition::E.negate(), Condition::Ne);
        assert_eq!(Condition::L.negate(), Condition::Ge);
        assert_eq!(Condition::Be.negate(), Condition::A);
        for condition in Condition::iter() {
            assert_ne!(condition.negate(), condition);
            assert_eq!(condition.negate().negate(), condition);
        }
    }

    #[test]
    fn names() {
        assert_eq!(Condition::Ae.to_string(), "ae");
        assert_eq!("np".parse::<Condition>().unwrap(), Condition::Np);
    }
}
