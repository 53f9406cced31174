//! 64-bit integer transcoding.
//!
//! Signedness comes from the field declaration. Reading the same two words
//! as signed or unsigned gives different numbers above 2^63, so the
//! converter never guesses.

use super::{ConverterKind, ValueConverter};
use crate::error::{Error, Result};
use crate::value::{Long, Value};
use num_bigint::BigInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

#[derive(Debug, Clone, Copy)]
pub struct Int64Converter {
    signedness: Signedness,
}

impl Int64Converter {
    pub fn new(signedness: Signedness) -> Self {
        Self { signedness }
    }

    pub fn signed() -> Self {
        Self::new(Signedness::Signed)
    }

    pub fn unsigned() -> Self {
        Self::new(Signedness::Unsigned)
    }

    pub fn long_to_bigint(&self, long: Long) -> BigInt {
        match self.signedness {
            Signedness::Signed => BigInt::from(long.as_i64()),
            Signedness::Unsigned => BigInt::from(long.as_u64()),
        }
    }

    pub fn bigint_to_long(&self, n: &BigInt) -> Result<Long> {
        let out_of_range = || Error::InvalidInt64(format!("{n} is out of range for {}", self.type_label()));
        match self.signedness {
            Signedness::Signed => i64::try_from(n).map(Long::from_i64).map_err(|_| out_of_range()),
            Signedness::Unsigned => u64::try_from(n).map(Long::from_u64).map_err(|_| out_of_range()),
        }
    }

    fn parse_decimal(&self, s: &str) -> Result<BigInt> {
        let n: BigInt = s
            .parse()
            .map_err(|_| Error::InvalidInt64(format!("'{s}' is not a decimal integer")))?;
        // Only the canonical spelling is accepted: no sign on positives, no padding.
        if n.to_string() != s {
            return Err(Error::InvalidInt64(format!("'{s}' is not in canonical decimal form")));
        }
        Ok(n)
    }

    fn type_label(&self) -> &'static str {
        match self.signedness {
            Signedness::Signed => "int64",
            Signedness::Unsigned => "uint64",
        }
    }
}

impl ValueConverter for Int64Converter {
    fn to_domain(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Long(long) => Ok(Value::BigInt(self.long_to_bigint(long))),
            other => Err(Error::InvalidInt64(format!(
                "expected a wire {}, got {}",
                self.type_label(),
                other.type_name()
            ))),
        }
    }

    fn to_wire(&self, value: Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::BigInt(n) => self.bigint_to_long(&n).map(Value::Long),
            Value::String(s) => {
                let n = self.parse_decimal(&s)?;
                self.bigint_to_long(&n).map(Value::Long)
            }
            other => Err(Error::InvalidInt64(format!(
                "expected a bigint or decimal string for {}, got {}",
                self.type_label(),
                other.type_name()
            ))),
        }
    }

    fn kind(&self) -> ConverterKind {
        ConverterKind::Int64 {
            signed: self.signedness == Signedness::Signed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_max() {
        let conv = Int64Converter::unsigned();
        let wire = Value::Long(Long::from_u64(0xFFFF_FFFF_FFFF_FFFF));
        let domain = conv.to_domain(wire.clone()).unwrap();
        assert_eq!(domain, Value::BigInt("18446744073709551615".parse().unwrap()));
        assert_eq!(conv.to_wire(domain).unwrap(), wire);
    }

    #[test]
    fn test_same_bits_differ_by_signedness() {
        let bits = Long::from_u64(0xFEDC_BA98_7654_3210);
        let unsigned = Int64Converter::unsigned().long_to_bigint(bits);
        let signed = Int64Converter::signed().long_to_bigint(bits);
        assert_eq!(unsigned, BigInt::from(0xFEDC_BA98_7654_3210u64));
        assert_eq!(signed, BigInt::from(0xFEDC_BA98_7654_3210u64 as i64));
        assert_ne!(unsigned, signed);
    }

    #[test]
    fn test_signed_negative_round_trip() {
        let conv = Int64Converter::signed();
        let n = BigInt::from(-0x7654_3210_FEDC_BA98i64);
        let wire = conv.to_wire(Value::BigInt(n.clone())).unwrap();
        assert_eq!(conv.to_domain(wire).unwrap(), Value::BigInt(n));
    }

    #[test]
    fn test_decimal_string_accepted() {
        let conv = Int64Converter::signed();
        let wire = conv.to_wire(Value::from("-42")).unwrap();
        assert_eq!(wire, Value::Long(Long::from_i64(-42)));
    }

    #[test]
    fn test_non_canonical_string_rejected() {
        let conv = Int64Converter::unsigned();
        assert!(conv.to_wire(Value::from("+42")).is_err());
        assert!(conv.to_wire(Value::from("007")).is_err());
        assert!(conv.to_wire(Value::from("forty-two")).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Int64Converter::unsigned()
            .to_wire(Value::BigInt(BigInt::from(-1)))
            .is_err());
        assert!(Int64Converter::signed()
            .to_wire(Value::BigInt(BigInt::from(u64::MAX)))
            .is_err());
    }

    #[test]
    fn test_other_shapes_rejected() {
        let conv = Int64Converter::signed();
        assert!(matches!(conv.to_wire(Value::Double(1.0)), Err(Error::InvalidInt64(_))));
        assert!(matches!(conv.to_domain(Value::from("1")), Err(Error::InvalidInt64(_))));
        assert_eq!(conv.to_wire(Value::Null).unwrap(), Value::Null);
    }
}
