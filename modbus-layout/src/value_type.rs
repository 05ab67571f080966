use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::register::ADDRESS_SPACE;

/// Width of a single Modbus register in bits.
pub const REGISTER_BITS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid type string `{text}`: {reason}")]
    InvalidTypeSyntax { text: String, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Bool,
    Char,
}

impl BaseKind {
    pub const ALL: [BaseKind; 12] = [
        BaseKind::Int8,
        BaseKind::UInt8,
        BaseKind::Int16,
        BaseKind::UInt16,
        BaseKind::Int32,
        BaseKind::UInt32,
        BaseKind::Int64,
        BaseKind::UInt64,
        BaseKind::Float32,
        BaseKind::Float64,
        BaseKind::Bool,
        BaseKind::Char,
    ];

    /// Storage width of one element. `bool` takes a whole byte.
    pub fn bit_width(&self) -> u64 {
        match self {
            BaseKind::Int8 | BaseKind::UInt8 | BaseKind::Bool | BaseKind::Char => 8,
            BaseKind::Int16 | BaseKind::UInt16 => 16,
            BaseKind::Int32 | BaseKind::UInt32 | BaseKind::Float32 => 32,
            BaseKind::Int64 | BaseKind::UInt64 | BaseKind::Float64 => 64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseKind::Int8 => "int8",
            BaseKind::UInt8 => "uint8",
            BaseKind::Int16 => "int16",
            BaseKind::UInt16 => "uint16",
            BaseKind::Int32 => "int32",
            BaseKind::UInt32 => "uint32",
            BaseKind::Int64 => "int64",
            BaseKind::UInt64 => "uint64",
            BaseKind::Float32 => "float32",
            BaseKind::Float64 => "float64",
            BaseKind::Bool => "bool",
            BaseKind::Char => "char",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar or one-dimensional array data type of a register field.
///
/// The textual form is `kind` or `kind[N]`, e.g. `uint16` or `char[10]`.
/// A value always occupies whole 16-bit registers, so `char[1]` and `char[2]`
/// both take one register while `char[3]` takes two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    kind: BaseKind,
    dimension: u32,
}

impl ValueType {
    pub fn new(kind: BaseKind, dimension: u32) -> Result<Self, TypeError> {
        Self::checked(kind, dimension).map_err(|reason| TypeError::InvalidTypeSyntax {
            text: format!("{kind}[{dimension}]"),
            reason,
        })
    }

    pub fn scalar(kind: BaseKind) -> Self {
        Self { kind, dimension: 1 }
    }

    fn checked(kind: BaseKind, dimension: u32) -> Result<Self, &'static str> {
        if dimension < 1 {
            return Err("array dimension must be at least 1");
        }
        let value_type = Self { kind, dimension };
        if value_type.total_bits().div_ceil(REGISTER_BITS) > u64::from(ADDRESS_SPACE) {
            return Err("array does not fit into the register space");
        }
        Ok(value_type)
    }

    pub fn kind(&self) -> BaseKind {
        self.kind
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn total_bits(&self) -> u64 {
        self.kind.bit_width() * u64::from(self.dimension)
    }

    /// Number of 16-bit registers needed to hold the value (rounded up).
    pub fn register_count(&self) -> u32 {
        // bounded by ADDRESS_SPACE at construction
        self.total_bits().div_ceil(REGISTER_BITS) as u32
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dimension == 1 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}[{}]", self.kind, self.dimension)
        }
    }
}

impl FromStr for ValueType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TypeError::InvalidTypeSyntax {
            text: s.to_string(),
            reason,
        };

        let (kind, dimension) = match s.split_once('[') {
            None => (s, None),
            Some((kind, rest)) => {
                let digits = rest
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("unterminated array dimension"))?;
                (kind, Some(digits))
            }
        };

        let kind = BaseKind::from_name(kind).ok_or_else(|| invalid("unknown base type"))?;
        let dimension = match dimension {
            None => 1,
            Some(digits) => {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("array dimension is not a positive integer"));
                }
                digits
                    .parse::<u32>()
                    .map_err(|_| invalid("array dimension is too large"))?
            }
        };

        Self::checked(kind, dimension).map_err(invalid)
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
