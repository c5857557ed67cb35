/// The high nibble of an Ion binary type descriptor byte.
///
/// ```text
/// ┌──────┬────────────────┬──────────────────────────────────────┐
/// │ Code │ Type           │ Notes                                │
/// ├──────┼────────────────┼──────────────────────────────────────┤
/// │ 0    │ null / NOP pad │ L=15 is null, anything else is a pad │
/// │ 1    │ bool           │ value lives in L                     │
/// │ 2, 3 │ int (+/-)      │ UInt magnitude                       │
/// │ 4    │ float          │ L = 0, 4 or 8                        │
/// │ 5    │ decimal        │ VarInt exponent, Int coefficient     │
/// │ 6    │ timestamp      │                                      │
/// │ 7    │ symbol         │ UInt symbol ID                       │
/// │ 8    │ string         │ UTF-8                                │
/// │ 9    │ clob           │                                      │
/// │ 10   │ blob           │                                      │
/// │ 11   │ list           │                                      │
/// │ 12   │ sexp           │                                      │
/// │ 13   │ struct         │ L=1 is a sorted struct               │
/// │ 14   │ annotation     │ L=0 is the version marker            │
/// │ 15   │ reserved       │ always invalid                       │
/// └──────┴────────────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeCode {
    NullOrNop = 0,
    Bool = 1,
    PositiveInt = 2,
    NegativeInt = 3,
    Float = 4,
    Decimal = 5,
    Timestamp = 6,
    Symbol = 7,
    String = 8,
    Clob = 9,
    Blob = 10,
    List = 11,
    SExp = 12,
    Struct = 13,
    Annotation = 14,
    Reserved = 15,
}

impl TypeCode {
    /// Map a nibble (0..=15) to its type code.
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0 => Self::NullOrNop,
            1 => Self::Bool,
            2 => Self::PositiveInt,
            3 => Self::NegativeInt,
            4 => Self::Float,
            5 => Self::Decimal,
            6 => Self::Timestamp,
            7 => Self::Symbol,
            8 => Self::String,
            9 => Self::Clob,
            10 => Self::Blob,
            11 => Self::List,
            12 => Self::SExp,
            13 => Self::Struct,
            14 => Self::Annotation,
            _ => Self::Reserved,
        }
    }
}

/// Length nibble meaning "a `VarUInt` length follows".
pub const LENGTH_VAR_UINT: u8 = 14;

/// Length nibble meaning "this is a null of the descriptor's type".
pub const LENGTH_NULL: u8 = 15;

/// A decoded type descriptor byte: type code plus length nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub code: TypeCode,
    pub length_code: u8,
}

impl TypeDescriptor {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            code: TypeCode::from_nibble(byte >> 4),
            length_code: byte & 0x0F,
        }
    }

    /// Build the descriptor byte for a body of `len` bytes, or the
    /// `VarUInt`-follows form when `len` does not fit in the nibble.
    pub fn byte_for(code: TypeCode, len: usize) -> u8 {
        let nibble = if len < usize::from(LENGTH_VAR_UINT) {
            len as u8
        } else {
            LENGTH_VAR_UINT
        };
        ((code as u8) << 4) | nibble
    }

    pub fn is_null(self) -> bool {
        self.length_code == LENGTH_NULL
            && !matches!(self.code, TypeCode::Annotation | TypeCode::Reserved)
    }

    /// NOP padding: type 0 with any length other than the null marker.
    pub fn is_nop(self) -> bool {
        self.code == TypeCode::NullOrNop && self.length_code != LENGTH_NULL
    }

    /// The first byte of the version marker, `0xE0`.
    pub fn is_marker(self) -> bool {
        self.code == TypeCode::Annotation && self.length_code == 0
    }

    /// Whether a `VarUInt` length follows the descriptor byte.
    ///
    /// Sorted structs (`0xD1`) always carry one.
    pub fn has_var_uint_length(self) -> bool {
        match self.code {
            TypeCode::Bool | TypeCode::Reserved => false,
            TypeCode::Struct => self.length_code == LENGTH_VAR_UINT || self.length_code == 1,
            _ => self.length_code == LENGTH_VAR_UINT,
        }
    }

    /// Body length encoded in the nibble itself, for descriptors without a
    /// trailing `VarUInt`. Nulls and bools have no body.
    pub fn inline_length(self) -> usize {
        if self.is_null() || self.code == TypeCode::Bool {
            0
        } else {
            usize::from(self.length_code)
        }
    }
}
