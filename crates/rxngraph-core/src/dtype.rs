use std::fmt;

// DType — element types an artifact array may carry
//
// Upstream feature extraction writes counts and endpoints as integers and
// attributes as floats, at whatever width the producer chose:
//
//   F16  — 16-bit IEEE half float, for compact attribute pools
//   BF16 — 16-bit brain float
//   F32  — 32-bit float, the element type graphs are built with
//   F64  — 64-bit float, typical for labels
//   U8   — unsigned byte, for one-hot style features
//   I32  — signed 32-bit int, for endpoint lists
//   U32  — unsigned 32-bit int, for endpoint lists
//   I64  — signed 64-bit int, for counts (NumPy default integer)

/// Enum of all supported element data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F16,
    BF16,
    F32,
    F64,
    U8,
    I32,
    U32,
    I64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F16 | DType::BF16 => 2,
            DType::F32 | DType::I32 | DType::U32 => 4,
            DType::F64 | DType::I64 => 8,
            DType::U8 => 1,
        }
    }

    /// Whether this dtype is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F16 | DType::BF16 | DType::F32 | DType::F64)
    }

    /// Whether this dtype is an integer type (usable for counts and endpoints).
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// The tag written into artifact headers.
    pub fn tag(&self) -> &'static str {
        match self {
            DType::F16 => "F16",
            DType::BF16 => "BF16",
            DType::F32 => "F32",
            DType::F64 => "F64",
            DType::U8 => "U8",
            DType::I32 => "I32",
            DType::U32 => "U32",
            DType::I64 => "I64",
        }
    }

    /// Parse an artifact header tag. `BOOL` is read as `U8`.
    pub fn from_tag(tag: &str) -> crate::Result<Self> {
        match tag {
            "F16" => Ok(DType::F16),
            "BF16" => Ok(DType::BF16),
            "F32" => Ok(DType::F32),
            "F64" => Ok(DType::F64),
            "U8" | "BOOL" => Ok(DType::U8),
            "I32" => Ok(DType::I32),
            "U32" => Ok(DType::U32),
            "I64" => Ok(DType::I64),
            _ => Err(crate::Error::Schema(format!("unsupported dtype tag: {tag}"))),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::U8 => "u8",
            DType::I32 => "i32",
            DType::U32 => "u32",
            DType::I64 => "i64",
        };
        write!(f, "{}", s)
    }
}

// WithDType — bridge between Rust element types and DType
//
// Lets the artifact codec write `&[T]` without the caller naming a dtype,
// and read any stored dtype back as the `T` the caller asks for.

/// Trait implemented by Rust types that can be stored in an artifact array.
pub trait WithDType: Copy + Send + Sync + 'static + std::fmt::Debug {
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Convert this value to f64 (for generic numeric code).
    fn to_f64(self) -> f64;

    /// Create a value of this type from f64.
    fn from_f64(v: f64) -> Self;
}

impl WithDType for f32 {
    const DTYPE: DType = DType::F32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl WithDType for f64 {
    const DTYPE: DType = DType::F64;
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl WithDType for half::f16 {
    const DTYPE: DType = DType::F16;
    fn to_f64(self) -> f64 {
        self.to_f32() as f64
    }
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

impl WithDType for half::bf16 {
    const DTYPE: DType = DType::BF16;
    fn to_f64(self) -> f64 {
        self.to_f32() as f64
    }
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

impl WithDType for u8 {
    const DTYPE: DType = DType::U8;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as u8
    }
}

impl WithDType for i32 {
    const DTYPE: DType = DType::I32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32
    }
}

impl WithDType for u32 {
    const DTYPE: DType = DType::U32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as u32
    }
}

impl WithDType for i64 {
    const DTYPE: DType = DType::I64;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i64
    }
}
