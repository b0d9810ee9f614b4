// =============================================================================
// Artifact — single-file container of named arrays
// =============================================================================
//
// A dataset split is stored as one flat file:
//
//   ┌──────────────┬──────────────────────┬───────────────────────┐
//   │ 8 bytes      │ N bytes              │ raw data bytes        │
//   │ header size  │ JSON header (UTF-8)  │ (contiguous, LE)      │
//   │ (u64 LE)     │                      │                       │
//   └──────────────┴──────────────────────┴───────────────────────┘
//
// JSON header example:
//   {
//     "__metadata__": { "format": "rxngraph", "rsmi": "[\"CCO>>CC=O\"]" },
//     "reactant.0.node_attr": {
//       "dtype": "F32",
//       "shape": [1830, 155],
//       "data_offsets": [0, 1134600]
//     }
//   }
//
// This is the safetensors layout, so artifacts can be produced by any tool
// that writes safetensors. The container knows nothing about reactions; the
// `schema` module maps its keys onto packed slots.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use rxngraph_core::{DType, Error, Result, Shape, WithDType};

/// Key of the string-to-string metadata map in the header.
pub const METADATA_KEY: &str = "__metadata__";

/// Upper bound on the JSON header, to reject garbage length prefixes early.
const MAX_HEADER_BYTES: usize = 100_000_000;

/// One array as stored in an artifact: dtype, shape and little-endian bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    dtype: DType,
    shape: Shape,
    data: Vec<u8>,
}

impl RawArray {
    /// Wrap raw little-endian bytes, checking the length against the shape.
    pub fn from_raw(dtype: DType, shape: Shape, data: Vec<u8>) -> Result<Self> {
        let expected = shape
            .elem_count()?
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| Error::Schema(format!("shape {shape} of {dtype} overflows")))?;
        if data.len() != expected {
            return Err(Error::Schema(format!(
                "expected {expected} bytes for shape {shape} of {dtype}, got {}",
                data.len()
            )));
        }
        Ok(Self { dtype, shape, data })
    }

    /// Encode a typed slice. `values.len()` must match the shape.
    pub fn from_slice<T: WithDType>(values: &[T], shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.elem_count()?;
        if values.len() != expected {
            return Err(Error::ElementCountMismatch {
                expected,
                got: values.len(),
                shape,
            });
        }
        let data = encode_le(values, T::DTYPE);
        Ok(Self {
            dtype: T::DTYPE,
            shape,
            data,
        })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of stored elements; the byte length was checked against the
    /// shape when the array was built.
    pub fn elem_count(&self) -> usize {
        self.data.len() / self.dtype.size_in_bytes()
    }

    /// Decode every element as `T`, whatever the stored dtype.
    pub fn to_vec<T: WithDType>(&self) -> Vec<T> {
        decode_le(&self.data, self.dtype)
            .into_iter()
            .map(T::from_f64)
            .collect()
    }

    /// Decode a count or endpoint array.
    ///
    /// The stored dtype must be an integer type and every value must be
    /// non-negative; anything else is a schema violation. Values are
    /// decoded at their stored width, never through a float.
    pub fn to_index_vec(&self) -> Result<Vec<usize>> {
        let raw = &self.data;
        let signed: Vec<i128> = match self.dtype {
            DType::U8 => raw.iter().map(|&v| v as i128).collect(),
            DType::I32 => raw
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as i128)
                .collect(),
            DType::U32 => raw
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as i128)
                .collect(),
            DType::I64 => raw
                .chunks_exact(8)
                .map(|c| {
                    i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as i128
                })
                .collect(),
            other => {
                return Err(Error::Schema(format!(
                    "expected an integer array, found {other}"
                )))
            }
        };
        signed
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                usize::try_from(v).map_err(|_| {
                    Error::Schema(format!("value {v} at position {i} is not a valid index"))
                })
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian element codec
// ─────────────────────────────────────────────────────────────────────────────

fn encode_le<T: WithDType>(values: &[T], dtype: DType) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * dtype.size_in_bytes());
    for v in values {
        let v = v.to_f64();
        match dtype {
            DType::F16 => out.extend_from_slice(&half::f16::from_f64(v).to_le_bytes()),
            DType::BF16 => out.extend_from_slice(&half::bf16::from_f64(v).to_le_bytes()),
            DType::F32 => out.extend_from_slice(&(v as f32).to_le_bytes()),
            DType::F64 => out.extend_from_slice(&v.to_le_bytes()),
            DType::U8 => out.push(v as u8),
            DType::I32 => out.extend_from_slice(&(v as i32).to_le_bytes()),
            DType::U32 => out.extend_from_slice(&(v as u32).to_le_bytes()),
            DType::I64 => out.extend_from_slice(&(v as i64).to_le_bytes()),
        }
    }
    out
}

fn decode_le(raw: &[u8], dtype: DType) -> Vec<f64> {
    match dtype {
        DType::F16 => raw
            .chunks_exact(2)
            .map(|c| half::f16::from_le_bytes([c[0], c[1]]).to_f64())
            .collect(),
        DType::BF16 => raw
            .chunks_exact(2)
            .map(|c| half::bf16::from_le_bytes([c[0], c[1]]).to_f64())
            .collect(),
        DType::F32 => raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        DType::F64 => raw
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect(),
        DType::U8 => raw.iter().map(|&v| v as f64).collect(),
        DType::I32 => raw
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        DType::U32 => raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        DType::I64 => raw
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f64)
            .collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct HeaderEntry {
    dtype: String,
    shape: Vec<usize>,
    data_offsets: [usize; 2],
}

/// Split the raw header object into metadata and array entries.
fn parse_header(
    json_str: &str,
) -> Result<(BTreeMap<String, String>, BTreeMap<String, HeaderEntry>)> {
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Schema(format!("invalid JSON header: {e}")))?;

    let serde_json::Value::Object(obj) = value else {
        return Err(Error::Schema("header is not a JSON object".to_string()));
    };

    let mut metadata = BTreeMap::new();
    let mut entries = BTreeMap::new();
    for (key, val) in obj {
        if key == METADATA_KEY {
            metadata = serde_json::from_value(val)
                .map_err(|e| Error::Schema(format!("invalid {METADATA_KEY}: {e}")))?;
            continue;
        }
        let entry: HeaderEntry = serde_json::from_value(val)
            .map_err(|e| Error::Schema(format!("entry '{key}': {e}")))?;
        entries.insert(key, entry);
    }
    Ok((metadata, entries))
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifact
// ─────────────────────────────────────────────────────────────────────────────

/// An in-memory artifact: named arrays plus a string metadata map.
///
/// Arrays are keyed in a `BTreeMap`, so serialization is deterministic:
/// the same contents always produce the same bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifact {
    arrays: BTreeMap<String, RawArray>,
    metadata: BTreeMap<String, String>,
}

impl Artifact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `values` under `name`, replacing any previous array.
    pub fn insert<T: WithDType>(
        &mut self,
        name: impl Into<String>,
        values: &[T],
        shape: impl Into<Shape>,
    ) -> Result<()> {
        let array = RawArray::from_slice(values, shape)?;
        self.arrays.insert(name.into(), array);
        Ok(())
    }

    pub fn insert_raw(&mut self, name: impl Into<String>, array: RawArray) {
        self.arrays.insert(name.into(), array);
    }

    /// Array by name; a missing key is a schema error.
    pub fn get(&self, name: &str) -> Result<&RawArray> {
        self.arrays
            .get(name)
            .ok_or_else(|| Error::Schema(format!("missing array '{name}'")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    /// Array names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Serialize into a writer.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<()> {
        let mut header = serde_json::Map::new();
        if !self.metadata.is_empty() {
            header.insert(
                METADATA_KEY.to_string(),
                serde_json::to_value(&self.metadata).map_err(json_err)?,
            );
        }

        let mut offset = 0usize;
        for (name, array) in &self.arrays {
            let end = offset + array.data.len();
            let entry = HeaderEntry {
                dtype: array.dtype.tag().to_string(),
                shape: array.shape.dims().to_vec(),
                data_offsets: [offset, end],
            };
            header.insert(name.clone(), serde_json::to_value(entry).map_err(json_err)?);
            offset = end;
        }

        let header_bytes = serde_json::to_vec(&header).map_err(json_err)?;
        writer.write_all(&(header_bytes.len() as u64).to_le_bytes())?;
        writer.write_all(&header_bytes)?;
        for array in self.arrays.values() {
            writer.write_all(&array.data)?;
        }
        Ok(())
    }

    /// Deserialize from a reader.
    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut size_buf = [0u8; 8];
        reader.read_exact(&mut size_buf)?;
        let header_size = u64::from_le_bytes(size_buf) as usize;
        if header_size > MAX_HEADER_BYTES {
            return Err(Error::Schema(format!(
                "header size {header_size} bytes is unreasonably large"
            )));
        }

        let mut header_bytes = vec![0u8; header_size];
        reader.read_exact(&mut header_bytes)?;
        let header_str = std::str::from_utf8(&header_bytes)
            .map_err(|e| Error::Schema(format!("invalid UTF-8 header: {e}")))?;
        let (metadata, entries) = parse_header(header_str)?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;

        let mut arrays = BTreeMap::new();
        for (name, entry) in entries {
            let [start, end] = entry.data_offsets;
            if start > end || end > payload.len() {
                return Err(Error::Schema(format!(
                    "array '{name}' offsets {start}..{end} exceed payload of {} bytes",
                    payload.len()
                )));
            }
            let dtype = DType::from_tag(&entry.dtype)?;
            let raw = payload[start..end].to_vec();
            let array = RawArray::from_raw(dtype, Shape::new(entry.shape), raw)
                .map_err(|e| Error::Schema(format!("array '{name}': {e}")))?;
            arrays.insert(name, array);
        }

        Ok(Self { arrays, metadata })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = std::io::Cursor::new(data);
        Self::read_from(&mut cursor)
    }

    /// Write the artifact to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read an artifact from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

fn json_err(e: serde_json::Error) -> Error {
    Error::Schema(format!("header serialization failed: {e}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
