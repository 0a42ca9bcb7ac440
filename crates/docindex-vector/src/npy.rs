//! Minimal NumPy `.npy` codec for dense 2-D `f32` matrices.
//!
//! Writes format version 1.0 with a `<f4`, C-order header. Reads versions
//! 1.0 to 3.0 and accepts `<f4` or `<f8` little-endian data (the latter is
//! narrowed to `f32`).

use std::io::{Read, Write};

use ndarray::Array2;

use docindex_core::error::{Error, Result};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

pub fn write_matrix<W: Write>(mut out: W, matrix: &Array2<f32>) -> Result<()> {
    let (rows, cols) = matrix.dim();
    let dict = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': ({rows}, {cols}), }}");
    // magic + version + u16 length, then the dict padded so data starts aligned
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let pad = (ALIGN - unpadded % ALIGN) % ALIGN;
    let header_len = u16::try_from(dict.len() + pad + 1)
        .map_err(|_| Error::Operation(format!("npy header too long for shape ({rows}, {cols})")))?;

    out.write_all(MAGIC)?;
    out.write_all(&[1, 0])?;
    out.write_all(&header_len.to_le_bytes())?;
    out.write_all(dict.as_bytes())?;
    out.write_all(&vec![b' '; pad])?;
    out.write_all(b"\n")?;
    for value in matrix.iter() {
        out.write_all(&value.to_le_bytes())?;
    }
    out.flush()?;
    Ok(())
}

pub fn read_matrix<R: Read>(mut input: R) -> Result<Array2<f32>> {
    let mut prefix = [0u8; 8];
    input.read_exact(&mut prefix).map_err(|_| corrupt("file shorter than npy preamble"))?;
    if &prefix[..6] != MAGIC {
        return Err(corrupt("missing npy magic"));
    }
    let header_len = match prefix[6] {
        1 => {
            let mut len = [0u8; 2];
            input.read_exact(&mut len).map_err(|_| corrupt("truncated header length"))?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            input.read_exact(&mut len).map_err(|_| corrupt("truncated header length"))?;
            u32::from_le_bytes(len) as usize
        }
        v => return Err(corrupt(&format!("unsupported npy version {v}"))),
    };
    let mut header = vec![0u8; header_len];
    input.read_exact(&mut header).map_err(|_| corrupt("truncated header"))?;
    let header = std::str::from_utf8(&header).map_err(|_| corrupt("header is not text"))?;
    let Header { descr, fortran_order, shape } = parse_header(header)?;

    if fortran_order {
        return Err(corrupt("fortran-ordered matrices are not supported"));
    }
    let &[rows, cols] = shape.as_slice() else {
        return Err(corrupt(&format!("expected a 2-D matrix, got shape {shape:?}")));
    };
    let item = match descr.as_str() {
        "<f4" => 4,
        "<f8" => 8,
        other => return Err(corrupt(&format!("unsupported dtype {other}"))),
    };

    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(item))
        .ok_or_else(|| corrupt("shape overflows"))?;
    // the header is untrusted: never allocate more than the payload holds
    let mut data = Vec::new();
    input.take((expected as u64).saturating_add(1)).read_to_end(&mut data)?;
    if data.len() != expected {
        return Err(corrupt(&format!(
            "data holds {} bytes, shape ({rows}, {cols}) needs {expected}",
            data.len()
        )));
    }

    let values: Vec<f32> = if item == 4 {
        data.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect()
    } else {
        data.chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
            .collect()
    };
    Array2::from_shape_vec((rows, cols), values).map_err(|e| corrupt(&e.to_string()))
}

struct Header {
    descr: String,
    fortran_order: bool,
    shape: Vec<usize>,
}

fn parse_header(header: &str) -> Result<Header> {
    let descr = value_after(header, "'descr'")
        .and_then(|v| v.strip_prefix('\''))
        .and_then(|v| v.split('\'').next())
        .ok_or_else(|| corrupt("header lacks descr"))?
        .to_string();
    let fortran_order = match value_after(header, "'fortran_order'") {
        Some(v) if v.starts_with("False") => false,
        Some(v) if v.starts_with("True") => true,
        _ => return Err(corrupt("header lacks fortran_order")),
    };
    let shape = value_after(header, "'shape'")
        .and_then(|v| v.strip_prefix('('))
        .and_then(|v| v.split(')').next())
        .ok_or_else(|| corrupt("header lacks shape"))?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('L').parse::<usize>().map_err(|_| corrupt(&format!("bad dimension {s:?}"))))
        .collect::<Result<Vec<_>>>()?;
    Ok(Header { descr, fortran_order, shape })
}

/// Text following `key:` with leading whitespace removed.
fn value_after<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let rest = &header[header.find(key)? + key.len()..];
    Some(rest.trim_start().strip_prefix(':')?.trim_start())
}

fn corrupt(msg: &str) -> Error {
    Error::CorruptIndex(format!("matrix: {msg}"))
}
