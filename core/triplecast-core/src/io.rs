//! Byte-stream plumbing for pass-through responses.

use std::io::{Read, Result, Write};

const CHUNK_SIZE: usize = 4096;

/// Copy a byte stream to a sink in fixed-size chunks, returning the number
/// of bytes copied. Used whenever a backend payload is served without
/// conversion; the fixed buffer bounds memory no matter how large the
/// result is.
pub fn copy_stream(reader: &mut dyn Read, writer: &mut dyn Write) -> Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    Ok(total)
}
