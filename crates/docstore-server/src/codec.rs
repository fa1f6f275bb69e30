//! Newline-delimited JSON framing over blocking streams.

use crate::protocol::{Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{self, BufRead, Write};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Read one framed message. Returns `Ok(None)` on a clean end of stream.
///
/// Blank lines are skipped. A line that is not valid JSON for `T` yields an
/// `InvalidData` error.
pub fn read_message<R, T>(reader: &mut R) -> io::Result<Option<T>>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(LINE_ENDINGS);
        if trimmed.trim().is_empty() {
            continue;
        }

        return decode(trimmed).map(Some);
    }
}

/// Encode `message` as one line and flush it.
pub fn write_message<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut encoded = serde_json::to_vec(message).map_err(to_io_error)?;
    encoded.push(b'\n');
    writer.write_all(&encoded)?;
    writer.flush()
}

pub fn decode<T: DeserializeOwned>(line: &str) -> io::Result<T> {
    serde_json::from_str(line).map_err(to_io_error)
}

pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Option<Request>> {
    read_message(reader)
}

pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    write_message(writer, response)
}

fn to_io_error(err: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
