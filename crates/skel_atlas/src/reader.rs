//! Line cursor over atlas text.
//!
//! Lines are split on CR, LF and CRLF. Empty lines are kept because a blank
//! line ends the current page. Record lines have the shape `key: value` or
//! `key: a, b, c, d`; the key itself is never inspected.

use std::str::FromStr;

use crate::error::AtlasError;

/// Upper bound on comma separated fields returned by [`LineReader::read_tuple`].
pub const TUPLE_CAPACITY: usize = 4;

/// Reusable field buffer for [`LineReader::read_tuple`].
pub type Tuple = [String; TUPLE_CAPACITY];

#[derive(Debug, Clone)]
pub struct LineReader {
    text: String,
    lines: Vec<(usize, usize)>,
    index: usize,
}

impl LineReader {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = line_spans(&text);
        Self {
            text,
            lines,
            index: 0,
        }
    }

    /// Next raw line, or `None` once every line has been consumed.
    pub fn read_line(&mut self) -> Option<&str> {
        let (start, end) = *self.lines.get(self.index)?;
        self.index += 1;
        Some(&self.text[start..end])
    }

    /// Trimmed text after the first colon of the next line.
    pub fn read_value(&mut self) -> Result<&str, AtlasError> {
        let line = self.read_record_line()?;
        let colon = find_colon(line)?;
        Ok(line[colon + 1..].trim())
    }

    /// Splits the text after the colon on commas into at most
    /// [`TUPLE_CAPACITY`] trimmed fields and returns how many were written.
    ///
    /// The last field receives the remainder of the line, commas included.
    /// Slots past the returned count keep whatever they held before, so a
    /// caller reusing one buffer must only look at the first `count` fields.
    pub fn read_tuple(&mut self, tuple: &mut Tuple) -> Result<usize, AtlasError> {
        let line = self.read_record_line()?;
        let colon = find_colon(line)?;
        let mut rest = &line[colon + 1..];
        let mut count = 0;
        while count < TUPLE_CAPACITY - 1 {
            let Some(comma) = rest.find(',') else {
                break;
            };
            set_field(&mut tuple[count], &rest[..comma]);
            rest = &rest[comma + 1..];
            count += 1;
        }
        set_field(&mut tuple[count], rest);
        Ok(count + 1)
    }

    /// 1-based number of the line most recently returned.
    pub fn line_number(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.lines.len()
    }

    fn read_record_line(&mut self) -> Result<&str, AtlasError> {
        self.read_line().ok_or(AtlasError::UnexpectedEndOfInput)
    }
}

fn set_field(slot: &mut String, raw: &str) {
    slot.clear();
    slot.push_str(raw.trim());
}

fn find_colon(line: &str) -> Result<usize, AtlasError> {
    line.find(':').ok_or_else(|| AtlasError::InvalidLine {
        line: line.to_string(),
    })
}

/// Byte ranges of every line, terminators excluded.
fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                spans.push((start, i));
                i += 1;
                start = i;
            }
            b'\r' => {
                spans.push((start, i));
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    spans.push((start, bytes.len()));
    spans
}

/// Parses an integer field. Packers sometimes write `2.0` or `2px`; the
/// leading integer digits are used in that case.
pub(crate) fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, AtlasError> {
    value
        .parse::<T>()
        .or_else(|_| integer_prefix(value).parse::<T>())
        .map_err(|_| AtlasError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn integer_prefix(value: &str) -> &str {
    let sign = usize::from(value.starts_with(['-', '+']));
    let digits = value[sign..]
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    &value[..sign + digits]
}

pub(crate) fn parse_float(field: &'static str, value: &str) -> Result<f64, AtlasError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(AtlasError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}
