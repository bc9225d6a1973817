//! S-records, as generated by `srec -S -R -A3` for the DSP563xx.
//!
//! Only three record types matter for this dialect:
//! - `S0` selects the memory space the following data records belong to.
//! - `S2` carries data at a 24-bit word address.
//! - `S8` marks the end of a file.
//!
//! Everything else is classified as [`Record::Unsupported`]. Checksums are not validated.

use crate::{
    hex::{self, HexInt},
    packet::ADDRESS_MASK,
    space::MemorySpace,
};
use easyerr::{Error, ResultExt};
use std::io::BufRead;

/// Offset of the memory space code in an `S0` record.
const SPACE_OFFSET: usize = 6;
/// Offset of the byte count in an `S2` record.
const COUNT_OFFSET: usize = 2;
/// Offset of the address in an `S2` record.
const ADDRESS_OFFSET: usize = 4;
/// Offset of the payload in an `S2` record.
const PAYLOAD_OFFSET: usize = 10;
/// Bytes counted by the byte count of an `S2` record which are not payload: the 3 address bytes
/// and the checksum.
const RECORD_OVERHEAD: u8 = 4;

/// Splits `text` into its hex digit pairs.
pub(crate) fn hex_pairs(text: &str) -> impl Iterator<Item = &str> {
    text.as_bytes()
        .chunks_exact(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
}

/// The contents of an `S2` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    /// Declared length of the record: address, payload and checksum bytes.
    pub byte_count: u8,
    /// Word address of the first payload byte. Always fits in 24 bits.
    address: u32,
    /// Payload as hex digit pairs, exactly as they appear in the input.
    payload: String,
}

impl DataRecord {
    /// Creates a data record carrying `payload` at `address`.
    pub fn new(address: u32, payload: &[u8]) -> Self {
        let byte_count =
            u8::try_from(payload.len() + RECORD_OVERHEAD as usize).unwrap_or(u8::MAX);
        let payload = payload.iter().map(|byte| format!("{byte:02X}")).collect();

        Self {
            byte_count,
            address: address & ADDRESS_MASK,
            payload,
        }
    }

    /// Word address of the first payload byte.
    #[inline]
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The payload as hex text, two digits per byte.
    #[inline]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The payload as hex digit pairs, one per byte.
    pub fn payload_bytes(&self) -> impl Iterator<Item = &str> {
        hex_pairs(&self.payload)
    }

    /// Number of payload bytes actually present.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len() / 2
    }

    /// Number of payload bytes the byte count declares.
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.byte_count.saturating_sub(RECORD_OVERHEAD) as usize
    }

    /// Whether the record holds less payload than it declares.
    pub fn is_truncated(&self) -> bool {
        self.payload_len() < self.declared_len()
    }
}

/// A single S-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// `S0`: selects the memory space of the following data records.
    MemorySpaceSwitch { space: MemorySpace },
    /// `S2`: data at a 24-bit address.
    Data(DataRecord),
    /// `S8`: end of file.
    EndOfFile,
    /// Any other record.
    Unsupported,
}

/// Fixed position fields of a record token.
struct Fields<'a> {
    token: &'a [u8],
}

impl<'a> Fields<'a> {
    /// Returns the field at `offset`, cut short if the token ends before it does.
    fn get(&self, offset: usize, len: usize) -> &'a [u8] {
        let start = offset.min(self.token.len());
        let end = offset.saturating_add(len).min(self.token.len());
        &self.token[start..end]
    }

    /// Decodes the `len` digit hex field at `offset`.
    fn decode<T: HexInt>(&self, name: &str, offset: usize, len: usize) -> T {
        let field = self.get(offset, len);
        if field.len() < len {
            tracing::warn!(
                "record ends inside its {name} field ({} of {len} digits present)",
                field.len()
            );
        }

        hex::atoh(field)
    }
}

impl Record {
    /// Parses a single record token. Parsing never fails: malformed records are decoded as far as
    /// possible and the problems are reported as warnings.
    pub fn parse(token: impl AsRef<[u8]>) -> Self {
        let fields = Fields {
            token: token.as_ref(),
        };

        match fields.get(0, 2) {
            b"S0" => {
                let code = fields.decode::<u8>("memory space", SPACE_OFFSET, 2);
                let space = MemorySpace::from_code(code);
                if space == MemorySpace::Unknown {
                    tracing::warn!("S0 record selects unknown memory space {code:02X}");
                }

                Self::MemorySpaceSwitch { space }
            }
            b"S2" => Self::Data(parse_data(&fields)),
            b"S8" => Self::EndOfFile,
            _ => Self::Unsupported,
        }
    }
}

fn parse_data(fields: &Fields) -> DataRecord {
    let byte_count = fields.decode::<u8>("byte count", COUNT_OFFSET, 2);
    let address = fields.decode::<u32>("address", ADDRESS_OFFSET, 6);

    let declared = byte_count.saturating_sub(RECORD_OVERHEAD) as usize;
    let raw = fields.get(PAYLOAD_OFFSET, declared * 2);
    let truncated = raw.len() < declared * 2;

    let digits = raw.iter().take_while(|c| c.is_ascii_hexdigit()).count();
    if digits < raw.len() {
        tracing::warn!(
            "payload of record at {address:06X} has a non-hex character at digit {digits}"
        );
    }

    let mut even = digits & !1;
    if even < digits {
        tracing::warn!("payload of record at {address:06X} ends with half a byte, dropping it");
    }

    if truncated {
        // the last pair of a short record is its checksum
        even = even.saturating_sub(2);
        tracing::warn!(
            "record at {address:06X} declares {declared} payload bytes but only holds {}",
            even / 2
        );
    }

    DataRecord {
        byte_count,
        address,
        payload: raw[..even].iter().copied().map(char::from).collect(),
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io { source: std::io::Error },
}

/// Reads records out of S-record text.
///
/// The text is split into whitespace separated tokens, each of which is a record. Iteration ends
/// at the end of the text or at the first I/O error.
pub struct RecordReader<R> {
    reader: R,
    buffer: Vec<u8>,
    pending: std::vec::IntoIter<Vec<u8>>,
    line: usize,
    done: bool,
}

impl<R> RecordReader<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            pending: Vec::new().into_iter(),
            line: 0,
            done: false,
        }
    }

    /// The line the most recently read record came from, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Reads the next line into the pending tokens. Returns `false` at the end of the text.
    fn fill(&mut self) -> Result<bool, ReadError> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .context(ReadCtx::Io)?;

        if read == 0 {
            return Ok(false);
        }

        self.line += 1;
        self.pending = self
            .buffer
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty())
            .map(<[u8]>::to_vec)
            .collect::<Vec<_>>()
            .into_iter();

        Ok(true)
    }
}

impl<R> Iterator for RecordReader<R>
where
    R: BufRead,
{
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if let Some(token) = self.pending.next() {
                let _span = tracing::debug_span!("record", line = self.line).entered();
                return Some(Ok(Record::parse(token)));
            }

            match self.fill() {
                Ok(true) => (),
                Ok(false) => self.done = true,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }
}

impl<R> std::iter::FusedIterator for RecordReader<R> where R: BufRead {}
