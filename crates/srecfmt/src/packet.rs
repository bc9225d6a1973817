//! Splitting of data records into PPP packets and their rendering as C arrays.
//!
//! Every packet starts with a 3 byte PPP header (memory space selector, a reserved zero byte and
//! the number of words in the packet) followed by the 3 byte word address the payload should be
//! written to. The payload is a sequence of 24-bit words.

use crate::{
    record::{DataRecord, hex_pairs},
    space::MemorySpace,
};
use easyerr::{Error, ResultExt};
use std::{fmt, io::Write, str::FromStr};

/// Length of the PPP header and address which precede the payload of every packet.
pub const PACKET_OVERHEAD: u32 = 6;
/// Length of a DSP563xx word, in bytes.
pub const WORD_LEN: usize = 3;
/// Addresses are 24 bits wide.
pub const ADDRESS_MASK: u32 = 0xFF_FFFF;

#[derive(Debug, Error)]
pub enum PacketSizeError {
    #[error(transparent)]
    Invalid { source: std::num::ParseIntError },
    #[error("packet size {f0} is not a multiple of 3")]
    NotMultipleOfThree(u32),
    #[error("packet size {f0} is smaller than the minimum of 9")]
    TooSmall(u32),
    #[error("packet size {f0} is larger than the maximum of 771")]
    TooLarge(u32),
}

/// Maximum size of a packet, in bytes, including its header.
///
/// A packet size is always a multiple of [`WORD_LEN`] with room for at least one word, and small
/// enough for its word count to fit in the one byte of the PPP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketSize(u32);

impl PacketSize {
    pub const MIN: u32 = PACKET_OVERHEAD + WORD_LEN as u32;
    pub const MAX: u32 = PACKET_OVERHEAD + 255 * WORD_LEN as u32;
    pub const DEFAULT: Self = Self(18);

    pub fn new(size: u32) -> Result<Self, PacketSizeError> {
        if size % WORD_LEN as u32 != 0 {
            return Err(PacketSizeError::NotMultipleOfThree(size));
        }

        if size < Self::MIN {
            return Err(PacketSizeError::TooSmall(size));
        }

        if size > Self::MAX {
            return Err(PacketSizeError::TooLarge(size));
        }

        Ok(Self(size))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// How many payload bytes fit in a single packet.
    #[inline]
    pub fn payload_capacity(self) -> usize {
        (self.0 - PACKET_OVERHEAD) as usize
    }
}

impl Default for PacketSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PacketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PacketSize {
    type Err = PacketSizeError;

    /// Parses a decimal size, or a hex one if prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let size = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else {
            s.parse()
        };

        Self::new(size.context(PacketSizeCtx::Invalid)?)
    }
}

/// A single packet of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// Word address of the first payload byte.
    pub address: u32,
    /// Number of words in the payload, as stated in the PPP header.
    pub words: u8,
    payload: &'a str,
}

impl<'a> Packet<'a> {
    /// The payload as hex text, two digits per byte.
    #[inline]
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    pub fn payload_bytes(&self) -> impl Iterator<Item = &'a str> {
        hex_pairs(self.payload)
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len() / 2
    }

    /// Total length of the packet, header included.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload_len() + PACKET_OVERHEAD as usize
    }

    /// The suffix of the C identifiers of this packet: its address in hex, without leading zeros.
    ///
    /// Address zero has an empty suffix.
    pub fn name_suffix(&self) -> String {
        let address = format!("{:06X}", self.address);
        address.trim_start_matches('0').to_owned()
    }
}

/// The packets a data record is split into.
///
/// Every packet but the last one is full. A record without payload is a single empty packet.
pub struct PacketPlan<'a> {
    address: u32,
    remaining: &'a str,
    capacity: usize,
    started: bool,
}

impl<'a> PacketPlan<'a> {
    pub fn new(record: &'a DataRecord, size: PacketSize) -> Self {
        Self {
            address: record.address() & ADDRESS_MASK,
            remaining: record.payload(),
            capacity: size.payload_capacity(),
            started: false,
        }
    }
}

impl<'a> Iterator for PacketPlan<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && self.remaining.is_empty() {
            return None;
        }

        self.started = true;

        let len = (self.remaining.len() / 2).min(self.capacity);
        let (payload, rest) = self.remaining.split_at(len * 2);

        // capacity is at most 255 words
        let words = (len / WORD_LEN) as u8;
        let packet = Packet {
            address: self.address,
            words,
            payload,
        };

        let next = self.address.wrapping_add(u32::from(words));
        if !rest.is_empty() && next > ADDRESS_MASK {
            tracing::warn!(
                "continuation of packet at {:06X} wraps around the 24-bit address space",
                self.address
            );
        }

        self.address = next & ADDRESS_MASK;
        self.remaining = rest;

        Some(packet)
    }
}

impl std::iter::FusedIterator for PacketPlan<'_> {}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("data record at {address:06X} appears before a valid memory space was selected")]
    UnknownMemorySpace { address: u32 },
    #[error(transparent)]
    Io { source: std::io::Error },
}

fn write_packet(
    out: &mut impl Write,
    header: u8,
    prefix: &str,
    packet: &Packet,
) -> std::io::Result<()> {
    let name = format!("{prefix}{}", packet.name_suffix());
    writeln!(out, "uint32_t const {name}_LEN = {};", packet.len())?;

    write!(out, "uint8_t const {name}[] = {{0x{header:02X},0x00,0x{:02X},", packet.words)?;
    for byte in &packet.address.to_be_bytes()[1..] {
        write!(out, "0x{byte:02X},")?;
    }

    for byte in packet.payload_bytes() {
        write!(out, "0x{byte},")?;
    }

    writeln!(out, "}};")?;
    writeln!(out)
}

/// Writes the packets of `record`, targeting `space`, to `out`. Returns how many packets were
/// written.
///
/// Nothing is written if `space` is [`MemorySpace::Unknown`].
pub fn emit(
    record: &DataRecord,
    space: MemorySpace,
    size: PacketSize,
    out: &mut impl Write,
) -> Result<usize, EmitError> {
    let (Some(header), Some(prefix)) = (space.header_byte(), space.name_prefix()) else {
        return Err(EmitError::UnknownMemorySpace {
            address: record.address(),
        });
    };

    let mut count = 0;
    for packet in PacketPlan::new(record, size) {
        tracing::trace!(
            address = packet.address,
            words = packet.words,
            "emitting {prefix} packet"
        );

        write_packet(out, header, prefix, &packet).context(EmitCtx::Io)?;
        count += 1;
    }

    Ok(count)
}
