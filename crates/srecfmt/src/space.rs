//! DSP563xx memory spaces and tracking of the currently selected one.

/// A DSP563xx memory space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemorySpace {
    /// X data memory.
    X,
    /// Y data memory.
    Y,
    /// Program memory.
    P,
    /// No memory space selected, or an unrecognized one.
    #[default]
    Unknown,
}

impl MemorySpace {
    /// Maps the memory space code of an `S0` record.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::X,
            0x02 => Self::Y,
            0x04 => Self::P,
            _ => Self::Unknown,
        }
    }

    /// The first byte of the PPP header of packets targeting this memory space.
    pub fn header_byte(self) -> Option<u8> {
        match self {
            Self::X => Some(0xC5),
            Self::Y => Some(0xC6),
            Self::P => Some(0xC4),
            Self::Unknown => None,
        }
    }

    /// Prefix of the C identifiers of packets targeting this memory space.
    pub fn name_prefix(self) -> Option<&'static str> {
        match self {
            Self::X => Some("PPP_X"),
            Self::Y => Some("PPP_Y"),
            Self::P => Some("PPP_P"),
            Self::Unknown => None,
        }
    }
}

/// Tracks the memory space selected by the most recent `S0` record.
#[derive(Debug, Default)]
pub struct MemorySpaceTracker {
    current: MemorySpace,
}

impl MemorySpaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> MemorySpace {
        self.current
    }

    pub fn on_switch(&mut self, space: MemorySpace) {
        self.current = space;
    }

    /// Forgets the selected memory space. Called on end of file and unsupported records.
    pub fn on_reset(&mut self) {
        self.current = MemorySpace::Unknown;
    }
}
