//! Decoding of ASCII hex text into fixed-width unsigned integers.
//!
//! Decoding never fails: it stops at the first character that isn't a hex digit and returns
//! whatever was accumulated up to that point. Text with more digits than the target integer can
//! hold is truncated to its leading digits and flagged as an overflow.

/// An unsigned integer type that hex text can be decoded into.
pub trait HexInt: Copy + Default {
    /// Width of the integer, in bits.
    const BITS: u32;

    /// Appends a single hex digit (`0..16`) to the right of `self`.
    fn push_digit(self, digit: u8) -> Self;
}

macro_rules! impl_hex_int {
    ($($ty:ty),*) => {
        $(
            impl HexInt for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline(always)]
                fn push_digit(self, digit: u8) -> Self {
                    (self << 4) | <$ty>::from(digit)
                }
            }
        )*
    };
}

impl_hex_int!(u8, u16, u32, u64);

/// Result of decoding hex text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded value.
    pub value: T,
    /// How many hex digits were consumed.
    pub digits: usize,
    /// Whether the text had more hex digits than the value can hold.
    pub overflowed: bool,
}

/// Returns the value of an ASCII hex digit.
#[inline]
pub fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decodes the leading hex digits of `text` into a `T`.
pub fn decode<T: HexInt>(text: impl AsRef<[u8]>) -> Decoded<T> {
    let max_digits = (T::BITS / 4) as usize;
    let mut decoded = Decoded {
        value: T::default(),
        digits: 0,
        overflowed: false,
    };

    for digit in text.as_ref().iter().map_while(|&c| hex_digit(c)) {
        if decoded.digits == max_digits {
            decoded.overflowed = true;
            break;
        }

        decoded.value = decoded.value.push_digit(digit);
        decoded.digits += 1;
    }

    decoded
}

/// Same as [`decode`], but only returns the value. An overflow is reported as a warning.
pub fn atoh<T: HexInt>(text: impl AsRef<[u8]>) -> T {
    let text = text.as_ref();
    let decoded = decode::<T>(text);
    if decoded.overflowed {
        tracing::warn!(
            "hex value {:?} does not fit in {} bits, keeping its first {} digits",
            String::from_utf8_lossy(text),
            T::BITS,
            decoded.digits
        );
    }

    decoded.value
}
