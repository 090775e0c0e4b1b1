//! Presentation attributes derived from a display name.
//!
//! Initials and avatar color are recomputed on demand and depend only on
//! the name. They are never used for identity or equality.

use crate::{ChatError, Result};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Avatar background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvatarColor {
    Amber,
    Blue,
    Brown,
    Cyan,
    Green,
    Indigo,
    Lime,
    Orange,
    Pink,
    Purple,
    Red,
    Teal,
    Yellow,
}

impl AvatarColor {
    /// Colors in palette order.
    pub const PALETTE: [AvatarColor; 13] = [
        AvatarColor::Amber,
        AvatarColor::Blue,
        AvatarColor::Brown,
        AvatarColor::Cyan,
        AvatarColor::Green,
        AvatarColor::Indigo,
        AvatarColor::Lime,
        AvatarColor::Orange,
        AvatarColor::Pink,
        AvatarColor::Purple,
        AvatarColor::Red,
        AvatarColor::Teal,
        AvatarColor::Yellow,
    ];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarColor::Amber => "amber",
            AvatarColor::Blue => "blue",
            AvatarColor::Brown => "brown",
            AvatarColor::Cyan => "cyan",
            AvatarColor::Green => "green",
            AvatarColor::Indigo => "indigo",
            AvatarColor::Lime => "lime",
            AvatarColor::Orange => "orange",
            AvatarColor::Pink => "pink",
            AvatarColor::Purple => "purple",
            AvatarColor::Red => "red",
            AvatarColor::Teal => "teal",
            AvatarColor::Yellow => "yellow",
        }
    }

    /// Pick the palette color assigned to `name`.
    pub fn for_name(name: &str) -> Self {
        Self::PALETTE[(fnv1a(name) % Self::PALETTE.len() as u64) as usize]
    }
}

impl std::fmt::Display for AvatarColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// FNV-1a (64-bit) over the UTF-8 bytes of `s`.
fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Get the avatar initials for a name: its first character, upper-cased.
///
/// Some characters upper-case to more than one character (`ß` -> `SS`),
/// so the result is a `String`.
pub fn initials_of(name: &str) -> Result<String> {
    let first = name.chars().next().ok_or(ChatError::EmptyName)?;
    Ok(first.to_uppercase().collect())
}

/// Map a name onto `[0, palette_size)`.
pub fn color_index_of(name: &str, palette_size: usize) -> Result<usize> {
    if palette_size == 0 {
        return Err(ChatError::EmptyPalette);
    }
    Ok((fnv1a(name) % palette_size as u64) as usize)
}
