//! Content selection

use rand_core::RngCore;

/// What a tick shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Content {
    /// Scroll the last received message
    Recall,
    /// Idle banner
    Banner,
    /// Temperature and humidity
    Climate,
}

impl Content {
    /// Rolls below this recall the stored message (5%)
    pub const RECALL_BELOW: u8 = 5;

    /// Rolls below this, and not recalled, show the banner (10%)
    pub const BANNER_BELOW: u8 = 15;

    /// Map a roll in `[0, 100)` to content
    pub fn from_roll(roll: u8) -> Self {
        if roll < Self::RECALL_BELOW {
            Content::Recall
        } else if roll < Self::BANNER_BELOW {
            Content::Banner
        } else {
            Content::Climate
        }
    }
}

/// Uniform draw in `[0, 100)`
///
/// Words from the top partial bucket are redrawn so every value is
/// equally likely.
pub fn roll_percent<R: RngCore + ?Sized>(rng: &mut R) -> u8 {
    const ZONE: u32 = u32::MAX - u32::MAX % 100;
    loop {
        let word = rng.next_u32();
        if word < ZONE {
            return (word % 100) as u8;
        }
    }
}
