//! Gray-code (quadrature) sequences as produced by a rotary encoder.
use crate::Direction;

/// One full clockwise cycle starting after `0b00`.
pub const SEQUENCE_INC: [u8; 4] = [1, 3, 2, 0];
/// One full counterclockwise cycle starting after `0b00`.
pub const SEQUENCE_DEC: [u8; 4] = [2, 3, 1, 0];

/// Transitions per detent cycle.
pub const TRANSITIONS: u32 = 4;

const NEXT_CLOCKWISE: [u8; 4] = [1, 3, 0, 2];
const NEXT_COUNTER_CLOCKWISE: [u8; 4] = [2, 0, 3, 1];

/// The channel value one step away from `channels` in the given direction.
///
/// ```rust
/// use encoder_chip_logic::{Direction, quadrature::next};
/// assert_eq!(next(0b00, Direction::Clockwise), 0b01);
/// assert_eq!(next(0b01, Direction::CounterClockwise), 0b00);
/// ```
pub fn next(channels: u8, direction: Direction) -> u8 {
    let index = usize::from(channels & 0b11);
    match direction {
        Direction::Clockwise => NEXT_CLOCKWISE[index],
        Direction::CounterClockwise => NEXT_COUNTER_CLOCKWISE[index],
    }
}

/// Endless sequence of channel values walking away from `start`.
pub fn walk(start: u8, direction: Direction) -> impl Iterator<Item = u8> {
    core::iter::successors(Some(next(start, direction)), move |&c| {
        Some(next(c, direction))
    })
}
