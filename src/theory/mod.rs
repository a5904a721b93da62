//! Music theory needed to turn staff notation into numbered notation:
//! keys and modes, movable-do transposition, beat arithmetic.

pub mod duration;
pub mod key;
pub mod pitch;
pub mod time;

pub use duration::{note_length, render_length_note, LengthUnit};
pub use key::{KeySignature, Mode};
pub use pitch::{convert_pitch_to_numbered, is_pitch_equal, next_half_step, octave_offset, PitchName};
pub use time::TimeSignatures;
