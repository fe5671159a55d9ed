pub mod cancel;
pub mod keyboard_window;
pub mod mode;
pub mod pitch;
pub mod round;
pub mod score;
pub mod session;

pub use cancel::{CancellationToken, Generation, TokenSource};
pub use keyboard_window::keyboard_window;
pub use mode::{Mode, PitchRange, RangeConfig};
pub use pitch::{Pitch, PitchClass};
pub use round::{Answer, Round};
pub use score::{NewRecord, Score};
pub use session::{AnswerOutcome, CommandError, Phase, Session};
