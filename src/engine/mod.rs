pub mod alphabet;
pub mod classifier;
pub mod input;
pub mod signal;
pub mod timer;
pub mod validator;

pub use alphabet::Alphabet;
pub use classifier::{TimingConfig, TimingSource};
pub use input::{InputEngine, InputState};
pub use signal::{Pattern, Signal};
