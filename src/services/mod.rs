pub mod power;
pub mod predictor;
pub mod scheduler;
pub mod simulator;
pub mod standings;

pub use power::*;
pub use predictor::*;
pub use scheduler::*;
pub use simulator::*;
pub use standings::*;
