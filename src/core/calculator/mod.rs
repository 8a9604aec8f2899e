pub mod elapsed;
pub mod lunch;
pub mod overlap;
pub mod threshold;
