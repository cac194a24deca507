// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod clock;
mod errors;
mod logger;
mod rounding;

// Public re-exports - the ONLY way to access utils functionality
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::MockClock;
pub use errors::SiteError;
pub use logger::init_logger;
pub use rounding::round_to;
