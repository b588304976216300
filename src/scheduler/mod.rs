pub mod shutdown;
pub mod time_interface;

pub use shutdown::{shutdown_channel, watch_interrupts, ShutdownHandle, ShutdownSignal};
pub use time_interface::{IntervalTicker, ManualTickHandle, ManualTicker, Ticker};
