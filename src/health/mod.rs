// ABOUTME: HTTP health gating for a freshly restarted stack.
// ABOUTME: A probe abstraction over a single GET, and the polling gate built on it.

mod gate;
mod probe;

pub use gate::{HealthGate, HealthTimeout, PROBE_TIMEOUT, PollOutcome};
pub use probe::{HttpProbe, HyperProbe, ProbeError};
