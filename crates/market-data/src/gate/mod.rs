//! Request budget enforcement shared by all outbound calls.

mod rate_gate;

pub use rate_gate::{
    RateGate, RateGateConfig, WindowSnapshot, DEFAULT_REQUEST_LIMIT, DEFAULT_REQUEST_WINDOW,
    THROTTLE_PENALTY_WEIGHT,
};
