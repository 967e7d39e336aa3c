//! `remindd-delivery` — the due-reminder delivery loop.
//!
//! # Overview
//!
//! [`DeliveryEngine`] polls the reminder store on a fixed interval,
//! mails every record whose schedule time has arrived, and marks each
//! one sent exactly once. A record's send failure is isolated to that
//! record; a store failure aborts only the current cycle. The loop
//! itself ends only on shutdown.
//!
//! # Record lifecycle
//!
//! | State          | Transition                                   |
//! |----------------|----------------------------------------------|
//! | unsent, not due | waits for `scheduled_at` to pass            |
//! | unsent, due     | retried every cycle until one send succeeds |
//! | sent            | terminal, never re-delivered                |

pub mod engine;
pub mod error;

pub use engine::{CycleStats, DeliveryEngine};
pub use error::{DeliveryError, Result};
