//! Playback clock and its collaborators.
//!
//! The clock never sleeps or touches audio itself. It emits [`ClockEffect`]s for a host (a UI
//! shell or the [`VirtualDriver`]) and is fed events back, each carrying the generation it was
//! issued under so late events from a cancelled position are dropped.
//!
//! [`ClockEffect`]: crate::ClockEffect
//! [`VirtualDriver`]: crate::VirtualDriver

pub(crate) mod clock;
pub(crate) mod driver;
pub(crate) mod plan;
pub(crate) mod state;
