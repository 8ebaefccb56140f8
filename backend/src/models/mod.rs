pub mod macros;
pub mod metal;
pub mod profile;
pub mod reading;

pub use metal::{Concentrations, Metal, Standards};
pub use profile::{ProfileUpdate, ScientistProfile};
pub use reading::{DailyCount, MetalInputs, NewReading, Reading, ReadingId, ReadingInput, UserId};
