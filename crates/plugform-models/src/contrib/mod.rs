//! Ready-made plugins beyond the simple field kinds.
//!
//! [`duration::Duration`] contributes two date fields from one row.
//! [`honeypot::Honeypot`] adds a hidden spam trap and takes no part in the
//! union query since it has no `name` column.

pub mod duration;
pub mod honeypot;

pub use duration::Duration;
pub use honeypot::{Honeypot, HoneypotValidator, HONEYPOT_FIELD};
