//! flowzi-domain
//!
//! Pure domain models (Transaction, Goal, Bill, UserSettings, currency table,
//! allocation profiles, milestones, notification rules). No I/O, no storage. Only data types and core enums.

pub mod bill;
pub mod budget;
pub mod common;
pub mod currency;
pub mod goal;
pub mod milestone;
pub mod rules;
pub mod settings;
pub mod transaction;

pub use bill::*;
pub use budget::*;
pub use common::*;
pub use currency::*;
pub use goal::*;
pub use milestone::*;
pub use rules::*;
pub use settings::*;
pub use transaction::*;
