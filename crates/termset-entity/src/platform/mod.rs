//! Values exchanged with the translation platform.

pub mod label;
pub mod query;
pub mod unit;

pub use label::{Label, assignment_label_description, assignment_label_name};
pub use query::UnitQuery;
pub use unit::{Unit, UnitPage, UnitTranslation};
