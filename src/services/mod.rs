pub mod lookup;

pub use lookup::{LocationTarget, LookupService};
