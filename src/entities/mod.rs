pub mod prelude;

pub mod events;
pub mod locations;
pub mod weathers;
