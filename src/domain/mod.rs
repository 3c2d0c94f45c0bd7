//! Domain layer: entities, value objects and events.

pub mod customer;
pub mod events;
pub mod line_item;
pub mod value_objects;
