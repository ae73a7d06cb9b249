//! Author domain entities.

pub mod model;
pub mod profile;

pub use model::Author;
pub use profile::Profile;
