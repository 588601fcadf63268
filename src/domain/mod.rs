pub mod character;
pub mod publication;

pub use character::{Appearances, Character};
pub use publication::{Publication, PublicationKind};
