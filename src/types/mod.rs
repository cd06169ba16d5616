//! Public types for the realm-greetings API.

mod realm;

pub use realm::Realm;
