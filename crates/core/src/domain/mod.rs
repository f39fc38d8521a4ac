pub mod documents;
pub mod event;
pub mod party;
pub mod quote;
pub mod schedule;
