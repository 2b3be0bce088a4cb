pub mod fact;

pub use fact::{EmptyFactText, Fact, FactText};
