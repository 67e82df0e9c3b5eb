pub mod classes;
pub mod core;
pub mod reports;
pub mod roster_exchange;
pub mod students;
