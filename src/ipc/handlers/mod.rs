pub mod backup_exchange;
pub mod categories;
pub mod classes;
pub mod core;
pub mod records;
pub mod reports;
pub mod roster;
pub mod students;
