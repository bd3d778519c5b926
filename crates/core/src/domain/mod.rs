pub mod costs;
pub mod customer;
pub mod filament;
pub mod job;
pub mod quote;
