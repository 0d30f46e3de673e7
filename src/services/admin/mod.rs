//! Admin services - Back office per lo staff (Admin e Manager)

pub mod categories;
pub mod lookups;
pub mod orders;
pub mod packaging;
pub mod products;
pub mod questions;
pub mod users;
