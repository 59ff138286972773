mod client;
mod schools;

pub use client::{Database, DbError};
pub use schools::{PgSchoolStore, SchoolStore};
