pub mod goals;
pub mod history;
pub mod meal;
pub mod profile;
pub mod summary;
