mod import;
mod repository;
mod schema;

pub use import::import_notebooks;
pub use repository::Repository;
