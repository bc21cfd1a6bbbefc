pub mod memory_repo;
pub use memory_repo::MemoryRepository;
pub mod pg_repo;
pub use pg_repo::PgRepository;
pub mod repository;
pub use repository::Repository;
pub mod store;
pub use store::Store;
