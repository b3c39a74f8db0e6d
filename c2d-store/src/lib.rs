pub mod app_config;
pub mod database;
pub mod enrollment_repo;
pub mod memory;
pub mod order_repo;
pub mod profile_repo;
pub mod program_repo;

pub use database::DbClient;
pub use enrollment_repo::PgEnrollmentRepository;
pub use memory::InMemoryStore;
pub use order_repo::PgOrderRepository;
pub use profile_repo::PgProfileRepository;
pub use program_repo::PgProgramRepository;
