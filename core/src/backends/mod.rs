pub mod chatchat;
pub mod factory;

pub use chatchat::ChatchatBackend;
pub use factory::create_backend;
