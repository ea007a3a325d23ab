pub mod json;
pub mod order;
pub mod repo;

pub use json::JsonAddressStore;
pub use repo::AddressRepository;
