pub mod products;
pub mod provider;
pub mod response;
pub mod seed;
