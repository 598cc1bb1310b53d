pub mod pricing;
pub mod products;
