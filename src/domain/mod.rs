pub mod metal;
pub mod product;
pub mod spot_price;
