pub mod product;
pub mod spot_price;
