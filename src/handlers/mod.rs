pub mod pages;
pub mod resolve;
pub mod shorten;
