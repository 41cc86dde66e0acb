pub mod fix;
pub mod segments;
