pub mod embedding;
pub mod normalize;
