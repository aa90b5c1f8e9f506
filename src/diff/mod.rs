pub mod differ;
pub mod style_value;
