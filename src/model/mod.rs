pub mod element_model;
pub mod result_model;
