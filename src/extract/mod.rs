pub mod design_tree;
pub mod dom_snapshot;
pub mod source;
