pub mod aggregate;
pub mod console;
pub mod html;
pub mod junit;
