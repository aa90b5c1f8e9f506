pub mod pixel_diff;
