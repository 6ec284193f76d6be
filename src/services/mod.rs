pub mod batch;
pub mod grid;
pub mod image_io;
pub mod pipeline;
pub mod preprocess;

pub use batch::{run_batch, BatchReport};
pub use grid::{grid_cut, grid_file, tile_layout, Tile};
pub use pipeline::{
    convert_dir, convert_file, dither_dir, dither_file, preprocess_dir, preprocess_file,
    ConvertBatch, ConvertOutcome, HeaderTarget,
};
pub use preprocess::preprocess_image;
