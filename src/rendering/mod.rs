pub mod gray_png;

pub use gray_png::encode_gray_png;
