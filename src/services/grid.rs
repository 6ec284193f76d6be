//! Cutting an image into a rows x cols grid of tiles.

use crate::error::GeinkError;
use crate::services::image_io;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Position and size of one tile in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Row-major tile layout.
///
/// Tiles are `width / cols` by `height / rows`; the last row and column
/// absorb the remainder so the grid covers every pixel.
pub fn tile_layout(width: u32, height: u32, rows: u32, cols: u32) -> Result<Vec<Tile>, GeinkError> {
    if rows < 1 || cols < 1 {
        return Err(GeinkError::Validation(
            "rows and cols must be >= 1".to_string(),
        ));
    }
    if rows > height || cols > width {
        return Err(GeinkError::Validation(format!(
            "cannot cut {width}x{height} image into {rows}x{cols} tiles"
        )));
    }

    let tile_h = height / rows;
    let tile_w = width / cols;
    let mut tiles = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        let y = row * tile_h;
        let y_end = if row < rows - 1 { y + tile_h } else { height };
        for col in 0..cols {
            let x = col * tile_w;
            let x_end = if col < cols - 1 { x + tile_w } else { width };
            tiles.push(Tile {
                row,
                col,
                x,
                y,
                width: x_end - x,
                height: y_end - y,
            });
        }
    }
    Ok(tiles)
}

pub fn grid_cut(
    img: &DynamicImage,
    rows: u32,
    cols: u32,
) -> Result<Vec<(Tile, DynamicImage)>, GeinkError> {
    let tiles = tile_layout(img.width(), img.height(), rows, cols)?;
    Ok(tiles
        .into_iter()
        .map(|t| (t, img.crop_imm(t.x, t.y, t.width, t.height)))
        .collect())
}

/// Directory the tiles of `input` are written to: `<parent>/<stem>/`.
pub fn tile_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.parent().unwrap_or(Path::new("")).join(stem)
}

/// Cut `input` and write `r{row}_c{col}.<ext>` files into [`tile_dir`].
pub fn grid_file(input: &Path, rows: u32, cols: u32) -> Result<Vec<PathBuf>, GeinkError> {
    let img = image_io::open_image(input)?;
    let tiles = grid_cut(&img, rows, cols)?;
    let out_dir = tile_dir(input);
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());

    let mut written = Vec::with_capacity(tiles.len());
    for (tile, piece) in &tiles {
        let path = out_dir.join(format!("r{}_c{}.{}", tile.row, tile.col, ext));
        image_io::save_image(piece, &path)?;
        written.push(path);
    }
    tracing::info!(
        input = %input.display(),
        tiles = written.len(),
        output = %out_dir.display(),
        "Grid cut complete"
    );
    Ok(written)
}
