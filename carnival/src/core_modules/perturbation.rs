// THEORY:
// The `perturbation` module reproduces, locally, what the hosted MNIST predictor
// does with a sketch: every toggled cell of the 28x28 base digit is knocked down
// to the darkest value already present in the image. Having the same edit
// available offline lets the terminal client write a preview of exactly the
// image the classifier will see, without a network round trip.
//
// It is a stateless utility over `image::GrayImage`:
// - `perturb` applies a point set to a base image,
// - `mask` draws the point set alone,
// - `upscale` blows a grid image up to canvas size for viewing,
// - `load_grayscale` / `save_png` move images to and from disk.
//
// Cells outside the image are skipped, not rejected: a `PointSet` already
// validates against its own grid, and the base image may legitimately be
// smaller than that grid.

use crate::core_modules::point_set::PointSet;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageEncoder, Luma};
use std::path::Path;

/// Fill value of the stand-in digit used when no base image is available.
pub const PLACEHOLDER_LUMA: u8 = 0xf0;

/// A flat, light square the size of the grid.
pub fn placeholder(grid_size: u32) -> GrayImage {
    GrayImage::from_pixel(grid_size, grid_size, Luma([PLACEHOLDER_LUMA]))
}

/// Loads any format `image` understands and converts it to 8-bit luminance.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, image::ImageError> {
    Ok(image::open(path)?.into_luma8())
}

/// Sets every toggled pixel of a copy of `base` to the minimum value of `base`.
pub fn perturb(base: &GrayImage, points: &PointSet) -> GrayImage {
    let mut edited = base.clone();
    let min_value = base.pixels().map(|p| p[0]).min().unwrap_or(0);
    for point in points {
        if point.x < edited.width() && point.y < edited.height() {
            edited.put_pixel(point.x, point.y, Luma([min_value]));
        }
    }
    edited
}

/// White toggled cells on black, one pixel per cell.
pub fn mask(points: &PointSet) -> GrayImage {
    let size = points.grid_size();
    let mut image = GrayImage::new(size, size);
    for point in points {
        image.put_pixel(point.x, point.y, Luma([255]));
    }
    image
}

/// Nearest-neighbour scale to a square canvas so cells stay crisp.
pub fn upscale(image: &GrayImage, canvas_size: u32) -> GrayImage {
    imageops::resize(image, canvas_size, canvas_size, FilterType::Nearest)
}

pub fn save_png(image: &GrayImage, path: &Path) -> Result<(), image::ImageError> {
    let output = std::fs::File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::coordinate_mapper::{GRID_SIZE, Point};

    fn gradient() -> GrayImage {
        GrayImage::from_fn(GRID_SIZE, GRID_SIZE, |x, y| Luma([(30 + x + y) as u8]))
    }

    fn points(cells: &[(i64, i64)]) -> PointSet {
        PointSet::from_cells(GRID_SIZE, cells.iter().copied()).unwrap()
    }

    #[test]
    fn perturb_sets_toggled_pixels_to_image_minimum() {
        let base = gradient();
        let edited = perturb(&base, &points(&[(10, 3), (27, 27)]));
        assert_eq!(edited.get_pixel(10, 3)[0], 30);
        assert_eq!(edited.get_pixel(27, 27)[0], 30);
        assert_eq!(edited.get_pixel(11, 3), base.get_pixel(11, 3));
        assert_eq!(base.get_pixel(10, 3)[0], 43);
    }

    #[test]
    fn perturb_uses_x_as_column() {
        let base = placeholder(GRID_SIZE);
        let mut dark = base.clone();
        dark.put_pixel(0, 0, Luma([0]));
        let edited = perturb(&dark, &points(&[(5, 1)]));
        assert_eq!(edited.get_pixel(5, 1)[0], 0);
        assert_eq!(edited.get_pixel(1, 5)[0], PLACEHOLDER_LUMA);
    }

    #[test]
    fn perturb_skips_cells_outside_small_base() {
        let base = GrayImage::from_pixel(4, 4, Luma([200]));
        let edited = perturb(&base, &points(&[(10, 10), (1, 1)]));
        assert_eq!(edited.dimensions(), (4, 4));
        assert_eq!(edited.get_pixel(1, 1)[0], 200);
    }

    #[test]
    fn mask_marks_only_toggled_cells() {
        let mut set = PointSet::new(GRID_SIZE);
        set.toggle(Point::new(2, 7)).unwrap();
        let image = mask(&set);
        assert_eq!(image.get_pixel(2, 7)[0], 255);
        assert_eq!(image.pixels().filter(|p| p[0] == 255).count(), 1);
    }

    #[test]
    fn upscale_keeps_cells_crisp() {
        let image = mask(&points(&[(1, 2)]));
        let canvas = upscale(&image, 280);
        assert_eq!(canvas.dimensions(), (280, 280));
        assert_eq!(canvas.get_pixel(15, 25)[0], 255);
        assert_eq!(canvas.get_pixel(5, 25)[0], 0);
    }

    #[test]
    fn save_and_reload_preview() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let path = dir.path().join("preview.png");
        let image = perturb(&gradient(), &points(&[(3, 3)]));

        save_png(&image, &path).expect("Error Saving File.");
        let reloaded = load_grayscale(&path).expect("Error Loading File.");
        assert_eq!(reloaded, image);
    }
}
