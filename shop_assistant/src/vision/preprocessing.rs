use crate::error::ImageError;
use image::{imageops::FilterType, ImageReader};
use ndarray::{Array, Ix4};
use std::io::Cursor;

pub const INPUT_SIZE: u32 = 224;

/// NHWC input of shape `(1, 224, 224, 3)` with values in `[-1, 1]`.
pub type ImageTensor = Array<f32, Ix4>;

pub fn preprocess_image(image_data: &[u8]) -> Result<ImageTensor, ImageError> {
    let image_reader = ImageReader::new(Cursor::new(image_data)).with_guessed_format()?;
    let original_img = image_reader.decode()?;

    // Grayscale is expanded and alpha dropped.
    let rgb = original_img.to_rgb8();
    let img = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let size = INPUT_SIZE as usize;
    let mut input = Array::zeros((1, size, size, 3));
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        input[[0, y, x, 0]] = scale(r);
        input[[0, y, x, 1]] = scale(g);
        input[[0, y, x, 2]] = scale(b);
    }

    Ok(input)
}

fn scale(value: u8) -> f32 {
    value as f32 / 127.5 - 1.
}
