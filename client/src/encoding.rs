//! Turning caller images into the `face::Image` wire message.
//!
//! Two input shapes are accepted. `FaceImage::Array` is a raw `HxW` or `HxWxC` pixel array in
//! RGB order and is encoded directly. `FaceImage::Frame` wraps an image object implementing
//! [`FrameSource`]: its array layout is tried first, and when that is unavailable or cannot be
//! encoded the frame's BGR conversion is used with blue and red swapped back. Only the second
//! attempt's error ever reaches the caller.
use crate::config::Compression;
use crate::error::FaroError;
use grpc_types::face::Image;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use ndarray::{Array3, ArrayD, ArrayViewD, Axis};
use std::fmt;
use std::sync::Arc;

/// An image object that is not itself a pixel array
pub trait FrameSource: Send + Sync + fmt::Debug {
    /// Pixels as an `HxWxC` RGB array, for frames that can hand one out directly
    fn to_array(&self) -> Result<ArrayD<u8>, FaroError> {
        Err(FaroError::ImageConversion(
            "frame exposes no array layout".to_string(),
        ))
    }

    /// Pixels as an `HxWx3` array in blue, green, red order
    fn to_bgr(&self) -> Result<Array3<u8>, FaroError>;
}

impl FrameSource for DynamicImage {
    fn to_bgr(&self) -> Result<Array3<u8>, FaroError> {
        let rgb = self.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut pixels =
            Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())?;
        pixels.invert_axis(Axis(2));
        Ok(pixels)
    }
}

#[derive(Debug, Clone)]
pub enum FaceImage {
    Array(ArrayD<u8>),
    Frame(Arc<dyn FrameSource>),
}

impl FaceImage {
    pub fn frame(source: impl FrameSource + 'static) -> Self {
        FaceImage::Frame(Arc::new(source))
    }
}

impl From<ArrayD<u8>> for FaceImage {
    fn from(array: ArrayD<u8>) -> Self {
        FaceImage::Array(array)
    }
}

impl From<Array3<u8>> for FaceImage {
    fn from(array: Array3<u8>) -> Self {
        FaceImage::Array(array.into_dyn())
    }
}

impl From<ndarray::Array2<u8>> for FaceImage {
    fn from(array: ndarray::Array2<u8>) -> Self {
        FaceImage::Array(array.into_dyn())
    }
}

impl From<DynamicImage> for FaceImage {
    fn from(image: DynamicImage) -> Self {
        FaceImage::frame(image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub compression: Compression,
    pub quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Uint8,
            quality: 95,
        }
    }
}

pub fn encode_image(image: &FaceImage, options: &EncodeOptions) -> Result<Image, FaroError> {
    match image {
        FaceImage::Array(array) => encode_array(array.view(), options),
        FaceImage::Frame(frame) => {
            let from_array = frame
                .to_array()
                .and_then(|array| encode_array(array.view(), options));
            match from_array {
                Ok(image) => Ok(image),
                Err(err) => {
                    log::debug!("Frame array layout unusable ({err}), converting from BGR");
                    let mut pixels = frame.to_bgr()?;
                    pixels.invert_axis(Axis(2));
                    encode_array(pixels.into_dyn().view(), options)
                }
            }
        }
    }
}

fn encode_array(pixels: ArrayViewD<u8>, options: &EncodeOptions) -> Result<Image, FaroError> {
    let (height, width, channels) = match pixels.shape() {
        &[height, width] => (height, width, 1),
        &[height, width, channels @ (1 | 3)] => (height, width, channels),
        shape => {
            return Err(FaroError::ImageConversion(format!(
                "unsupported pixel array shape {shape:?}"
            )))
        }
    };
    let to_dimension = |value: usize| {
        u32::try_from(value)
            .ok()
            .filter(|value| *value <= i32::MAX as u32)
            .ok_or_else(|| FaroError::ImageConversion(format!("dimension {value} too large")))
    };
    let (width, height) = (to_dimension(width)?, to_dimension(height)?);
    let color_type = if channels == 1 {
        ExtendedColorType::L8
    } else {
        ExtendedColorType::Rgb8
    };

    // logical iteration order is row major regardless of the view's strides
    let raw: Vec<u8> = pixels.iter().copied().collect();
    let data = match options.compression {
        Compression::Uint8 => raw,
        Compression::Jpeg => {
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, options.quality)
                .write_image(&raw, width, height, color_type)?;
            buffer
        }
        Compression::Png => {
            let mut buffer = Vec::new();
            PngEncoder::new(&mut buffer).write_image(&raw, width, height, color_type)?;
            buffer
        }
    };

    Ok(Image {
        width: width as i32,
        height: height as i32,
        channels: channels as i32,
        compression: grpc_types::face::Compression::from(options.compression).into(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct BgrOnlyFrame {
        pixels: Array3<u8>,
    }

    impl FrameSource for BgrOnlyFrame {
        fn to_array(&self) -> Result<ArrayD<u8>, FaroError> {
            Err(FaroError::ImageConversion("layout A exploded".to_string()))
        }

        fn to_bgr(&self) -> Result<Array3<u8>, FaroError> {
            Ok(self.pixels.clone())
        }
    }

    #[derive(Debug)]
    struct BrokenFrame;

    impl FrameSource for BrokenFrame {
        fn to_array(&self) -> Result<ArrayD<u8>, FaroError> {
            Err(FaroError::ImageConversion("layout A exploded".to_string()))
        }

        fn to_bgr(&self) -> Result<Array3<u8>, FaroError> {
            Err(FaroError::ImageConversion("layout B exploded".to_string()))
        }
    }

    fn two_pixel_rgb() -> Array3<u8> {
        Array3::from_shape_vec((1, 2, 3), vec![10, 20, 30, 40, 50, 60]).unwrap()
    }

    #[test]
    fn test_array_is_encoded_as_raw_bytes() {
        let image = encode_image(&two_pixel_rgb().into(), &EncodeOptions::default()).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 1);
        assert_eq!(image.channels, 3);
        assert_eq!(image.compression(), grpc_types::face::Compression::Uint8);
        assert_eq!(image.data, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_grayscale_array() {
        let gray: Array2<u8> = arr2(&[[1, 2, 3], [4, 5, 6]]);
        let image = encode_image(&gray.into(), &EncodeOptions::default()).unwrap();
        assert_eq!((image.width, image.height, image.channels), (3, 2, 1));
        assert_eq!(image.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unsupported_shape_is_rejected() {
        let rgba = Array3::<u8>::zeros((2, 2, 4));
        let err = encode_image(&rgba.into(), &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, FaroError::ImageConversion(_)));
    }

    #[test]
    fn test_compressed_encodings() {
        let pixels = Array3::<u8>::from_elem((8, 8, 3), 128);
        let jpeg = encode_image(
            &pixels.clone().into(),
            &EncodeOptions {
                compression: Compression::Jpeg,
                quality: 80,
            },
        )
        .unwrap();
        assert_eq!(&jpeg.data[..2], &[0xFF, 0xD8]);
        assert_eq!(jpeg.compression(), grpc_types::face::Compression::Jpeg);

        let png = encode_image(
            &pixels.into(),
            &EncodeOptions {
                compression: Compression::Png,
                quality: 80,
            },
        )
        .unwrap();
        assert_eq!(&png.data[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_frame_falls_back_to_swapped_bgr() {
        let bgr = Array3::from_shape_vec((1, 2, 3), vec![30, 20, 10, 60, 50, 40]).unwrap();
        let image = FaceImage::frame(BgrOnlyFrame { pixels: bgr });
        let encoded = encode_image(&image, &EncodeOptions::default()).unwrap();
        assert_eq!(encoded.data, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_frame_failure_reports_only_second_error() {
        let err = encode_image(&FaceImage::frame(BrokenFrame), &EncodeOptions::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("layout B exploded"));
        assert!(!err.contains("layout A exploded"));
    }

    #[test]
    fn test_dynamic_image_keeps_rgb_order() {
        let mut buffer = image::RgbImage::new(2, 1);
        buffer.put_pixel(0, 0, image::Rgb([10, 20, 30]));
        buffer.put_pixel(1, 0, image::Rgb([40, 50, 60]));
        let image = FaceImage::from(DynamicImage::ImageRgb8(buffer));
        let encoded = encode_image(&image, &EncodeOptions::default()).unwrap();
        assert_eq!(encoded.data, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!((encoded.width, encoded.height), (2, 1));
    }
}
