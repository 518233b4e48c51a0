//! Decoding images and uploading them as 2D textures.
//!
//! [`TextureImage`] holds decoded pixels only until they are handed to the driver;
//! [`Texture`] owns the resulting GPU object and its metadata.

use std::{path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};

/// Layout of the pixels handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Picks the transfer format for an 8-bit image with `channels` channels.
    ///
    /// Two-channel (luma + alpha) images upload as `RG`.
    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            1 => Ok(PixelFormat::Red),
            2 => Ok(PixelFormat::Rg),
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            n => Err(Error::UnsupportedChannels(n)),
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// The client-side format passed to `glTexImage2D`.
    pub fn gl_format(self) -> u32 {
        match self {
            PixelFormat::Red => glow::RED,
            PixelFormat::Rg => glow::RG,
            PixelFormat::Rgb => glow::RGB,
            PixelFormat::Rgba => glow::RGBA,
        }
    }

    /// The sized internal format the texture is stored with.
    pub fn gl_internal_format(self) -> i32 {
        (match self {
            PixelFormat::Red => glow::R8,
            PixelFormat::Rg => glow::RG8,
            PixelFormat::Rgb => glow::RGB8,
            PixelFormat::Rgba => glow::RGBA8,
        }) as i32
    }
}

/// Number of bytes an 8-bit `width` x `height` image in `format` occupies.
fn pixel_data_len(width: u32, height: u32, format: PixelFormat) -> usize {
    width as usize * height as usize * format.channels() as usize
}

/// A decoded image, row-major with 8 bits per channel.
///
/// The pixel buffer always holds exactly `width * height * channels` bytes;
/// every constructor checks it, since the upload reads that many.
#[derive(Debug, Clone)]
pub struct TextureImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Decodes the image file at `path`, keeping its native channel count.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| {
            log::error!("Failed to load texture: {}: {}", path.display(), source);
            Error::ImageDecode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_image(image)
    }

    /// Converts an already decoded image, narrowing wider samples to 8 bits.
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let format = PixelFormat::from_channels(image.color().channel_count())?;
        let (width, height) = image.dimensions();
        let pixels = match format {
            PixelFormat::Red => image.into_luma8().into_raw(),
            PixelFormat::Rg => image.into_luma_alpha8().into_raw(),
            PixelFormat::Rgb => image.into_rgb8().into_raw(),
            PixelFormat::Rgba => image.into_rgba8().into_raw(),
        };
        Self::from_raw(width, height, format, pixels)
    }

    /// Wraps raw 8-bit pixels, rejecting a buffer whose length does not
    /// match the dimensions and format.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = pixel_data_len(width, height, format);
        if pixels.len() != expected {
            return Err(Error::PixelDataLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Texture {
    /// Decodes the image at `path` and uploads it with a full mipmap chain.
    pub fn new(gl: &Arc<glow::Context>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = TextureImage::load(path)?;
        let texture = Self::from_image(gl, &image)?;
        log::info!(
            "Loaded texture: {} ({}x{}, {} channels)",
            path.display(),
            texture.width,
            texture.height,
            texture.channels()
        );
        Ok(texture)
    }

    /// Creates a new texture from the given [`TextureImage`].
    ///
    /// Wraps with `REPEAT`, minifies trilinearly, magnifies linearly, and
    /// leaves no texture bound afterwards.
    pub fn from_image(gl: &Arc<glow::Context>, image: &TextureImage) -> Result<Self> {
        unsafe {
            let texture = gl.create_texture().map_err(Error::Gl)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            // Rows of 1- and 3-channel images are not 4-byte aligned.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                image.format.gl_internal_format(),
                image.width as i32,
                image.height as i32,
                0,
                image.format.gl_format(),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.pixels.as_slice())),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width: image.width,
                height: image.height,
                format: image.format,
            })
        }
    }

    /// Returns the raw texture handle.
    pub fn id(&self) -> glow::Texture {
        self.id
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Binds the texture to the active texture unit.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }

    /// Clears the 2D binding of the active texture unit.
    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlog;
    use image::{GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_format_from_channels() {
        assert_eq!(PixelFormat::from_channels(1).unwrap(), PixelFormat::Red);
        assert_eq!(PixelFormat::from_channels(2).unwrap(), PixelFormat::Rg);
        assert_eq!(PixelFormat::from_channels(3).unwrap(), PixelFormat::Rgb);
        assert_eq!(PixelFormat::from_channels(4).unwrap(), PixelFormat::Rgba);
        assert!(matches!(
            PixelFormat::from_channels(0),
            Err(Error::UnsupportedChannels(0))
        ));
        assert!(matches!(
            PixelFormat::from_channels(5),
            Err(Error::UnsupportedChannels(5))
        ));
    }

    #[test]
    fn test_gl_formats() {
        assert_eq!(PixelFormat::Rgba.gl_format(), glow::RGBA);
        assert_eq!(PixelFormat::Red.gl_format(), glow::RED);
        assert_eq!(PixelFormat::Rgb.gl_internal_format(), glow::RGB8 as i32);
    }

    #[test]
    fn test_load_rgba_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        RgbaImage::from_pixel(5, 3, Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let image = TextureImage::load(&path).unwrap();
        assert_eq!((image.width, image.height), (5, 3));
        assert_eq!(image.channels(), 4);
        assert_eq!(image.format, PixelFormat::Rgba);
        assert_eq!(image.format.gl_format(), glow::RGBA);
        assert_eq!(image.pixels.len(), 5 * 3 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_load_grayscale_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(3, 3, Luma([200])).save(&path).unwrap();

        let image = TextureImage::load(&path).unwrap();
        assert_eq!(image.channels(), 1);
        assert_eq!(image.format, PixelFormat::Red);
        assert_eq!(image.pixels, vec![200; 9]);
    }

    #[test]
    fn test_load_gray_alpha_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray_alpha.png");
        GrayAlphaImage::from_pixel(2, 2, LumaA([1, 2])).save(&path).unwrap();

        let image = TextureImage::load(&path).unwrap();
        assert_eq!(image.channels(), 2);
        assert_eq!(image.format, PixelFormat::Rg);
        assert_eq!(image.pixels, vec![1, 2, 1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn test_rgb_image_keeps_three_channels() {
        let image =
            TextureImage::from_image(RgbImage::from_pixel(7, 1, Rgb([1, 2, 3])).into()).unwrap();
        assert_eq!(image.format, PixelFormat::Rgb);
        assert_eq!(image.pixels.len(), 7 * 3);
    }

    #[test]
    fn test_sixteen_bit_samples_are_narrowed() {
        let wide: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Luma([u16::MAX]));
        let image = TextureImage::from_image(DynamicImage::ImageLuma16(wide)).unwrap();
        assert_eq!(image.format, PixelFormat::Red);
        assert_eq!(image.pixels, vec![255; 4]);
    }

    #[test]
    fn test_raw_pixels_must_match_dimensions() {
        assert_eq!(pixel_data_len(1024, 1024, PixelFormat::Rgba), 4 * 1024 * 1024);
        assert_eq!(pixel_data_len(3, 1, PixelFormat::Rgb), 9);

        match TextureImage::from_raw(1024, 1024, PixelFormat::Rgba, vec![]) {
            Err(Error::PixelDataLength { expected, actual }) => {
                assert_eq!(expected, 4 * 1024 * 1024);
                assert_eq!(actual, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            TextureImage::from_raw(2, 2, PixelFormat::Red, vec![0; 5]),
            Err(Error::PixelDataLength {
                expected: 4,
                actual: 5
            })
        ));

        let image = TextureImage::from_raw(2, 1, PixelFormat::Rg, vec![1, 2, 3, 4]).unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.format(), PixelFormat::Rg);
        assert_eq!(image.pixels(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_load_missing_file() {
        testlog::install();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        match TextureImage::load(&path) {
            Err(Error::ImageDecode { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(testlog::lines_containing(&path.display().to_string()).len(), 1);
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(
            TextureImage::load(&path),
            Err(Error::ImageDecode { .. })
        ));
    }
}
