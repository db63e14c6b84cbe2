#[derive(Debug)]
pub enum Orientation {
    Identity,
    FlipHorz,
    Rotate180,
    FlipVert,
    Transpose,
    Rotate90Cw,
    Transverse,
    Rotate270Cw,
}

impl Orientation {
    fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Identity),
            2 => Some(Self::FlipHorz),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVert),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90Cw),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270Cw),
            _ => None,
        }
    }

    pub fn reorient(&self, image: image::DynamicImage) -> image::DynamicImage {
        match self {
            Self::Identity => image,
            Self::FlipHorz => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVert => image.flipv(),
            Self::Transpose => image.rotate90().fliph(),
            Self::Rotate90Cw => image.rotate90(),
            Self::Transverse => image.rotate90().flipv(),
            Self::Rotate270Cw => image.rotate270(),
        }
    }
}

/// Reads the EXIF orientation tag, if the container carries one.
fn exif_orientation(bytes: &[u8]) -> Option<Orientation> {
    exif::Reader::new()
        .read_from_container(&mut std::io::Cursor::new(bytes))
        .ok()?
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|orientation| orientation.value.get_uint(0))
        .and_then(Orientation::from_exif)
}

#[derive(Debug, thiserror::Error)]
pub enum NewImageExtError {
    #[error("Failed to read the image")]
    ImageReadError(#[source] std::io::Error),
    #[error("Unsupported image format")]
    UnsupportedImageFormat,
    #[error("Failed to decode image")]
    ImageDecodingError(#[from] image::error::ImageError),
}

/// An uploaded photo, decoded and turned the right way up.
pub struct ImageExt {
    image: image::DynamicImage,
}

impl ImageExt {
    pub fn new(bytes: &[u8]) -> Result<ImageExt, NewImageExtError> {
        let image_reader = image::io::Reader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(NewImageExtError::ImageReadError)?;

        let format = image_reader
            .format()
            .ok_or(NewImageExtError::UnsupportedImageFormat)?;

        let image = image_reader
            .decode()
            .map_err(NewImageExtError::ImageDecodingError)?;

        let orientation = {
            use image::ImageFormat;
            match format {
                ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP => {
                    exif_orientation(bytes)
                }
                _ => None,
            }
        }
        .unwrap_or(Orientation::Identity);

        log::debug!("  FORMAT {:?} ORIENTATION {:?}", format, orientation);

        Ok(Self {
            image: orientation.reorient(image),
        })
    }

    pub fn to_rgb8(&self) -> image::RgbImage {
        self.image.to_rgb8()
    }

    /// Writes the image as a JPEG, whatever format it arrived in.
    pub fn save_jpeg(&self, path: &std::path::Path) -> Result<(), image::ImageError> {
        image::DynamicImage::ImageRgb8(self.image.to_rgb8())
            .save_with_format(path, image::ImageFormat::Jpeg)
    }
}

/// File name for a user's reference photo, e.g. `ana_maria_7.jpg`.
pub fn user_image_file_name(name: &str, user_id: i32) -> String {
    let stem: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            c if c.is_alphanumeric() || c == '-' || c == '_' => c,
            _ => '-',
        })
        .collect();

    format!("{}_{}.jpg", stem, user_id)
}

#[cfg(test)]
pub fn encode_test_image(width: u32, height: u32, format: image::ImageOutputFormat) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 120, 80]),
    ))
    .write_to(&mut cursor, format)
    .unwrap();
    cursor.into_inner()
}
