//! Text and image extraction from recipe PDFs.
//!
//! Text comes from the PDF text layer via `lopdf`. Embedded JPEG images
//! (`DCTDecode` streams) are passed through as-is, since their stream content
//! is already a complete JPEG file. Raw and `FlateDecode` 8-bit RGB or
//! grayscale images are decoded and re-encoded as PNG.

use crate::config::ExtractionSettings;
use crate::error::{ImportError, Result};
use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use log::{debug, info, warn};
use lopdf::{Dictionary, Document, Object};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// An image lifted out of the PDF, ready to be base64-encoded into a request
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub data: Vec<u8>,
    pub media_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Options controlling [`RecipeDocument::load`]
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub include_images: bool,
    pub max_images: usize,
    pub min_image_dimension: u32,
    pub max_image_bytes: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractionSettings::default().into()
    }
}

impl From<ExtractionSettings> for ExtractOptions {
    fn from(settings: ExtractionSettings) -> Self {
        ExtractOptions {
            include_images: settings.include_images,
            max_images: settings.max_images,
            min_image_dimension: settings.min_image_dimension,
            max_image_bytes: settings.max_image_bytes,
        }
    }
}

impl ExtractOptions {
    /// Text layer only
    pub fn text_only() -> Self {
        ExtractOptions {
            include_images: false,
            ..Self::default()
        }
    }
}

/// Everything pulled out of one PDF
#[derive(Debug, Clone)]
pub struct RecipeDocument {
    pub source_path: PathBuf,
    pub extracted_text: String,
    pub extracted_images: Vec<EmbeddedImage>,
}

impl RecipeDocument {
    /// Read the PDF at `path` and extract its text (and images, if enabled).
    ///
    /// # Errors
    /// Returns [`ImportError::Extraction`] if:
    /// - The file does not exist or cannot be parsed as a PDF
    /// - The PDF is encrypted or has no pages
    /// - No text could be extracted and no usable image was found
    pub fn load(path: &Path, options: &ExtractOptions) -> Result<Self> {
        if !path.is_file() {
            return Err(ImportError::Extraction(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }

        let document = Document::load(path).map_err(|e| {
            ImportError::Extraction(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_document(path, &document, options)
    }

    fn from_document(path: &Path, document: &Document, options: &ExtractOptions) -> Result<Self> {
        if document.is_encrypted() {
            return Err(ImportError::Extraction(format!(
                "{} is encrypted",
                path.display()
            )));
        }

        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(ImportError::Extraction(format!(
                "{} has no pages",
                path.display()
            )));
        }
        info!("Reading {} page(s) from {}", pages.len(), path.display());

        let mut text = String::new();
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => {
                    text.push_str(page_text.trim_end());
                    text.push('\n');
                }
                Err(e) => warn!("Skipping text of page {}: {}", page_number, e),
            }
        }
        let extracted_text = text.trim().to_string();
        debug!("Extracted {} characters of text", extracted_text.len());

        let extracted_images = if options.include_images {
            collect_images(document, options)
        } else {
            Vec::new()
        };
        if !extracted_images.is_empty() {
            info!("Extracted {} embedded image(s)", extracted_images.len());
        }

        if extracted_text.is_empty() && extracted_images.is_empty() {
            return Err(ImportError::Extraction(format!(
                "No extractable text found in {}",
                path.display()
            )));
        }

        Ok(RecipeDocument {
            source_path: path.to_path_buf(),
            extracted_text,
            extracted_images,
        })
    }

    pub fn has_text(&self) -> bool {
        !self.extracted_text.is_empty()
    }
}

fn collect_images(document: &Document, options: &ExtractOptions) -> Vec<EmbeddedImage> {
    let mut images = Vec::new();
    let mut total_bytes = 0usize;

    // `objects` is ordered by object id, which keeps the output stable.
    for (id, object) in document.objects.iter() {
        if images.len() >= options.max_images {
            debug!("Image limit of {} reached", options.max_images);
            break;
        }

        let Object::Stream(stream) = object else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }

        let width = dimension(&stream.dict, b"Width");
        let height = dimension(&stream.dict, b"Height");
        if width < options.min_image_dimension || height < options.min_image_dimension {
            debug!("Skipping {}x{} image object {:?}", width, height, id);
            continue;
        }

        let encoded = encode_image(&stream.dict, &stream.content, width, height);
        let (data, media_type) = match encoded {
            Ok(encoded) => encoded,
            Err(reason) => {
                debug!("Skipping image object {:?}: {}", id, reason);
                continue;
            }
        };

        if total_bytes + data.len() > options.max_image_bytes {
            warn!(
                "Skipping image object {:?}: attached images would exceed {} bytes",
                id, options.max_image_bytes
            );
            continue;
        }
        total_bytes += data.len();

        images.push(EmbeddedImage {
            data,
            media_type,
            width,
            height,
        });
    }

    images
}

/// Turn an image stream into bytes a vision model accepts.
fn encode_image(
    dict: &Dictionary,
    content: &[u8],
    width: u32,
    height: u32,
) -> std::result::Result<(Vec<u8>, &'static str), String> {
    match filters(dict).as_slice() {
        [b"DCTDecode"] => Ok((content.to_vec(), "image/jpeg")),
        [b"FlateDecode", b"DCTDecode"] => Ok((inflate(content)?, "image/jpeg")),
        [] => Ok((encode_png(dict, content.to_vec(), width, height)?, "image/png")),
        [b"FlateDecode"] => {
            let pixels = inflate(content)?;
            Ok((encode_png(dict, pixels, width, height)?, "image/png"))
        }
        other => Err(format!(
            "unsupported filter chain {:?}",
            other
                .iter()
                .map(|f| String::from_utf8_lossy(f))
                .collect::<Vec<_>>()
        )),
    }
}

fn inflate(content: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut out = Vec::new();
    ZlibDecoder::new(content)
        .read_to_end(&mut out)
        .map_err(|e| format!("invalid FlateDecode data: {}", e))?;
    Ok(out)
}

fn encode_png(
    dict: &Dictionary,
    mut pixels: Vec<u8>,
    width: u32,
    height: u32,
) -> std::result::Result<Vec<u8>, String> {
    // PNG predictors would leave a filter byte in front of every row.
    if dict.get(b"DecodeParms").is_ok() {
        return Err("decode parameters are not supported".to_string());
    }
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(0);
    if bits != 8 {
        return Err(format!("{} bits per component", bits));
    }

    let color_space = dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .unwrap_or(&[]);
    let channels = match color_space {
        b"DeviceRGB" => 3,
        b"DeviceGray" => 1,
        other => {
            return Err(format!(
                "unsupported color space {}",
                String::from_utf8_lossy(other)
            ))
        }
    };

    let expected = width as usize * height as usize * channels;
    if pixels.len() < expected {
        return Err(format!(
            "{} bytes of pixel data, expected {}",
            pixels.len(),
            expected
        ));
    }
    pixels.truncate(expected);

    let image = if channels == 3 {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
    }
    .ok_or_else(|| "pixel buffer does not match dimensions".to_string())?;

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {}", e))?;
    Ok(buf)
}

fn is_image(dict: &Dictionary) -> bool {
    dict.get(b"Subtype")
        .and_then(Object::as_name)
        .map(|name| name == b"Image")
        .unwrap_or(false)
}

fn filters(dict: &Dictionary) -> Vec<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| f.as_name().ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0)
}
