//! PDF text layer and embedded page image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::Result;
use crate::error::PdfError;

/// A loaded PDF document.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
    max_pages: usize,
}

impl PdfExtractor {
    /// Load a PDF from bytes, decrypting documents protected by an empty password.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document,
            raw_data,
            max_pages: 0,
        })
    }

    /// Limit the number of pages processed (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Page numbers (1-indexed) within the page limit.
    pub fn page_numbers(&self) -> Vec<u32> {
        let pages = self.document.get_pages().into_keys();
        if self.max_pages == 0 {
            pages.collect()
        } else {
            pages.take(self.max_pages).collect()
        }
    }

    /// Text layer of a single page.
    pub fn page_text(&self, page: u32) -> Result<String> {
        if !self.document.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Text layer of all pages joined with newlines.
    ///
    /// Falls back to whole-document extraction with pdf-extract when the
    /// per-page pass yields nothing.
    pub fn extract_text(&self) -> Result<String> {
        let pages: Vec<String> = self
            .page_numbers()
            .into_iter()
            .filter_map(|page| match self.page_text(page) {
                Ok(text) => Some(text.trim().to_string()),
                Err(e) => {
                    trace!("No text layer on page {}: {}", page, e);
                    None
                }
            })
            .filter(|text| !text.is_empty())
            .collect();

        if !pages.is_empty() {
            return Ok(pages.join("\n"));
        }

        debug!("Per-page text extraction empty, trying pdf-extract");
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text.trim().to_string())
    }

    /// One image per page for OCR: the largest embedded image of each page.
    ///
    /// When no page references an image XObject, every image stream in the
    /// document is returned in object order.
    pub fn page_images(&self) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        for page in self.page_numbers() {
            let largest = self
                .images_on_page(page)
                .into_iter()
                .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()));

            if let Some(img) = largest {
                trace!("Page {} image: {}x{}", page, img.width(), img.height());
                images.push(img);
            }
        }

        if images.is_empty() {
            debug!("No page XObject images found, scanning all objects");
            images = self.all_images();
        }

        debug!("Collected {} page images", images.len());
        images
    }

    fn images_on_page(&self, page: u32) -> Vec<DynamicImage> {
        let doc = &self.document;
        let Some(page_id) = doc.get_pages().get(&page).copied() else {
            return Vec::new();
        };

        let Some(resources) = page_resources(doc, page_id) else {
            return Vec::new();
        };

        let Ok(xobjects) = resources.get(b"XObject") else {
            return Vec::new();
        };

        let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) else {
            return Vec::new();
        };

        xobj_dict
            .iter()
            .filter_map(|(_, obj_ref)| doc.dereference(obj_ref).ok())
            .filter_map(|(_, obj)| decode_image(doc, obj))
            .collect()
    }

    fn all_images(&self) -> Vec<DynamicImage> {
        self.document
            .objects
            .values()
            .filter_map(|obj| decode_image(&self.document, obj))
            .collect()
    }
}

/// Resources dictionary of a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            trace!("Decoding JPEG image {}x{}", width, height);
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    raw_to_image(data, width, height, color_space)
}

fn raw_to_image(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = width as usize * height as usize;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode raw image: colorspace={}, len={}, pixels={}",
                String::from_utf8_lossy(color_space),
                data.len(),
                pixels
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            PdfExtractor::load(b"definitely not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_raw_gray_image() {
        let img = raw_to_image(vec![0, 255, 128, 64, 9], 2, 2, b"DeviceGray").unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.to_luma8().get_pixel(1, 0).0, [255]);
    }

    #[test]
    fn test_raw_rgb_too_short() {
        assert!(raw_to_image(vec![0; 5], 2, 2, b"DeviceRGB").is_none());
        assert!(raw_to_image(vec![0; 16], 2, 2, b"DeviceCMYK").is_none());
    }
}
