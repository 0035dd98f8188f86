// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF scaler — shrink oversized pages and re-serialise with object streams
// using the `lopdf` crate.

use lopdf::{Dictionary, Document, Object, ObjectId, SaveOptions, Stream};
use packwerk_core::error::PackwerkError;
use tracing::{debug, info, instrument, warn};

/// Page boundary boxes rewritten when a page is scaled.
const PAGE_BOXES: [&[u8]; 5] = [b"MediaBox", b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Boxes a page may inherit from its ancestors in the page tree.
const INHERITABLE_BOXES: [&[u8]; 2] = [b"MediaBox", b"CropBox"];

/// Guard against cyclic /Parent chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Loads a PDF, scales its oversized pages, and writes it back out.
pub struct PdfScaler {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfScaler {
    // -- Construction ---------------------------------------------------------

    /// Parse a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PackwerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            PackwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height of a page (1-indexed) from its effective MediaBox.
    pub fn page_size(&self, page_number: u32) -> Result<(f64, f64), PackwerkError> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            PackwerkError::Pdf(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;
        self.media_box(page_id)
            .map(|rect| rect_size(&rect))
            .ok_or_else(|| PackwerkError::Pdf(format!("page {} has no MediaBox", page_number)))
    }

    // -- Scaling --------------------------------------------------------------

    /// Uniformly scale every page whose width or height exceeds
    /// `max_dimension`, using `min(max / width, max / height)`. Other pages
    /// are left untouched. Returns the number of pages scaled.
    #[instrument(skip(self))]
    pub fn scale_oversized_pages(&mut self, max_dimension: f64) -> Result<usize, PackwerkError> {
        let pages: Vec<(u32, ObjectId)> = self.document.get_pages().into_iter().collect();
        let mut scaled = 0;

        for (page_number, page_id) in pages {
            let Some(rect) = self.media_box(page_id) else {
                warn!(page_number, "page has no usable MediaBox, left untouched");
                continue;
            };
            let (width, height) = rect_size(&rect);
            if width <= max_dimension && height <= max_dimension {
                continue;
            }

            let scale = (max_dimension / width).min(max_dimension / height);
            self.scale_page(page_id, scale)?;
            scaled += 1;
            info!(page_number, width, height, scale, "Page scaled down");
        }

        Ok(scaled)
    }

    /// Scale one page's boxes, content, and annotation rectangles.
    fn scale_page(&mut self, page_id: ObjectId, scale: f64) -> Result<(), PackwerkError> {
        let (boxes, contents, annotations) = {
            let doc = &self.document;
            let page = doc.get_dictionary(page_id).map_err(|err| {
                PackwerkError::Pdf(format!("cannot read page object {:?}: {}", page_id, err))
            })?;

            let mut boxes: Vec<(&'static [u8], [f64; 4])> = Vec::new();
            for key in PAGE_BOXES {
                let value = if INHERITABLE_BOXES.contains(&key) {
                    inherited_attribute(doc, page_id, key)
                } else {
                    page.get(key).ok().map(|v| resolve(doc, v))
                };
                if let Some(rect) = value.and_then(rect_from_object) {
                    boxes.push((key, rect));
                }
            }

            // Content may be a single stream, an array of streams, or a
            // reference to such an array.
            let contents: Vec<Object> = match page.get(b"Contents") {
                Ok(Object::Reference(id)) => match doc.get_object(*id) {
                    Ok(Object::Array(items)) => items.clone(),
                    _ => vec![Object::Reference(*id)],
                },
                Ok(Object::Array(items)) => items.clone(),
                _ => Vec::new(),
            };

            let annotations: Vec<(ObjectId, [f64; 4])> = match page.get(b"Annots").map(|v| resolve(doc, v)) {
                Ok(Object::Array(items)) => items
                    .iter()
                    .filter_map(|item| item.as_reference().ok())
                    .filter_map(|id| {
                        let annot = doc.get_dictionary(id).ok()?;
                        let rect = annot.get(b"Rect").ok().and_then(|r| rect_from_object(resolve(doc, r)))?;
                        Some((id, rect))
                    })
                    .collect(),
                _ => Vec::new(),
            };

            (boxes, contents, annotations)
        };

        let wrapped_contents = if contents.is_empty() {
            None
        } else {
            let prologue = self.document.add_object(Stream::new(
                Dictionary::new(),
                format!("q\n{scale:.6} 0 0 {scale:.6} 0 0 cm\n").into_bytes(),
            ));
            let epilogue = self
                .document
                .add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

            let mut wrapped = Vec::with_capacity(contents.len() + 2);
            wrapped.push(Object::Reference(prologue));
            wrapped.extend(contents);
            wrapped.push(Object::Reference(epilogue));
            Some(wrapped)
        };

        let page = self.document.get_dictionary_mut(page_id).map_err(|err| {
            PackwerkError::Pdf(format!("cannot update page object {:?}: {}", page_id, err))
        })?;
        for (key, rect) in boxes {
            page.set(key, scaled_rect(&rect, scale));
        }
        if let Some(wrapped) = wrapped_contents {
            page.set("Contents", Object::Array(wrapped));
        }

        for (annot_id, rect) in annotations {
            if let Ok(annot) = self.document.get_dictionary_mut(annot_id) {
                annot.set("Rect", scaled_rect(&rect, scale));
            }
        }

        Ok(())
    }

    // -- Output ---------------------------------------------------------------

    /// Compress streams and serialise with object streams and a
    /// cross-reference stream.
    #[instrument(skip(self))]
    pub fn to_optimized_bytes(mut self) -> Result<Vec<u8>, PackwerkError> {
        self.document.compress();

        let options = SaveOptions::builder()
            .use_object_streams(true)
            .use_xref_streams(true)
            .build();

        let mut output = Vec::new();
        self.document
            .save_with_options(&mut output, options)
            .map_err(|err| PackwerkError::Pdf(format!("failed to serialise PDF: {}", err)))?;

        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    // -- Helpers --------------------------------------------------------------

    fn media_box(&self, page_id: ObjectId) -> Option<[f64; 4]> {
        inherited_attribute(&self.document, page_id, b"MediaBox").and_then(rect_from_object)
    }
}

/// Look up `key` on a page, walking up the /Parent chain for inherited values.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
    None
}

/// Follow a single indirect reference.
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn rect_from_object(object: &Object) -> Option<[f64; 4]> {
    let Object::Array(items) = object else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Some(rect)
}

fn rect_size(rect: &[f64; 4]) -> (f64, f64) {
    ((rect[2] - rect[0]).abs(), (rect[3] - rect[1]).abs())
}

/// Scale all four coordinates about the origin, matching the `cm` applied to
/// the page content.
fn scaled_rect(rect: &[f64; 4], scale: f64) -> Object {
    Object::Array(
        rect.iter()
            .map(|v| Object::Real((v * scale) as f32))
            .collect(),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a PDF with one page per `(width, height)` entry. When
    /// `inherit_media_box` is set, the first size is placed on the page tree
    /// root instead of on the pages.
    pub(crate) fn sample_pdf(sizes: &[(f32, f32)], inherit_media_box: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for &(width, height) in sizes {
            let content = doc.add_object(Stream::new(
                dictionary! {},
                b"0 0 m 100 100 l S".to_vec(),
            ));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content,
            };
            if !inherit_media_box {
                page.set("MediaBox", media_box(width, height));
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => sizes.len() as i64,
        };
        if inherit_media_box {
            let (width, height) = sizes[0];
            pages.set("MediaBox", media_box(width, height));
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("save sample pdf");
        out
    }

    fn media_box(width: f32, height: f32) -> Object {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ])
    }

    fn assert_size(scaler: &PdfScaler, page: u32, expected: (f64, f64)) {
        let (w, h) = scaler.page_size(page).expect("page size");
        assert!((w - expected.0).abs() < 0.01, "width {w} != {}", expected.0);
        assert!((h - expected.1).abs() < 0.01, "height {h} != {}", expected.1);
    }

    #[test]
    fn only_oversized_pages_are_scaled() {
        let pdf = sample_pdf(&[(2400.0, 1200.0), (612.0, 792.0)], false);
        let mut scaler = PdfScaler::from_bytes(&pdf).expect("load");

        assert_eq!(scaler.scale_oversized_pages(1200.0).expect("scale"), 1);
        assert_size(&scaler, 1, (1200.0, 600.0));
        assert_size(&scaler, 2, (612.0, 792.0));
    }

    #[test]
    fn inherited_media_box_is_scaled_on_the_page() {
        let pdf = sample_pdf(&[(1000.0, 3000.0)], true);
        let mut scaler = PdfScaler::from_bytes(&pdf).expect("load");

        assert_size(&scaler, 1, (1000.0, 3000.0));
        assert_eq!(scaler.scale_oversized_pages(1200.0).expect("scale"), 1);
        assert_size(&scaler, 1, (400.0, 1200.0));
    }

    #[test]
    fn scaled_content_is_wrapped_in_transform() {
        let pdf = sample_pdf(&[(2400.0, 2400.0)], false);
        let mut scaler = PdfScaler::from_bytes(&pdf).expect("load");
        scaler.scale_oversized_pages(1200.0).expect("scale");

        let page_id = scaler.document.get_pages()[&1];
        let page = scaler.document.get_dictionary(page_id).expect("page");
        let Ok(Object::Array(contents)) = page.get(b"Contents") else {
            panic!("contents should be an array");
        };
        assert_eq!(contents.len(), 3);

        let prologue_id = contents[0].as_reference().expect("reference");
        let Ok(Object::Stream(prologue)) = scaler.document.get_object(prologue_id) else {
            panic!("prologue should be a stream");
        };
        assert_eq!(prologue.content, b"q\n0.500000 0 0 0.500000 0 0 cm\n".to_vec());
    }

    #[test]
    fn annotation_rects_follow_the_page() {
        let pdf = sample_pdf(&[(2400.0, 1200.0)], false);
        let mut scaler = PdfScaler::from_bytes(&pdf).expect("load");

        let page_id = scaler.document.get_pages()[&1];
        let annot_id = scaler.document.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Square",
            "Rect" => vec![Object::Integer(100), Object::Integer(100), Object::Integer(300), Object::Integer(200)],
        });
        scaler
            .document
            .get_dictionary_mut(page_id)
            .expect("page")
            .set("Annots", vec![Object::Reference(annot_id)]);

        scaler.scale_oversized_pages(1200.0).expect("scale");

        let annot = scaler.document.get_dictionary(annot_id).expect("annot");
        let rect = rect_from_object(annot.get(b"Rect").expect("rect")).expect("numbers");
        assert_eq!(rect, [50.0, 50.0, 150.0, 100.0]);
    }

    #[test]
    fn optimized_output_reloads() {
        let pdf = sample_pdf(&[(3000.0, 2000.0), (500.0, 500.0), (1300.0, 100.0)], false);
        let mut scaler = PdfScaler::from_bytes(&pdf).expect("load");
        assert_eq!(scaler.scale_oversized_pages(1200.0).expect("scale"), 2);

        let bytes = scaler.to_optimized_bytes().expect("save");
        assert!(bytes.starts_with(b"%PDF"));

        let reloaded = PdfScaler::from_bytes(&bytes).expect("reload");
        assert_eq!(reloaded.page_count(), 3);
        assert_size(&reloaded, 1, (1200.0, 800.0));
        assert_size(&reloaded, 2, (500.0, 500.0));
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        let err = PdfScaler::from_bytes(b"%PDF-1.7 truncated").err().expect("should fail");
        assert!(matches!(err, PackwerkError::Pdf(_)));
    }
}
