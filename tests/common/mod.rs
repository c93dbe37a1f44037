#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bytes that look enough like a JPEG for the extractor (it never decodes them).
pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9];

pub const PANCAKES: &[&str] = &[
    "Fluffy Pancakes",
    "Serves 4",
    "2 eggs",
    "1 cup flour",
    "1 cup milk",
    "Whisk everything together and fry in a hot pan.",
];

/// How an image XObject is stored in a fixture
#[derive(Debug, Clone, Copy)]
pub enum Encoding {
    /// `DCTDecode` with [`FAKE_JPEG`] as content
    Jpeg,
    /// `FlateDecode` over solid orange 8-bit RGB pixels
    FlateRgb,
}

/// Write a one-page PDF with one text line per entry in `lines` and one
/// JPEG image XObject per `(width, height)` entry in `images`.
pub fn write_pdf(dir: &Path, name: &str, lines: &[&str], images: &[(i64, i64)]) -> PathBuf {
    let images: Vec<_> = images
        .iter()
        .map(|(width, height)| (Encoding::Jpeg, *width, *height))
        .collect();
    write_pdf_with(dir, name, lines, &images)
}

/// Like [`write_pdf`], with the storage of each image chosen by the caller.
pub fn write_pdf_with(
    dir: &Path,
    name: &str,
    lines: &[&str],
    images: &[(Encoding, i64, i64)],
) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new(
            "Td",
            vec![72.into(), (760 - 16 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }

    let mut xobjects = lopdf::Dictionary::new();
    for (i, (encoding, width, height)) in images.iter().enumerate() {
        let (filter, data) = match encoding {
            Encoding::Jpeg => ("DCTDecode", FAKE_JPEG.to_vec()),
            Encoding::FlateRgb => {
                let pixels = [255u8, 140, 0].repeat((*width * *height) as usize);
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&pixels).expect("compress pixels");
                ("FlateDecode", encoder.finish().expect("compress pixels"))
            }
        };
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => *width,
                "Height" => *height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => filter,
            },
            data,
        ));
        let name = format!("Im{}", i + 1);
        xobjects.set(name.as_bytes().to_vec(), image_id);

        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                (*width).into(),
                0.into(),
                0.into(),
                (*height).into(),
                72.into(),
                300.into(),
            ],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
        "XObject" => xobjects,
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("save fixture pdf");
    path
}

/// A chat-completions response whose content is the given recipe JSON.
pub fn openai_body(recipe_json: &str) -> String {
    serde_json::json!({
        "choices": [{
            "message": {"role": "assistant", "content": recipe_json}
        }]
    })
    .to_string()
}

pub const PANCAKES_JSON: &str = r#"{"title":"Fluffy Pancakes","servings":4,"ingredients":[{"amount":2,"unit":null,"item":"eggs"},{"amount":1,"unit":"cup","item":"flour"},{"amount":1,"unit":"cup","item":"milk"}],"instructions":["Whisk everything together.","Fry in a hot pan."],"tags":["breakfast"]}"#;
