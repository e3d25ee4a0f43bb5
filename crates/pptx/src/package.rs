//! OOXML package writer.
//!
//! Serializes laid-out slides into the parts of a .pptx ZIP archive.

use crate::image::{ImageFormat, LoadedImage};
use crate::shape::{escape_text, xml_err, Shape};
use crate::template::{self, content_types, rel_types};
use crate::theme::Rgb;
use slides_core::{Error, Result};
use std::fmt::Write as FmtWrite;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Document properties written to `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
}

/// A fully laid-out slide: background, shapes and the images they reference.
#[derive(Debug, Clone)]
pub struct SlideCanvas {
    pub background: Rgb,
    pub shapes: Vec<Shape>,
    pub images: Vec<LoadedImage>,
}

impl SlideCanvas {
    /// Create an empty slide with a solid background.
    pub fn new(background: Rgb) -> Self {
        Self {
            background,
            shapes: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Add a shape.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Embed an image and return the index a [`Shape::Picture`] should use.
    pub fn embed(&mut self, image: LoadedImage) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }
}

/// A relationship entry for a `.rels` part.
struct Relationship<'a> {
    id: String,
    rel_type: &'a str,
    target: String,
}

/// Writes parts into a ZIP archive.
struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions,
}

impl<W: Write + Seek> PackageWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn write_part(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
        self.zip.write_all(content)?;
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }
}

/// Write a complete presentation package and return the underlying writer.
pub fn write_package<W: Write + Seek>(
    writer: W,
    slides: &[SlideCanvas],
    slide_size: (i64, i64),
    metadata: &PresentationMetadata,
) -> Result<W> {
    let mut package = PackageWriter::new(writer);

    package.write_part("[Content_Types].xml", content_types_xml(slides)?.as_bytes())?;
    package.write_part("_rels/.rels", package_rels_xml()?.as_bytes())?;
    package.write_part("docProps/core.xml", core_props_xml(metadata).as_bytes())?;
    package.write_part("docProps/app.xml", app_props_xml(slides.len())?.as_bytes())?;

    package.write_part("ppt/presentation.xml", presentation_xml(slides.len(), slide_size)?.as_bytes())?;
    package.write_part(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels_xml(slides.len())?.as_bytes(),
    )?;

    package.write_part("ppt/slideMasters/slideMaster1.xml", template::SLIDE_MASTER_XML.as_bytes())?;
    package.write_part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        template::SLIDE_MASTER_RELS.as_bytes(),
    )?;
    package.write_part("ppt/slideLayouts/slideLayout1.xml", template::BLANK_LAYOUT_XML.as_bytes())?;
    package.write_part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        template::BLANK_LAYOUT_RELS.as_bytes(),
    )?;
    package.write_part("ppt/theme/theme1.xml", template::THEME_XML.as_bytes())?;

    let mut media_counter = 0;
    for (idx, slide) in slides.iter().enumerate() {
        let number = idx + 1;

        let mut media_targets = Vec::with_capacity(slide.images.len());
        for image in &slide.images {
            media_counter += 1;
            let name = format!("image{}.{}", media_counter, image.format.extension());
            package.write_part(&format!("ppt/media/{}", name), &image.data)?;
            media_targets.push(format!("../media/{}", name));
        }

        package.write_part(
            &format!("ppt/slides/slide{}.xml", number),
            slide_xml(slide)?.as_bytes(),
        )?;
        package.write_part(
            &format!("ppt/slides/_rels/slide{}.xml.rels", number),
            slide_rels_xml(&media_targets)?.as_bytes(),
        )?;
    }

    log::debug!("Wrote {} slides, {} media parts", slides.len(), media_counter);

    package.finish()
}

/// Relationship id of the `index`-th image on a slide (rId1 is the layout).
fn image_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

fn relationships_xml(rels: &[Relationship<'_>]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(template::XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{}">"#, template::NS_PACKAGE_RELATIONSHIPS).map_err(xml_err)?;
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id, rel.rel_type, rel.target
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn content_types_xml(slides: &[SlideCanvas]) -> Result<String> {
    let mut formats: Vec<ImageFormat> = Vec::new();
    for format in slides.iter().flat_map(|s| s.images.iter().map(|i| i.format)) {
        if !formats.contains(&format) {
            formats.push(format);
        }
    }

    let mut xml = String::with_capacity(2048);
    xml.push_str(template::XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);

    write!(xml, r#"<Default Extension="rels" ContentType="{}"/>"#, content_types::RELATIONSHIPS)
        .map_err(xml_err)?;
    write!(xml, r#"<Default Extension="xml" ContentType="{}"/>"#, content_types::XML).map_err(xml_err)?;
    for format in formats {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.content_type()
        )
        .map_err(xml_err)?;
    }

    let overrides = [
        ("/ppt/presentation.xml", content_types::PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", content_types::SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", content_types::SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", content_types::THEME),
        ("/docProps/core.xml", content_types::CORE_PROPERTIES),
        ("/docProps/app.xml", content_types::EXTENDED_PROPERTIES),
    ];
    for (part, content_type) in overrides {
        write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, part, content_type)
            .map_err(xml_err)?;
    }
    for number in 1..=slides.len() {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            number,
            content_types::SLIDE
        )
        .map_err(xml_err)?;
    }

    xml.push_str("</Types>");
    Ok(xml)
}

fn package_rels_xml() -> Result<String> {
    relationships_xml(&[
        Relationship {
            id: "rId1".to_string(),
            rel_type: rel_types::OFFICE_DOCUMENT,
            target: "ppt/presentation.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: rel_types::CORE_PROPERTIES,
            target: "docProps/core.xml".to_string(),
        },
        Relationship {
            id: "rId3".to_string(),
            rel_type: rel_types::EXTENDED_PROPERTIES,
            target: "docProps/app.xml".to_string(),
        },
    ])
}

fn core_props_xml(metadata: &PresentationMetadata) -> String {
    let mut xml = String::with_capacity(768);
    xml.push_str(template::XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    xml.push_str(&format!("<dc:title>{}</dc:title>", escape_text(&metadata.title)));
    xml.push_str(&format!("<dc:subject>{}</dc:subject>", escape_text(&metadata.subject)));
    xml.push_str(&format!("<dc:creator>{}</dc:creator>", escape_text(&metadata.author)));
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_props_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(template::XML_DECLARATION);
    xml.push_str(concat!(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
        r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#
    ));
    write!(xml, "<Application>{}</Application>", env!("CARGO_PKG_NAME")).map_err(xml_err)?;
    write!(xml, "<Slides>{}</Slides>", slide_count).map_err(xml_err)?;
    xml.push_str("</Properties>");
    Ok(xml)
}

fn presentation_xml(slide_count: usize, (cx, cy): (i64, i64)) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(template::XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        template::NS_DRAWINGML,
        template::NS_RELATIONSHIPS,
        template::NS_PRESENTATIONML
    )
    .map_err(xml_err)?;

    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for idx in 0..slide_count {
            // rId1 is the master and rId2 the theme
            write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + idx, idx + 3).map_err(xml_err)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy).map_err(xml_err)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut rels = vec![
        Relationship {
            id: "rId1".to_string(),
            rel_type: rel_types::SLIDE_MASTER,
            target: "slideMasters/slideMaster1.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: rel_types::THEME,
            target: "theme/theme1.xml".to_string(),
        },
    ];
    rels.extend((0..slide_count).map(|idx| Relationship {
        id: format!("rId{}", idx + 3),
        rel_type: rel_types::SLIDE,
        target: format!("slides/slide{}.xml", idx + 1),
    }));

    relationships_xml(&rels)
}

fn slide_rels_xml(media_targets: &[String]) -> Result<String> {
    let mut rels = vec![Relationship {
        id: "rId1".to_string(),
        rel_type: rel_types::SLIDE_LAYOUT,
        target: "../slideLayouts/slideLayout1.xml".to_string(),
    }];
    rels.extend(media_targets.iter().enumerate().map(|(idx, target)| Relationship {
        id: image_rel_id(idx),
        rel_type: rel_types::IMAGE,
        target: target.clone(),
    }));

    relationships_xml(&rels)
}

fn slide_xml(slide: &SlideCanvas) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(template::XML_DECLARATION);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        template::NS_DRAWINGML,
        template::NS_RELATIONSHIPS,
        template::NS_PRESENTATIONML
    )
    .map_err(xml_err)?;

    xml.push_str("<p:cSld>");

    // Background must come before the shape tree
    write!(
        xml,
        r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
        slide.background.to_hex()
    )
    .map_err(xml_err)?;

    xml.push_str("<p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    for (idx, shape) in slide.shapes.iter().enumerate() {
        // The group shape owns id 1
        let id = idx as u32 + 2;
        let rel_id = match shape {
            Shape::Picture { image, .. } if *image < slide.images.len() => Some(image_rel_id(*image)),
            Shape::Picture { image, .. } => {
                return Err(Error::RenderError(format!(
                    "Picture references missing image {}",
                    image
                )));
            }
            _ => None,
        };
        shape.write_xml(&mut xml, id, rel_id.as_deref())?;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:sld>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Rect, TextStyle};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn sample_slide() -> SlideCanvas {
        let mut slide = SlideCanvas::new(Rgb(0x0D, 0x11, 0x17));
        slide.push(Shape::text_box(
            Rect::inches(0.5, 0.5, 9.0, 1.0),
            "Hello",
            TextStyle::new(40.0, Rgb(0xFF, 0xFF, 0xFF)),
        ));
        slide
    }

    #[test]
    fn test_package_parts() {
        let metadata = PresentationMetadata {
            title: "Talk & Demo".to_string(),
            author: "Sam".to_string(),
            subject: String::new(),
        };
        let slides = vec![sample_slide(), sample_slide()];
        let cursor = write_package(Cursor::new(Vec::new()), &slides, (9_144_000, 5_143_500), &metadata)
            .unwrap();
        let bytes = cursor.into_inner();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(names.contains(&expected), "missing part {}", expected);
        }

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(presentation.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
        assert!(presentation.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Talk &amp; Demo</dc:title>"));
        assert!(core.contains("<dc:creator>Sam</dc:creator>"));

        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="0D1117"/>"#));
        assert!(slide.contains("<a:t>Hello</a:t>"));
    }

    #[test]
    fn test_embedded_image_parts() {
        let mut slide = sample_slide();
        let index = slide.embed(LoadedImage {
            data: vec![1, 2, 3],
            format: ImageFormat::Png,
            width_px: 2,
            height_px: 1,
        });
        slide.push(Shape::Picture {
            rect: Rect::inches(0.5, 0.5, 9.0, 4.5),
            image: index,
            description: "Flow".to_string(),
        });

        let cursor = write_package(
            Cursor::new(Vec::new()),
            &[slide],
            (9_144_000, 5_143_500),
            &PresentationMetadata::default(),
        )
        .unwrap();
        let bytes = cursor.into_inner();

        let content_types = read_part(&bytes, "[Content_Types].xml");
        assert!(content_types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));

        let rels = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains(r#"Target="../media/image1.png""#));

        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains(r#"<a:blip r:embed="rId2"/>"#));

        assert_eq!(read_part(&bytes, "ppt/media/image1.png").as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_dangling_picture_is_rejected() {
        let mut slide = sample_slide();
        slide.push(Shape::Picture {
            rect: Rect::inches(0.0, 0.0, 1.0, 1.0),
            image: 3,
            description: String::new(),
        });

        assert!(slide_xml(&slide).is_err());
    }
}
