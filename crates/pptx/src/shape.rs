//! Visual primitives placed on a slide and their DrawingML serialization.

use crate::config::inches;
use crate::theme::Rgb;
use slides_core::{Error, Result};
use std::fmt::Write as FmtWrite;

/// Map a formatting failure into our error type.
pub(crate) fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Escape text for XML content or attribute values.
///
/// Control characters that XML 1.0 cannot represent are dropped.
pub(crate) fn escape_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    quick_xml::escape::escape(&cleaned).into_owned()
}

/// Position and size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    /// Build a rectangle from inch measurements.
    pub fn inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(width),
            cy: inches(height),
        }
    }

    fn write_xfrm(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
        .map_err(xml_err)
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn as_attr(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Character and paragraph formatting for a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub font: Option<String>,
    pub align: Align,
    pub word_wrap: bool,
    pub anchor_top: bool,
}

impl TextStyle {
    /// Plain left-aligned text of the given size and color.
    pub fn new(size_pt: f64, color: Rgb) -> Self {
        Self {
            size_pt,
            bold: false,
            italic: false,
            color,
            font: None,
            align: Align::Left,
            word_wrap: false,
            anchor_top: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn wrapped(mut self) -> Self {
        self.word_wrap = true;
        self
    }

    pub fn anchored_top(mut self) -> Self {
        self.anchor_top = true;
        self
    }

    fn write_run_properties(&self, xml: &mut String) -> Result<()> {
        write!(xml, r#"<a:rPr lang="en-US" sz="{}""#, (self.size_pt * 100.0).round() as u32)
            .map_err(xml_err)?;
        if self.bold {
            xml.push_str(r#" b="1""#);
        }
        if self.italic {
            xml.push_str(r#" i="1""#);
        }
        xml.push_str(r#" dirty="0">"#);

        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            self.color.to_hex()
        )
        .map_err(xml_err)?;

        if let Some(ref font) = self.font {
            write!(xml, r#"<a:latin typeface="{}"/>"#, escape_text(font)).map_err(xml_err)?;
        }

        xml.push_str("</a:rPr>");
        Ok(())
    }
}

/// A shape on a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A text box; newlines in `text` become line breaks.
    TextBox {
        rect: Rect,
        text: String,
        style: TextStyle,
    },
    /// A filled rectangle with an optional outline.
    Rectangle {
        rect: Rect,
        fill: Rgb,
        outline: Option<Rgb>,
    },
    /// A picture referencing the slide's `image`-th embedded image.
    Picture {
        rect: Rect,
        image: usize,
        description: String,
    },
}

impl Shape {
    /// Convenience constructor for a text box.
    pub fn text_box(rect: Rect, text: impl Into<String>, style: TextStyle) -> Self {
        Shape::TextBox {
            rect,
            text: text.into(),
            style,
        }
    }

    /// Append this shape's `p:sp`/`p:pic` element.
    ///
    /// `image_rel_id` must be provided for pictures.
    pub(crate) fn write_xml(&self, xml: &mut String, id: u32, image_rel_id: Option<&str>) -> Result<()> {
        match self {
            Shape::TextBox { rect, text, style } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(xml, r#"<p:cNvPr id="{}" name="TextBox {}"/>"#, id, id).map_err(xml_err)?;
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

                xml.push_str("<p:spPr>");
                rect.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
                xml.push_str("</p:spPr>");

                xml.push_str("<p:txBody>");
                write!(
                    xml,
                    r#"<a:bodyPr wrap="{}" rtlCol="0""#,
                    if style.word_wrap { "square" } else { "none" }
                )
                .map_err(xml_err)?;
                if style.anchor_top {
                    xml.push_str(r#" anchor="t""#);
                }
                xml.push_str("><a:spAutoFit/></a:bodyPr><a:lstStyle/>");

                xml.push_str("<a:p>");
                if style.align != Align::Left {
                    write!(xml, r#"<a:pPr algn="{}"/>"#, style.align.as_attr()).map_err(xml_err)?;
                }
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        xml.push_str("<a:br>");
                        style.write_run_properties(xml)?;
                        xml.push_str("</a:br>");
                    }
                    xml.push_str("<a:r>");
                    style.write_run_properties(xml)?;
                    write!(xml, "<a:t>{}</a:t>", escape_text(line)).map_err(xml_err)?;
                    xml.push_str("</a:r>");
                }
                xml.push_str("</a:p>");
                xml.push_str("</p:txBody></p:sp>");
            }
            Shape::Rectangle {
                rect,
                fill,
                outline,
            } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(xml, r#"<p:cNvPr id="{}" name="Rectangle {}"/>"#, id, id).map_err(xml_err)?;
                xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr>");

                xml.push_str("<p:spPr>");
                rect.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill.to_hex())
                    .map_err(xml_err)?;
                if let Some(line) = outline {
                    write!(
                        xml,
                        r#"<a:ln><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                        line.to_hex()
                    )
                    .map_err(xml_err)?;
                }
                xml.push_str("</p:spPr></p:sp>");
            }
            Shape::Picture {
                rect, description, ..
            } => {
                let rel_id = image_rel_id.ok_or_else(|| {
                    Error::RenderError(format!("Picture {} has no image relationship", id))
                })?;

                xml.push_str("<p:pic><p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                    id,
                    id,
                    escape_text(description)
                )
                .map_err(xml_err)?;
                xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);

                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                    rel_id
                )
                .map_err(xml_err)?;

                xml.push_str("<p:spPr>");
                rect.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                xml.push_str("</p:spPr></p:pic>");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("bell\u{7}"), "bell");
        assert_eq!(escape_text("tab\tkept"), "tab\tkept");
    }

    #[test]
    fn test_text_box_xml() {
        let style = TextStyle::new(54.0, Rgb(0x58, 0xA6, 0xFF))
            .bold()
            .align(Align::Center)
            .wrapped()
            .font("Inter");
        let shape = Shape::text_box(Rect::inches(0.5, 1.5, 9.0, 1.5), "Hello <World>", style);

        let mut xml = String::new();
        shape.write_xml(&mut xml, 2, None).unwrap();

        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 2"/>"#));
        assert!(xml.contains(r#"<a:off x="457200" y="1371600"/>"#));
        assert!(xml.contains(r#"<a:ext cx="8229600" cy="1371600"/>"#));
        assert!(xml.contains(r#"wrap="square""#));
        assert!(xml.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(xml.contains(r#"sz="5400" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="58A6FF"/>"#));
        assert!(xml.contains(r#"<a:latin typeface="Inter"/>"#));
        assert!(xml.contains("<a:t>Hello &lt;World&gt;</a:t>"));
    }

    #[test]
    fn test_multiline_text_uses_breaks() {
        let shape = Shape::text_box(
            Rect::inches(0.0, 0.0, 1.0, 1.0),
            "one\ntwo\nthree",
            TextStyle::new(10.0, Rgb(0, 0, 0)),
        );

        let mut xml = String::new();
        shape.write_xml(&mut xml, 3, None).unwrap();

        assert_eq!(xml.matches("<a:br>").count(), 2);
        assert_eq!(xml.matches("<a:r>").count(), 3);
        assert!(!xml.contains("<a:pPr"));
        assert!(xml.contains(r#"wrap="none""#));
    }

    #[test]
    fn test_rectangle_xml() {
        let shape = Shape::Rectangle {
            rect: Rect::inches(0.5, 1.0, 9.0, 4.0),
            fill: Rgb(0xF5, 0xF5, 0xF5),
            outline: Some(Rgb(0x4E, 0xCD, 0xC4)),
        };

        let mut xml = String::new();
        shape.write_xml(&mut xml, 4, None).unwrap();

        assert!(xml.contains(r#"<a:solidFill><a:srgbClr val="F5F5F5"/></a:solidFill>"#));
        assert!(xml.contains(r#"<a:ln><a:solidFill><a:srgbClr val="4ECDC4"/></a:solidFill></a:ln>"#));
    }

    #[test]
    fn test_picture_requires_relationship() {
        let shape = Shape::Picture {
            rect: Rect::inches(0.5, 0.5, 9.0, 4.5),
            image: 0,
            description: "Flow".to_string(),
        };

        let mut xml = String::new();
        assert!(shape.write_xml(&mut xml, 5, None).is_err());

        let mut xml = String::new();
        shape.write_xml(&mut xml, 5, Some("rId2")).unwrap();
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"descr="Flow""#));
    }
}
