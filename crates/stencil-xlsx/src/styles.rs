//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use stencil_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, VerticalAlignment,
    FIRST_CUSTOM_FORMAT_ID,
};
use stencil_core::Workbook;

// === Writing ===

/// Workbook-wide `cellXfs` table built from every sheet's style pool
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Deduplicated styles; index is the xf id
    styles: Vec<Style>,
    /// Per sheet: local style index -> xf id
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();
        style_to_xf.insert(Style::default(), 0);

        let mut sheet_maps = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            let cell_styles = sheet.iter_cells().map(|(_, _, cell)| cell.style_index);
            let column_styles = sheet.columns().filter_map(|c| c.style_index);

            for local_idx in cell_styles.chain(column_styles) {
                if map.contains_key(&local_idx) {
                    continue;
                }
                let style = sheet.style_by_index(local_idx).cloned().unwrap_or_default();
                let xf_id = *style_to_xf.entry(style.clone()).or_insert_with(|| {
                    styles.push(style);
                    styles.len() as u32 - 1
                });
                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.styles.len()
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = vec![FontStyle::default()];
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        font_ids.insert(FontStyle::default(), 0);

        // The first two fills are reserved: none and gray125
        let mut fills = vec![
            FillStyle::None,
            FillStyle::Pattern {
                pattern: PatternType::Gray125,
                foreground: Color::Auto,
                background: Color::Auto,
            },
        ];
        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        fill_ids.insert(FillStyle::None, 0);

        let mut borders = vec![BorderStyle::default()];
        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        border_ids.insert(BorderStyle::default(), 0);

        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();

        let mut resolved = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = *font_ids.entry(style.font.clone()).or_insert_with(|| {
                fonts.push(style.font.clone());
                fonts.len() as u32 - 1
            });

            let fill_id = *fill_ids.entry(style.fill.clone()).or_insert_with(|| {
                fills.push(style.fill.clone());
                fills.len() as u32 - 1
            });

            let border_id = *border_ids.entry(style.border.clone()).or_insert_with(|| {
                borders.push(style.border.clone());
                borders.len() as u32 - 1
            });

            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                    let id = FIRST_CUSTOM_FORMAT_ID + numfmts.len() as u32;
                    numfmts.push((id, code.clone()));
                    id
                }),
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                border_id,
                num_fmt_id,
            });
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
        for fill in &fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " auto=\"1\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!(" rgb=\"{}\"", color.to_argb_hex().unwrap_or_default())
        }
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint: 0 } => format!(" theme=\"{}\"", index),
        Color::Theme { index, tint } => {
            format!(" theme=\"{}\" tint=\"{}\"", index, f64::from(*tint) / 1000.0)
        }
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{}{}/>", tag, color_attrs(color))
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if font.color != Color::Auto {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => {
            let mut s = format!("<fill><patternFill patternType=\"{}\"", pattern.as_xlsx());
            if *foreground == Color::Auto && *background == Color::Auto {
                s.push_str("/></fill>");
                return s;
            }
            s.push('>');
            if *foreground != Color::Auto {
                s.push_str(&write_color("fgColor", foreground));
            }
            if *background != Color::Auto {
                s.push_str(&write_color("bgColor", background));
            }
            s.push_str("</patternFill></fill>");
            s
        }
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        None => format!("<{}/>", tag),
        Some(edge) if edge.color == Color::Auto => {
            format!("<{} style=\"{}\"/>", tag, edge.style.as_xlsx())
        }
        Some(edge) => format!(
            "<{} style=\"{}\">{}</{}>",
            tag,
            edge.style.as_xlsx(),
            write_color("color", &edge.color),
            tag
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    if al.is_default() {
        return String::new();
    }
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_xlsx()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_xlsx()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if ids.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let head = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        format!("{}/>", head)
    } else {
        format!("{}>{}</xf>", head, alignment_xml)
    }
}

// === Reading ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

#[derive(Debug, Clone, Copy)]
struct RawXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Alignment,
}

/// Incremental styles.xml parser; `Empty` events are fed as start + end
#[derive(Debug)]
struct StylesParser {
    section: Section,
    numfmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    xfs: Vec<RawXf>,

    current_font: Option<FontStyle>,
    fill_pattern: Option<PatternType>,
    fill_fg: Color,
    fill_bg: Color,
    current_border: Option<BorderStyle>,
    border_edge: Option<&'static str>,
    current_xf: Option<RawXf>,
}

impl StylesParser {
    fn new() -> Self {
        Self {
            section: Section::Other,
            numfmts: HashMap::new(),
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            xfs: Vec::new(),
            current_font: None,
            fill_pattern: None,
            fill_fg: Color::Auto,
            fill_bg: Color::Auto,
            current_border: None,
            border_edge: None,
            current_xf: None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match (self.section, name.as_ref()) {
            (_, b"numFmts") => self.section = Section::NumFmts,
            (_, b"fonts") => self.section = Section::Fonts,
            (_, b"fills") => self.section = Section::Fills,
            (_, b"borders") => self.section = Section::Borders,
            (_, b"cellXfs") => self.section = Section::CellXfs,
            (_, b"cellStyleXfs") | (_, b"dxfs") | (_, b"colors") | (_, b"extLst") => {
                self.section = Section::Other
            }

            (Section::NumFmts, b"numFmt") => {
                let id = attr_value(e, b"numFmtId").and_then(|v| v.parse().ok());
                let code = attr_value(e, b"formatCode");
                if let (Some(id), Some(code)) = (id, code) {
                    self.numfmts.insert(id, code);
                }
            }

            (Section::Fonts, b"font") => {
                self.current_font = Some(FontStyle::default());
            }
            (Section::Fonts, tag) => {
                if let Some(font) = self.current_font.as_mut() {
                    let val = attr_value(e, b"val");
                    let on = val.as_deref().map_or(true, |v| v != "0" && v != "false");
                    match tag {
                        b"b" => font.bold = on,
                        b"i" => font.italic = on,
                        b"strike" => font.strikethrough = on,
                        b"u" => font.underline = val.as_deref() != Some("none"),
                        b"sz" => {
                            if let Some(size) = val.and_then(|v| v.parse::<f64>().ok()) {
                                font.size = size;
                            }
                        }
                        b"name" => {
                            if let Some(name) = val {
                                font.name = name;
                            }
                        }
                        b"color" => font.color = parse_color_attrs(e),
                        _ => {}
                    }
                }
            }

            (Section::Fills, b"fill") => {
                self.fill_pattern = None;
                self.fill_fg = Color::Auto;
                self.fill_bg = Color::Auto;
            }
            (Section::Fills, b"patternFill") => {
                self.fill_pattern =
                    attr_value(e, b"patternType").and_then(|v| PatternType::from_xlsx(&v));
            }
            (Section::Fills, b"fgColor") => self.fill_fg = parse_color_attrs(e),
            (Section::Fills, b"bgColor") => self.fill_bg = parse_color_attrs(e),

            (Section::Borders, b"border") => self.current_border = Some(BorderStyle::default()),
            (Section::Borders, b"left" | b"start") => self.start_edge(e, "left"),
            (Section::Borders, b"right" | b"end") => self.start_edge(e, "right"),
            (Section::Borders, b"top") => self.start_edge(e, "top"),
            (Section::Borders, b"bottom") => self.start_edge(e, "bottom"),
            (Section::Borders, b"color") => {
                let color = parse_color_attrs(e);
                if let (Some(border), Some(edge)) = (self.current_border.as_mut(), self.border_edge)
                {
                    if let Some(edge) = border_edge_mut(border, edge).as_mut() {
                        edge.color = color;
                    }
                }
            }

            (Section::CellXfs, b"xf") => {
                let id = |key: &[u8]| {
                    attr_value(e, key)
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0)
                };
                self.current_xf = Some(RawXf {
                    num_fmt_id: id(b"numFmtId"),
                    font_id: id(b"fontId") as usize,
                    fill_id: id(b"fillId") as usize,
                    border_id: id(b"borderId") as usize,
                    alignment: Alignment::default(),
                });
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = self.current_xf.as_mut() {
                    for attr in e.attributes().flatten() {
                        let val = match attr.unescape_value() {
                            Ok(v) => v,
                            Err(_) => continue,
                        };
                        match attr.key.as_ref() {
                            b"horizontal" => {
                                if let Some(h) = HorizontalAlignment::from_xlsx(&val) {
                                    xf.alignment.horizontal = h;
                                }
                            }
                            b"vertical" => {
                                if let Some(v) = VerticalAlignment::from_xlsx(&val) {
                                    xf.alignment.vertical = v;
                                }
                            }
                            b"wrapText" => xf.alignment.wrap_text = val == "1" || val == "true",
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn start_edge(&mut self, e: &BytesStart<'_>, edge: &'static str) {
        let Some(border) = self.current_border.as_mut() else {
            return;
        };
        self.border_edge = Some(edge);
        let style = attr_value(e, b"style").and_then(|v| BorderLineStyle::from_xlsx(&v));
        *border_edge_mut(border, edge) = style.map(|style| BorderEdge {
            style,
            color: Color::Auto,
        });
    }

    fn end(&mut self, name: &[u8]) {
        match (self.section, name) {
            (_, b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs") => {
                self.section = Section::Other
            }
            (Section::Fonts, b"font") => {
                if let Some(font) = self.current_font.take() {
                    self.fonts.push(font);
                }
            }
            (Section::Fills, b"fill") => {
                self.fills
                    .push(finalize_fill(self.fill_pattern, self.fill_fg, self.fill_bg));
            }
            (Section::Borders, b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom") => {
                self.border_edge = None;
            }
            (Section::Borders, b"border") => {
                if let Some(border) = self.current_border.take() {
                    self.borders.push(border);
                }
            }
            (Section::CellXfs, b"xf") => {
                if let Some(xf) = self.current_xf.take() {
                    self.xfs.push(xf);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Vec<Style> {
        let numfmts = self.numfmts;
        let styles: Vec<Style> = self
            .xfs
            .iter()
            .map(|xf| Style {
                font: self.fonts.get(xf.font_id).cloned().unwrap_or_default(),
                fill: self.fills.get(xf.fill_id).cloned().unwrap_or_default(),
                border: self.borders.get(xf.border_id).cloned().unwrap_or_default(),
                alignment: xf.alignment,
                number_format: NumberFormat::from_id(xf.num_fmt_id, |id| numfmts.get(&id).cloned()),
            })
            .collect();

        if styles.is_empty() {
            vec![Style::default()]
        } else {
            styles
        }
    }
}

/// Parse styles.xml into one [`Style`] per `cellXfs` entry
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parser = StylesParser::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.start(&e),
            Ok(Event::Empty(e)) => {
                parser.start(&e);
                parser.end(e.name().as_ref());
            }
            Ok(Event::End(e)) => parser.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.finish())
}

pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> FillStyle {
    match pattern {
        None | Some(PatternType::None) => FillStyle::None,
        Some(PatternType::Solid) => FillStyle::Solid { color: fg },
        Some(pattern) => FillStyle::Pattern {
            pattern,
            foreground: fg,
            background: bg,
        },
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    let mut color = Color::Auto;
    let mut tint = 0i16;

    for attr in e.attributes().flatten() {
        let val = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"rgb" => {
                if let Some(c) = Color::from_hex(&val) {
                    color = c;
                }
            }
            b"theme" => {
                if let Ok(index) = val.parse::<u8>() {
                    color = Color::theme(index, 0);
                }
            }
            b"indexed" => {
                if let Ok(i) = val.parse::<u8>() {
                    color = Color::Indexed(i);
                }
            }
            b"tint" => {
                if let Ok(t) = val.parse::<f64>() {
                    tint = (t.clamp(-1.0, 1.0) * 1000.0).round() as i16;
                }
            }
            _ => {}
        }
    }

    match color {
        Color::Theme { index, .. } => Color::theme(index, tint),
        other => other,
    }
}

fn border_edge_mut<'a>(border: &'a mut BorderStyle, edge: &str) -> &'a mut Option<BorderEdge> {
    match edge {
        "left" => &mut border.left,
        "right" => &mut border.right,
        "top" => &mut border.top,
        _ => &mut border.bottom,
    }
}
