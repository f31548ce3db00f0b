use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Minimal SVG writer; callers only ever append.
#[derive(Debug)]
pub struct SvgDocument {
    body: String,
    width: u32,
    height: u32,
    font_family: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32, font_family: &str) -> Self {
        Self {
            body: String::new(),
            width,
            height,
            font_family: font_family.to_string(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            width.max(0.0),
            height.max(0.0),
            escape(fill)
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, stroke_width: f64) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{stroke_width:.2}"/>"#,
            escape(stroke)
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{}" fill-opacity="{opacity:.2}"/>"#,
            escape(fill)
        );
    }

    pub fn path(&mut self, data: &str, fill: &str, stroke: &str) {
        let _ = writeln!(
            self.body,
            r#"<path d="{}" fill="{}" stroke="{}"/>"#,
            escape(data),
            escape(fill),
            escape(stroke)
        );
    }

    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        anchor: Anchor,
        fill: &str,
    ) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{size:.1}" text-anchor="{}" fill="{}">{}</text>"#,
            anchor.as_str(),
            escape(fill),
            escape(content)
        );
    }

    /// Text rotated -90 degrees around its anchor, used for y-axis labels.
    pub fn vertical_text(&mut self, x: f64, y: f64, content: &str, size: f64, fill: &str) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{size:.1}" text-anchor="middle" fill="{}" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"#,
            escape(fill),
            escape(content)
        );
    }

    pub fn finish(self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{font}\">\n\
             {body}</svg>\n",
            w = self.width,
            h = self.height,
            font = escape(&self.font_family),
            body = self.body
        )
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
