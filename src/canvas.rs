//! Drawing capability the renderer writes through.
//!
//! [`Canvas`] is the small set of primitives the layout needs; [`SvgCanvas`]
//! implements it over an in-memory string. Other sinks (a response body, a
//! recording double in tests) implement the same trait.

use std::fmt::{self, Write};

/// A single `name="value"` attribute.
pub type Attr<'a> = (&'a str, &'a str);

pub trait Canvas {
    /// Open the document.
    fn start(&mut self, width: f64, height: f64) -> fmt::Result;

    /// Close the document.
    fn end(&mut self) -> fmt::Result;

    fn group(&mut self, attrs: &[Attr<'_>]) -> fmt::Result;

    fn group_end(&mut self) -> fmt::Result;

    /// Plain text; `content` is escaped by the canvas.
    fn text(&mut self, x: f64, y: f64, content: &str, attrs: &[Attr<'_>]) -> fmt::Result;

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, attrs: &[Attr<'_>]) -> fmt::Result;

    fn circle(&mut self, cx: f64, cy: f64, r: f64, attrs: &[Attr<'_>]) -> fmt::Result;

    /// Quadratic curve from `start` through control point `control` to `end`.
    fn quadratic_bezier(
        &mut self,
        start: (f64, f64),
        control: (f64, f64),
        end: (f64, f64),
        attrs: &[Attr<'_>],
    ) -> fmt::Result;

    /// Raw markup escape hatch (styles, mixed-style text runs).
    fn writer(&mut self) -> &mut dyn fmt::Write;
}

// ═══════════════════════════════════════════════════════════════════════
// SvgCanvas
// ═══════════════════════════════════════════════════════════════════════

/// Accumulates SVG markup in a `String`.
#[derive(Debug, Default)]
pub struct SvgCanvas {
    buf: String,
    depth: usize,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    fn attrs(&mut self, attrs: &[Attr<'_>]) -> fmt::Result {
        for (name, value) in attrs {
            write!(self.buf, r#" {}="{}""#, name, escape_attr(value))?;
        }
        Ok(())
    }
}

impl Canvas for SvgCanvas {
    fn start(&mut self, width: f64, height: f64) -> fmt::Result {
        let (w, h) = (num(width), num(height));
        writeln!(
            self.buf,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#
        )?;
        self.depth = 1;
        Ok(())
    }

    fn end(&mut self) -> fmt::Result {
        self.depth = 0;
        self.buf.push_str("</svg>\n");
        Ok(())
    }

    fn group(&mut self, attrs: &[Attr<'_>]) -> fmt::Result {
        self.indent();
        self.buf.push_str("<g");
        self.attrs(attrs)?;
        self.buf.push_str(">\n");
        self.depth += 1;
        Ok(())
    }

    fn group_end(&mut self) -> fmt::Result {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buf.push_str("</g>\n");
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, content: &str, attrs: &[Attr<'_>]) -> fmt::Result {
        self.indent();
        write!(self.buf, r#"<text x="{}" y="{}""#, num(x), num(y))?;
        self.attrs(attrs)?;
        writeln!(self.buf, ">{}</text>", escape_text(content))
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, attrs: &[Attr<'_>]) -> fmt::Result {
        self.indent();
        write!(
            self.buf,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
            num(x1),
            num(y1),
            num(x2),
            num(y2)
        )?;
        self.attrs(attrs)?;
        self.buf.push_str("/>\n");
        Ok(())
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, attrs: &[Attr<'_>]) -> fmt::Result {
        self.indent();
        write!(
            self.buf,
            r#"<circle cx="{}" cy="{}" r="{}""#,
            num(cx),
            num(cy),
            num(r)
        )?;
        self.attrs(attrs)?;
        self.buf.push_str("/>\n");
        Ok(())
    }

    fn quadratic_bezier(
        &mut self,
        start: (f64, f64),
        control: (f64, f64),
        end: (f64, f64),
        attrs: &[Attr<'_>],
    ) -> fmt::Result {
        self.indent();
        write!(
            self.buf,
            r#"<path d="M{},{} Q{},{} {},{}""#,
            num(start.0),
            num(start.1),
            num(control.0),
            num(control.1),
            num(end.0),
            num(end.1)
        )?;
        self.attrs(attrs)?;
        self.buf.push_str("/>\n");
        Ok(())
    }

    fn writer(&mut self) -> &mut dyn fmt::Write {
        &mut self.buf
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

/// Format a coordinate with at most two decimals and no trailing zeros.
pub fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(num(45.26), "45.26");
        assert_eq!(num(30.0), "30");
        assert_eq!(num(12.50), "12.5");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn document_structure() {
        let mut c = SvgCanvas::new();
        c.start(720.0, 100.0).unwrap();
        c.group(&[("class", "row")]).unwrap();
        c.text(30.0, 40.0, "1 & <2>", &[("font-size", "16")]).unwrap();
        c.group_end().unwrap();
        c.quadratic_bezier((1.0, 2.0), (3.0, 4.0), (5.0, 6.0), &[("fill", "none")])
            .unwrap();
        c.end().unwrap();

        let expected = concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 720 100" width="720" height="100">"#,
            "\n",
            r#"  <g class="row">"#,
            "\n",
            r#"    <text x="30" y="40" font-size="16">1 &amp; &lt;2&gt;</text>"#,
            "\n",
            "  </g>\n",
            r#"  <path d="M1,2 Q3,4 5,6" fill="none"/>"#,
            "\n",
            "</svg>\n",
        );
        assert_eq!(c.as_str(), expected);
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut c = SvgCanvas::new();
        c.circle(1.0, 1.0, 1.5, &[("data-x", "a\"b")]).unwrap();
        assert_eq!(c.as_str(), "<circle cx=\"1\" cy=\"1\" r=\"1.5\" data-x=\"a&quot;b\"/>\n");
    }
}
