use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use geo::Rect;

pub(crate) struct SvgWriter<W: Write> {
    writer: W,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl<W: Write> Write for SvgWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter<BufWriter<File>> {
    /// Create a new SVG writer to a file path
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[to_svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }
}

impl SvgWriter<Vec<u8>> {
    /// Create a writer that buffers the document in memory.
    pub(crate) fn in_memory() -> Self { Self { writer: Vec::new() } }

    /// Consume the writer, returning the SVG document text.
    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer).context("[to_svg] SVG output is not valid UTF-8")
    }
}

impl<W: Write> SvgWriter<W> {
    /// Write the SVG header, including the XML declaration and opening <svg> tag.
    /// The lon/lat window being drawn is recorded as data attributes.
    pub(crate) fn write_header(&mut self, width: f64, height: f64, view: &Rect<f64>) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg"
            width="{width:.0}" height="{height:.0}"
            viewBox="0 0 {width:.0} {height:.0}"
            data-lon-min="{lon_min}" data-lon-max="{lon_max}"
            data-lat-min="{lat_min}" data-lat-max="{lat_max}">"##,
            lon_min = view.min().x,
            lon_max = view.max().x,
            lat_min = view.min().y,
            lat_max = view.max().y,
        )?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Write SVG styles for regions, the legend and the popup.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    .region {{ stroke-linejoin: round; vector-effect: non-scaling-stroke; }}
    .legend {{ fill: #ffffff; fill-opacity: 0.9; stroke: #9ca3af; stroke-width: 0.5; }}
    .legend-title {{ font: bold 13px sans-serif; fill: #111827; }}
    .legend-item {{ font: 11px sans-serif; fill: #111827; }}
    .popup {{ fill: #ffffff; stroke: #111827; stroke-width: 0.8; }}
    .popup-text {{ font: 12px sans-serif; fill: #111827; }}
</style>
</defs>"##)?;
        Ok(())
    }

    /// Write the closing </svg> tag.
    pub(crate) fn write_footer(&mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use geo::{Coord, Rect};

    use super::SvgWriter;

    #[test]
    fn in_memory_document_is_well_formed() {
        let view = Rect::new(Coord { x: -3.0, y: 50.0 }, Coord { x: 1.0, y: 55.0 });
        let mut writer = SvgWriter::in_memory();
        writer.write_header(400.0, 500.0, &view).unwrap();
        writer.write_styles().unwrap();
        writeln!(writer, "<g/>").unwrap();
        writer.write_footer().unwrap();

        let svg = writer.into_string().unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"viewBox="0 0 400 500""#));
        assert!(svg.contains(r#"data-lon-min="-3""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn file_writer_creates_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let view = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });

        let mut writer = SvgWriter::create(&path).unwrap();
        writer.write_header(10.0, 10.0, &view).unwrap();
        writer.write_footer().unwrap();
        writer.flush().unwrap();
        drop(writer);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
    }
}
