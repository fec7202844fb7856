use geo::{Coord, CoordsIter, LineString, MultiPolygon};

/// Projection function: lon/lat -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
/// Pair with `fill-rule="evenodd"` so holes render as holes.
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}

/// Escape text content for embedding in SVG markup.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Coord, MultiPolygon};

    use super::*;

    #[test]
    fn path_includes_holes_as_subpaths() {
        let shape = MultiPolygon(vec![polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]],
        )]);
        let project = |c: &Coord<f64>| (c.x * 10.0, c.y * 10.0);

        let path = multipolygon_to_path(&shape, &project);
        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(path.matches('Z').count(), 2);
        assert!(path.starts_with(" M0.000,0.000 L40.000,0.000"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("Brighton & Hove <East>"), "Brighton &amp; Hove &lt;East&gt;");
        assert_eq!(escape_xml("King's Lynn"), "King&apos;s Lynn");
    }
}
