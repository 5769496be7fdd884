//! Vector surface: region boundaries and labels as an SVG document.
//!
//! Shares the projection of the raster overlay and the same zoom transform,
//! so the two stay in registration.
use std::fmt::Write;

use crate::geo::MapLayout;
use crate::render::transform::ZoomTransform;

/// Opacity of `(province labels, region labels)` at zoom `k`.
///
/// Provinces show up to and including `threshold`, regions above it.
pub fn label_opacity(k: f64, threshold: f64) -> (f64, f64) {
    if k <= threshold { (1.0, 0.0) } else { (0.0, 1.0) }
}

pub fn render_map_svg(
    layout: &MapLayout,
    transform: ZoomTransform,
    selected_region: Option<&str>,
    label_zoom_threshold: f64,
) -> String {
    let (province_opacity, region_opacity) = label_opacity(transform.k, label_zoom_threshold);
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        layout.size.width, layout.size.height
    );
    let _ = writeln!(svg, r#"<g transform="{}">"#, transform.to_svg());

    for shape in &layout.shapes {
        let selected = selected_region.is_some() && shape.code.as_deref() == selected_region;
        let class = if selected { "municipality selected" } else { "municipality" };
        let _ = write!(svg, r#"<path class="{class}""#);
        if let Some(code) = &shape.code {
            let _ = write!(svg, r#" data-code="{}""#, escape_xml(code));
        }
        let _ = writeln!(svg, r#" d="{}"/>"#, shape.path_data);
    }

    for shape in &layout.shapes {
        let (Some(name), Some(anchor)) = (&shape.name, shape.label_anchor) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r#"<text class="label region-label" transform="translate({:.2},{:.2})" opacity="{}">{}</text>"#,
            anchor.x,
            anchor.y,
            region_opacity,
            escape_xml(name)
        );
    }

    for label in &layout.province_labels {
        let _ = writeln!(
            svg,
            r#"<text class="label province-label" transform="translate({:.2},{:.2})" opacity="{}">{}</text>"#,
            label.anchor.x,
            label.anchor.y,
            province_opacity,
            escape_xml(&label.name)
        );
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{ContainerSize, GeometryProvider, RegionFeature};
    use glam::DVec2;

    fn layout() -> MapLayout {
        let square = |x: f64, y: f64| {
            vec![vec![
                DVec2::new(x, y),
                DVec2::new(x + 0.2, y),
                DVec2::new(x + 0.2, y + 0.2),
                DVec2::new(x, y + 0.2),
                DVec2::new(x, y),
            ]]
        };
        GeometryProvider::new(vec![
            RegionFeature {
                code: Some("11".to_string()),
                name: Some("A&B".to_string()),
                province: Some("서울".to_string()),
                polygons: vec![square(126.9, 37.5)],
            },
            RegionFeature {
                code: Some("26".to_string()),
                name: Some("부산".to_string()),
                province: Some("부산".to_string()),
                polygons: vec![square(129.0, 35.1)],
            },
        ])
        .layout(ContainerSize::new(300.0, 400.0))
    }

    #[test]
    fn label_visibility_switches_at_threshold() {
        assert_eq!(label_opacity(1.0, 3.5), (1.0, 0.0));
        assert_eq!(label_opacity(3.5, 3.5), (1.0, 0.0));
        assert_eq!(label_opacity(3.6, 3.5), (0.0, 1.0));
    }

    #[test]
    fn marks_selected_region_and_escapes_names() {
        let svg = render_map_svg(&layout(), ZoomTransform::IDENTITY, Some("26"), 3.5);
        assert_eq!(svg.matches(r#"class="municipality selected""#).count(), 1);
        assert!(svg.contains(r#"<path class="municipality selected" data-code="26""#));
        assert!(svg.contains("A&amp;B"));
        assert!(svg.contains(r#"viewBox="0 0 300 400""#));
    }

    #[test]
    fn zoomed_in_shows_region_labels() {
        let svg = render_map_svg(&layout(), ZoomTransform::new(0.0, 0.0, 5.0), None, 3.5);
        assert!(svg.contains(r#"<g transform="translate(0,0) scale(5)">"#));
        assert!(svg.contains(r#"class="label region-label" transform"#));
        assert_eq!(svg.matches(r#"opacity="1">"#).count(), 2);
        assert!(!svg.contains("selected"));
    }
}
