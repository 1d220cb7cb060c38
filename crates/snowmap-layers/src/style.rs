//! Fixed styling shared by the derivation functions

/// Stroke width of every segment line, in pixels.
pub const DEFAULT_LINE_WIDTH: f64 = 4.0;

/// Icon scale of the catalog's primary category.
pub const PRIMARY_MARKER_SCALE: f64 = 1.0;

/// Icon scale of every other category.
pub const SECONDARY_MARKER_SCALE: f64 = 0.75;

/// Line styling knobs
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Icon reference for a marker: the icon name tinted with `color`.
///
/// The renderer resolves it against its own icon sprite; the color is
/// percent-encoded so the reference is a valid URL.
pub fn icon_src(icon: &str, color: &str) -> String {
    let hex = color.trim_start_matches('#');
    format!("/icons/{icon}.svg?color=%23{hex}")
}
