use abstractor_core::LayoutSection;

use crate::LayoutError;

/// Geometry tolerances for the normalizer.
///
/// Distances are in page units (points). Use [`LayoutConfigBuilder`] to
/// override individual values.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    // ── merge.rs ──
    /// Merge adjacent same-signature runs into spans.
    pub(crate) merge_consecutive: bool,
    /// Maximum vertical offset between two runs of the same span.
    pub(crate) merge_y_tolerance: f64,
    /// Maximum horizontal gap between the end of one run and the next.
    pub(crate) merge_gap_tolerance: f64,

    // ── reading_order.rs ──
    /// Maximum y distance to the first element of a line.
    pub(crate) line_y_tolerance: f64,
    /// x coordinate separating the left column from the right one.
    pub(crate) column_threshold: f64,

    // ── scripts.rs ──
    /// Spans shorter than this are super/subscript candidates.
    pub(crate) script_height_floor: f64,
    /// Spans with a smaller font size are super/subscript candidates.
    pub(crate) script_size_floor: f64,
    /// Maximum x distance between a script glyph and its base run.
    pub(crate) script_max_dx: f64,
    /// y tolerance for glyphs that are Unicode super/subscripts.
    pub(crate) unicode_script_tolerance: f64,
    /// Accepted `base.y - glyph.y` range for superscripts.
    pub(crate) superscript_window: (f64, f64),
    /// Accepted `glyph.y - base.y` range for subscripts.
    pub(crate) subscript_window: (f64, f64),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            merge_consecutive: true,
            merge_y_tolerance: 3.0,
            merge_gap_tolerance: 50.0,
            line_y_tolerance: 0.3,
            column_threshold: 305.0,
            script_height_floor: 9.0,
            script_size_floor: 7.0,
            script_max_dx: 100.0,
            unicode_script_tolerance: 8.0,
            superscript_window: (0.3, 2.0),
            subscript_window: (2.0, 6.0),
        }
    }
}

/// Builder for [`LayoutConfig`].
///
/// Unset values fall back to the defaults. [`build()`](Self::build) rejects
/// negative or non-finite tolerances.
#[derive(Debug, Clone, Default)]
pub struct LayoutConfigBuilder {
    merge_consecutive: Option<bool>,
    merge_y_tolerance: Option<f64>,
    merge_gap_tolerance: Option<f64>,
    line_y_tolerance: Option<f64>,
    column_threshold: Option<f64>,
    script_height_floor: Option<f64>,
    script_size_floor: Option<f64>,
    script_max_dx: Option<f64>,
    unicode_script_tolerance: Option<f64>,
    superscript_window: Option<(f64, f64)>,
    subscript_window: Option<(f64, f64)>,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every value present in the `[layout]` section of a config file.
    pub fn apply_file(mut self, section: &LayoutSection) -> Self {
        self.merge_consecutive = section.merge_consecutive.or(self.merge_consecutive);
        self.merge_y_tolerance = section.merge_y_tolerance.or(self.merge_y_tolerance);
        self.merge_gap_tolerance = section.merge_gap_tolerance.or(self.merge_gap_tolerance);
        self.line_y_tolerance = section.line_y_tolerance.or(self.line_y_tolerance);
        self.column_threshold = section.column_threshold.or(self.column_threshold);
        self.script_height_floor = section.script_height_floor.or(self.script_height_floor);
        self.script_size_floor = section.script_size_floor.or(self.script_size_floor);
        self.script_max_dx = section.script_max_dx.or(self.script_max_dx);
        self.unicode_script_tolerance = section
            .unicode_script_tolerance
            .or(self.unicode_script_tolerance);
        self
    }

    pub fn merge_consecutive(mut self, enabled: bool) -> Self {
        self.merge_consecutive = Some(enabled);
        self
    }

    pub fn merge_y_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_y_tolerance = Some(tolerance);
        self
    }

    pub fn merge_gap_tolerance(mut self, gap: f64) -> Self {
        self.merge_gap_tolerance = Some(gap);
        self
    }

    pub fn line_y_tolerance(mut self, tolerance: f64) -> Self {
        self.line_y_tolerance = Some(tolerance);
        self
    }

    pub fn column_threshold(mut self, x: f64) -> Self {
        self.column_threshold = Some(x);
        self
    }

    pub fn script_height_floor(mut self, h: f64) -> Self {
        self.script_height_floor = Some(h);
        self
    }

    pub fn script_size_floor(mut self, size: f64) -> Self {
        self.script_size_floor = Some(size);
        self
    }

    pub fn script_max_dx(mut self, dx: f64) -> Self {
        self.script_max_dx = Some(dx);
        self
    }

    pub fn unicode_script_tolerance(mut self, tolerance: f64) -> Self {
        self.unicode_script_tolerance = Some(tolerance);
        self
    }

    pub fn superscript_window(mut self, min: f64, max: f64) -> Self {
        self.superscript_window = Some((min, max));
        self
    }

    pub fn subscript_window(mut self, min: f64, max: f64) -> Self {
        self.subscript_window = Some((min, max));
        self
    }

    pub fn build(self) -> Result<LayoutConfig, LayoutError> {
        let d = LayoutConfig::default();
        let config = LayoutConfig {
            merge_consecutive: self.merge_consecutive.unwrap_or(d.merge_consecutive),
            merge_y_tolerance: self.merge_y_tolerance.unwrap_or(d.merge_y_tolerance),
            merge_gap_tolerance: self.merge_gap_tolerance.unwrap_or(d.merge_gap_tolerance),
            line_y_tolerance: self.line_y_tolerance.unwrap_or(d.line_y_tolerance),
            column_threshold: self.column_threshold.unwrap_or(d.column_threshold),
            script_height_floor: self.script_height_floor.unwrap_or(d.script_height_floor),
            script_size_floor: self.script_size_floor.unwrap_or(d.script_size_floor),
            script_max_dx: self.script_max_dx.unwrap_or(d.script_max_dx),
            unicode_script_tolerance: self
                .unicode_script_tolerance
                .unwrap_or(d.unicode_script_tolerance),
            superscript_window: self.superscript_window.unwrap_or(d.superscript_window),
            subscript_window: self.subscript_window.unwrap_or(d.subscript_window),
        };

        let scalars = [
            ("merge_y_tolerance", config.merge_y_tolerance),
            ("merge_gap_tolerance", config.merge_gap_tolerance),
            ("line_y_tolerance", config.line_y_tolerance),
            ("column_threshold", config.column_threshold),
            ("script_height_floor", config.script_height_floor),
            ("script_size_floor", config.script_size_floor),
            ("script_max_dx", config.script_max_dx),
            ("unicode_script_tolerance", config.unicode_script_tolerance),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        for (name, (min, max)) in [
            ("superscript_window", config.superscript_window),
            ("subscript_window", config.subscript_window),
        ] {
            if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must satisfy 0 <= min <= max, got ({}, {})",
                    name, min, max
                )));
            }
        }
        Ok(config)
    }
}
