use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub layout: Option<LayoutSection>,
    pub profile: Option<ProfileSection>,
    pub heuristics: Option<HeuristicsSection>,
}

/// Normalizer tolerances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    pub merge_consecutive: Option<bool>,
    pub merge_y_tolerance: Option<f64>,
    pub merge_gap_tolerance: Option<f64>,
    pub line_y_tolerance: Option<f64>,
    pub column_threshold: Option<f64>,
    pub script_height_floor: Option<f64>,
    pub script_size_floor: Option<f64>,
    pub script_max_dx: Option<f64>,
    pub unicode_script_tolerance: Option<f64>,
}

/// Style profile: signature keys per typographic role.
///
/// Each list replaces the built-in set for that role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSection {
    pub header: Option<Vec<String>>,
    pub footer: Option<Vec<String>>,
    pub session: Option<Vec<String>>,
    pub section_label: Option<Vec<String>>,
    pub disclosure_label: Option<Vec<String>>,
    pub code_marker: Option<Vec<String>>,
    pub symbol_text: Option<Vec<String>>,
    pub indice: Option<Vec<String>>,
    pub title: Option<Vec<String>>,
    pub body_text: Option<Vec<String>>,
    pub scientific_text: Option<Vec<String>>,
    pub caption: Option<Vec<String>>,
    /// Extra label keyword -> section name (e.g. `"methods" = "materials_and_methods"`).
    pub section_keywords: Option<BTreeMap<String, String>>,
}

/// Toggles and margins of the contextual pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeuristicsSection {
    pub unindexed_institution_lines: Option<bool>,
    pub callout_labels: Option<bool>,
    pub caption_attachment: Option<bool>,
    pub caption_margin: Option<f64>,
    pub caption_epsilon: Option<f64>,
    pub caption_x_margin: Option<f64>,
}

/// Platform config directory path: `<config_dir>/abstractor/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("abstractor").join("config.toml"))
}

/// Load config by cascading CWD `.abstractor.toml` over platform config.
/// CWD values override platform values. Unreadable files are skipped.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p).ok());
    let cwd = load_from_path(Path::new(".abstractor.toml")).ok();

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path.
pub fn load_from_path(path: &Path) -> Result<ConfigFile, CoreError> {
    if !path.exists() {
        return Err(CoreError::MissingInput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

fn pick<T>(overlay: Option<T>, base: Option<T>) -> Option<T> {
    overlay.or(base)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let layout = match (base.layout, overlay.layout) {
        (Some(b), Some(o)) => Some(LayoutSection {
            merge_consecutive: pick(o.merge_consecutive, b.merge_consecutive),
            merge_y_tolerance: pick(o.merge_y_tolerance, b.merge_y_tolerance),
            merge_gap_tolerance: pick(o.merge_gap_tolerance, b.merge_gap_tolerance),
            line_y_tolerance: pick(o.line_y_tolerance, b.line_y_tolerance),
            column_threshold: pick(o.column_threshold, b.column_threshold),
            script_height_floor: pick(o.script_height_floor, b.script_height_floor),
            script_size_floor: pick(o.script_size_floor, b.script_size_floor),
            script_max_dx: pick(o.script_max_dx, b.script_max_dx),
            unicode_script_tolerance: pick(o.unicode_script_tolerance, b.unicode_script_tolerance),
        }),
        (b, o) => o.or(b),
    };

    let profile = match (base.profile, overlay.profile) {
        (Some(b), Some(o)) => Some(ProfileSection {
            header: pick(o.header, b.header),
            footer: pick(o.footer, b.footer),
            session: pick(o.session, b.session),
            section_label: pick(o.section_label, b.section_label),
            disclosure_label: pick(o.disclosure_label, b.disclosure_label),
            code_marker: pick(o.code_marker, b.code_marker),
            symbol_text: pick(o.symbol_text, b.symbol_text),
            indice: pick(o.indice, b.indice),
            title: pick(o.title, b.title),
            body_text: pick(o.body_text, b.body_text),
            scientific_text: pick(o.scientific_text, b.scientific_text),
            caption: pick(o.caption, b.caption),
            section_keywords: match (b.section_keywords, o.section_keywords) {
                (Some(mut bk), Some(ok)) => {
                    bk.extend(ok);
                    Some(bk)
                }
                (bk, ok) => ok.or(bk),
            },
        }),
        (b, o) => o.or(b),
    };

    let heuristics = match (base.heuristics, overlay.heuristics) {
        (Some(b), Some(o)) => Some(HeuristicsSection {
            unindexed_institution_lines: pick(
                o.unindexed_institution_lines,
                b.unindexed_institution_lines,
            ),
            callout_labels: pick(o.callout_labels, b.callout_labels),
            caption_attachment: pick(o.caption_attachment, b.caption_attachment),
            caption_margin: pick(o.caption_margin, b.caption_margin),
            caption_epsilon: pick(o.caption_epsilon, b.caption_epsilon),
            caption_x_margin: pick(o.caption_x_margin, b.caption_x_margin),
        }),
        (b, o) => o.or(b),
    };

    ConfigFile {
        layout,
        profile,
        heuristics,
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, CoreError> {
    let path = config_path()
        .ok_or_else(|| CoreError::Config("could not determine config directory".to_string()))?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(config)?)?;
    Ok(())
}

pub fn to_toml(config: &ConfigFile) -> Result<String, CoreError> {
    toml::to_string_pretty(config)
        .map_err(|e| CoreError::Config(format!("failed to serialize config: {}", e)))
}
