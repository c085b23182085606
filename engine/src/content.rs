use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::DuelConfig;

pub fn builtin_presets() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("classic", include_str!("../content/presets/classic.yaml")),
        ("blitz", include_str!("../content/presets/blitz.yaml")),
        ("practice", include_str!("../content/presets/practice.yaml")),
    ])
}

pub fn preset(name: &str) -> Result<DuelConfig> {
    let presets = builtin_presets();
    let text = presets
        .get(name.to_lowercase().as_str())
        .ok_or_else(|| anyhow!("preset '{}' not found", name))?;
    DuelConfig::from_yaml_str(text)
}
