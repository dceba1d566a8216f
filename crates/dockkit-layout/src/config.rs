//! Layout defaults, overridable from the environment.
//!
//! | variable                      | values                           |
//! |-------------------------------|----------------------------------|
//! | `DOCKKIT_PROPORTIONAL_LAYOUT` | `1/0`, `true/false`, `yes/no`, `on/off` |
//! | `DOCKKIT_DROP_THRESHOLD`      | `20%`, `12px`, or a bare percent |
//! | `DOCKKIT_DEFER_INIT`          | boolean                          |
//!
//! Values that do not parse leave the default in place.

use serde::{Deserialize, Serialize};

use crate::droptarget::{ActivationSize, DropTarget, DropZones};
use crate::serialization::InitMode;

pub const ENV_PROPORTIONAL_LAYOUT: &str = "DOCKKIT_PROPORTIONAL_LAYOUT";
pub const ENV_DROP_THRESHOLD: &str = "DOCKKIT_DROP_THRESHOLD";
pub const ENV_DEFER_INIT: &str = "DOCKKIT_DEFER_INIT";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Rescale views by their saved share of the total on layout.
    pub proportional_layout: bool,
    /// Edge band width for drop-zone classification.
    pub drop_activation: ActivationSize,
    pub init_mode: InitMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            proportional_layout: true,
            drop_activation: ActivationSize::default(),
            init_mode: InitMode::Immediate,
        }
    }
}

impl LayoutConfig {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `get_env`.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = env_override_bool(&get_env, ENV_PROPORTIONAL_LAYOUT) {
            config.proportional_layout = value;
        }
        if let Some(activation) = get_env(ENV_DROP_THRESHOLD)
            .as_deref()
            .and_then(ActivationSize::parse)
        {
            config.drop_activation = activation;
        }
        if let Some(defer) = env_override_bool(&get_env, ENV_DEFER_INIT) {
            config.init_mode = if defer {
                InitMode::Deferred
            } else {
                InitMode::Immediate
            };
        }
        config
    }

    /// Drop target accepting `accepted` with this config's activation band.
    #[must_use]
    pub fn drop_target(&self, accepted: DropZones) -> DropTarget {
        DropTarget::new(accepted, self.drop_activation)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_override_bool<F>(get_env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    get_env(key).and_then(|value| parse_bool(&value))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        assert_eq!(LayoutConfig::from_env_with(env(&[])), LayoutConfig::default());
    }

    #[test]
    fn env_overrides_each_field() {
        let config = LayoutConfig::from_env_with(env(&[
            (ENV_PROPORTIONAL_LAYOUT, "off"),
            (ENV_DROP_THRESHOLD, "12px"),
            (ENV_DEFER_INIT, "YES"),
        ]));
        assert!(!config.proportional_layout);
        assert_eq!(config.drop_activation, ActivationSize::Pixels(12.0));
        assert_eq!(config.init_mode, InitMode::Deferred);
    }

    #[test]
    fn garbage_values_keep_defaults() {
        let config = LayoutConfig::from_env_with(env(&[
            (ENV_PROPORTIONAL_LAYOUT, "maybe"),
            (ENV_DROP_THRESHOLD, "lots"),
            (ENV_DEFER_INIT, ""),
        ]));
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"proportionalLayout":false}"#).expect("parse");
        assert!(!config.proportional_layout);
        assert_eq!(config.drop_activation, ActivationSize::Percentage(20.0));
        assert_eq!(config.init_mode, InitMode::Immediate);
    }
}
