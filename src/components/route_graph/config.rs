use serde::{Deserialize, Serialize};

use super::theme::{GraphTheme, ThemePreset};
use crate::error::GraphError;

/// What happens to node positions when the canvas changes size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizePolicy {
	/// Leave nodes where the user put them.
	#[default]
	KeepPositions,
	/// Shift the whole graph so it stays centered.
	Recenter,
}

/// Component configuration. Every field has a default, so callers can
/// pass a partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	pub theme: ThemePreset,
	pub resize: ResizePolicy,
	pub replay_interval_ms: u32,
	pub fallback_width: f64,
	pub fallback_height: f64,
	pub show_controls: bool,
	pub test_data_href: String,
	pub optimize_href: String,
	pub export_filename: String,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			theme: ThemePreset::Classic,
			resize: ResizePolicy::KeepPositions,
			replay_interval_ms: 550,
			fallback_width: 800.0,
			fallback_height: 600.0,
			show_controls: true,
			test_data_href: "/sample".into(),
			optimize_href: "/admin/routing/".into(),
			export_filename: "route_graph_export.json".into(),
		}
	}
}

impl GraphConfig {
	pub fn from_json_str(raw: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn theme(&self) -> GraphTheme {
		GraphTheme::from_preset(self.theme)
	}

	pub fn replay_interval_secs(&self) -> f64 {
		f64::from(self.replay_interval_ms) / 1000.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = GraphConfig::from_json_str(r#"{"theme":"vivid","resize":"recenter"}"#)
			.expect("valid config");
		assert_eq!(config.theme, ThemePreset::Vivid);
		assert_eq!(config.resize, ResizePolicy::Recenter);
		assert_eq!(config.replay_interval_ms, 550);
		assert_eq!(config.test_data_href, "/sample");
	}

	#[test]
	fn bad_json_is_an_error() {
		assert!(matches!(
			GraphConfig::from_json_str("{theme"),
			Err(GraphError::Payload(_))
		));
	}
}
