//! Application configuration.

use serde::Deserialize;

/// Geometry of the hierarchical layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Card width.
	pub node_width: f64,
	/// Card height.
	pub node_height: f64,
	/// Horizontal gap between cards in one rank.
	pub node_sep: f64,
	/// Vertical gap between ranks.
	pub rank_sep: f64,
	/// Horizontal gap between disconnected families.
	pub component_gap: f64,
	/// Offset of the layout's top-left corner from the origin.
	pub margin: f64,
	/// Barycenter ordering sweeps per component.
	pub ordering_sweeps: usize,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			node_width: 170.0,
			node_height: 100.0,
			node_sep: 50.0,
			rank_sep: 50.0,
			component_gap: 80.0,
			margin: 40.0,
			ordering_sweeps: 8,
		}
	}
}

/// Where the data service lives and how to authenticate.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// REST base URL without trailing slash.
	pub base_url: String,
	/// localStorage key of the bearer credential.
	pub token_key: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: "/api".into(),
			token_key: "token".into(),
		}
	}
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Layout geometry.
	pub graph: GraphConfig,
	/// Data service.
	pub api: ApiConfig,
}

impl AppConfig {
	/// Parses a JSON document; missing keys fall back to defaults.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}
}
