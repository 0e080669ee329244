//! Target layer description and the features handed in for editing.

use serde::{Deserialize, Serialize};

use super::DrawMode;
use crate::geometry::Geometry;

/// Tells the engine whether the target layer accepts multi-part geometries.
///
/// Queried again every time the draw mode changes.
pub trait LayerCapabilities {
    /// Whether the layer stores Multi* geometries for `mode`.
    fn supports_multi(&self, mode: DrawMode) -> bool;
}

/// Geometry type declaration of a WFS/QGIS layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Layer name, used for logging only
    pub name: String,
    /// Declared geometry type, e.g. `MultiPolygon` or `gml:MultiSurfacePropertyType`
    pub geometry_type: String,
}

impl LayerDescriptor {
    pub fn new(name: impl Into<String>, geometry_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry_type: geometry_type.into(),
        }
    }

    /// Declared type with any namespace prefix and `PropertyType` suffix removed, lowercased.
    fn bare_type(&self) -> String {
        let raw = self
            .geometry_type
            .rsplit(':')
            .next()
            .unwrap_or(&self.geometry_type);
        let raw = raw.strip_suffix("PropertyType").unwrap_or(raw);
        raw.to_ascii_lowercase()
    }

    /// Draw mode matching the declared geometry type, if any.
    pub fn draw_mode(&self) -> Option<DrawMode> {
        let bare = self.bare_type();
        let bare = bare.strip_prefix("multi").unwrap_or(&bare);
        match bare {
            "point" => Some(DrawMode::Point),
            "linestring" | "curve" | "line" => Some(DrawMode::Line),
            "polygon" | "surface" => Some(DrawMode::Polygon),
            _ => None,
        }
    }

    /// Whether the declared type is a Multi* type.
    pub fn is_multi(&self) -> bool {
        self.bare_type().starts_with("multi")
    }
}

impl LayerCapabilities for LayerDescriptor {
    fn supports_multi(&self, mode: DrawMode) -> bool {
        // Layers with an unknown geometry type accept anything.
        match self.draw_mode() {
            Some(layer_mode) => layer_mode == mode && self.is_multi(),
            None => self.is_multi() || self.bare_type() == "geometry",
        }
    }
}

/// A pre-existing feature handed to the engine for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identifier as provided by the data source
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Feature geometry
    pub geometry: Geometry,
    /// Non-geometric attributes, passed through untouched
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_types() {
        let layer = LayerDescriptor::new("roads", "LineString");
        assert_eq!(layer.draw_mode(), Some(DrawMode::Line));
        assert!(!layer.supports_multi(DrawMode::Line));
    }

    #[test]
    fn test_multi_types() {
        let layer = LayerDescriptor::new("parcels", "MultiPolygon");
        assert_eq!(layer.draw_mode(), Some(DrawMode::Polygon));
        assert!(layer.supports_multi(DrawMode::Polygon));
        assert!(!layer.supports_multi(DrawMode::Point));
    }

    #[test]
    fn test_gml_property_types() {
        let layer = LayerDescriptor::new("parcels", "gml:MultiSurfacePropertyType");
        assert_eq!(layer.draw_mode(), Some(DrawMode::Polygon));
        assert!(layer.supports_multi(DrawMode::Polygon));

        let layer = LayerDescriptor::new("wells", "gml:PointPropertyType");
        assert_eq!(layer.draw_mode(), Some(DrawMode::Point));
        assert!(!layer.supports_multi(DrawMode::Point));
    }

    #[test]
    fn test_generic_geometry_accepts_multi() {
        let layer = LayerDescriptor::new("misc", "Geometry");
        assert_eq!(layer.draw_mode(), None);
        assert!(layer.supports_multi(DrawMode::Line));
    }

    #[test]
    fn test_feature_from_json() {
        let json = r#"{"id": 7, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.id, Some(serde_json::json!(7)));
        assert!(feature.properties.is_empty());
    }
}
