//! Scene document data model
//!
//! A [`SceneDocument`] is the JSON payload produced by the packing exporter:
//! three ordered collections of materials, geometries and objects, linked by
//! uuid. Type tags follow the names used by browser 3D libraries
//! (`MeshPhongMaterial`, `BoxGeometry`, `LineSegments`, ...). Unknown tags are
//! preserved rather than rejected so the graph builder can apply its fallbacks.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::color::Color;
use crate::error::DocumentError;

/// Top-level scene payload
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Producer metadata, carried through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    pub materials: Vec<MaterialSpec>,
    pub geometries: Vec<GeometrySpec>,
    pub objects: Vec<ObjectSpec>,
}

impl SceneDocument {
    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load a document from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save the document as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let contents = self.to_json_pretty()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Render the document as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    /// True if the document has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Material spec by uuid (the last one wins on duplicates)
    pub fn material(&self, uuid: &str) -> Option<&MaterialSpec> {
        self.materials.iter().rev().find(|m| m.uuid == uuid)
    }

    /// Geometry spec by uuid (the last one wins on duplicates)
    pub fn geometry(&self, uuid: &str) -> Option<&GeometrySpec> {
        self.geometries.iter().rev().find(|g| g.uuid == uuid)
    }
}

/// Producer metadata block
///
/// Kept as raw JSON so whatever the producer wrote is written back as-is; the
/// accessors read the common `type`, `version` and `generator` keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(pub Value);

impl DocumentMetadata {
    /// Metadata with the usual producer keys
    pub fn new(kind: &str, version: f64, generator: &str) -> Self {
        Self(serde_json::json!({
            "type": kind,
            "version": version,
            "generator": generator,
        }))
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Format version, written either as a number or a numeric string
    pub fn version(&self) -> Option<f64> {
        match self.0.get("version")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn generator(&self) -> Option<&str> {
        self.0.get("generator").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Material type tag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialKind {
    MeshPhong,
    MeshLambert,
    MeshStandard,
    MeshBasic,
    LineBasic,
    /// Any tag not listed above
    Other(String),
}

impl MaterialKind {
    /// The type tag as written in documents
    pub fn as_str(&self) -> &str {
        match self {
            MaterialKind::MeshPhong => "MeshPhongMaterial",
            MaterialKind::MeshLambert => "MeshLambertMaterial",
            MaterialKind::MeshStandard => "MeshStandardMaterial",
            MaterialKind::MeshBasic => "MeshBasicMaterial",
            MaterialKind::LineBasic => "LineBasicMaterial",
            MaterialKind::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MaterialKind::Other(_))
    }
}

impl From<String> for MaterialKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "MeshPhongMaterial" => MaterialKind::MeshPhong,
            "MeshLambertMaterial" => MaterialKind::MeshLambert,
            "MeshStandardMaterial" => MaterialKind::MeshStandard,
            "MeshBasicMaterial" => MaterialKind::MeshBasic,
            "LineBasicMaterial" => MaterialKind::LineBasic,
            _ => MaterialKind::Other(tag),
        }
    }
}

impl From<MaterialKind> for String {
    fn from(kind: MaterialKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Which faces of a mesh are drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl From<u8> for Side {
    /// 0 = front, 1 = back, 2 = double; anything else reads as front
    fn from(value: u8) -> Self {
        match value {
            1 => Side::Back,
            2 => Side::Double,
            _ => Side::Front,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Front => 0,
            Side::Back => 1,
            Side::Double => 2,
        }
    }
}

/// Material entry of a scene document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: MaterialKind,
    #[serde(default)]
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linewidth: Option<f32>,
}

impl MaterialSpec {
    pub fn new(uuid: impl Into<String>, kind: MaterialKind, color: Color) -> Self {
        Self {
            uuid: uuid.into(),
            kind,
            color,
            transparent: None,
            opacity: None,
            side: None,
            linewidth: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.transparent = Some(true);
        self.opacity = Some(opacity);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_linewidth(mut self, linewidth: f32) -> Self {
        self.linewidth = Some(linewidth);
        self
    }
}

// ---------------------------------------------------------------------------
// Geometries
// ---------------------------------------------------------------------------

fn one() -> f32 {
    1.0
}

fn one_segment() -> u32 {
    1
}

/// Box dimensions and subdivision counts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxData {
    #[serde(default = "one")]
    pub width: f32,
    #[serde(default = "one")]
    pub height: f32,
    #[serde(default = "one")]
    pub depth: f32,
    #[serde(default = "one_segment")]
    pub width_segments: u32,
    #[serde(default = "one_segment")]
    pub height_segments: u32,
    #[serde(default = "one_segment")]
    pub depth_segments: u32,
}

impl Default for BoxData {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl BoxData {
    /// Largest segment count per axis that is tessellated
    pub const MAX_SEGMENTS: u32 = 256;

    /// Segment counts as tessellated: zero reads as one, large counts are capped
    pub fn clamped_segments(&self) -> [u32; 3] {
        [self.width_segments, self.height_segments, self.depth_segments]
            .map(|s| s.clamp(1, Self::MAX_SEGMENTS))
    }

    /// True if any segment count is above [`BoxData::MAX_SEGMENTS`]
    pub fn exceeds_segment_limit(&self) -> bool {
        [self.width_segments, self.height_segments, self.depth_segments]
            .iter()
            .any(|s| *s > Self::MAX_SEGMENTS)
    }

    /// Box with one segment per axis
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }
}

/// Explicit vertex list with index pairs describing line segments
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgesData {
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub edges: Vec<[u32; 2]>,
}

/// Typed geometry payload
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryKind {
    /// `BoxGeometry` / `BoxBufferGeometry`
    Box(BoxData),
    /// `EdgesGeometry`
    Edges(EdgesData),
    /// Any other tag; the payload is kept verbatim
    Other { type_name: String, data: Value },
}

impl GeometryKind {
    pub fn type_name(&self) -> &str {
        match self {
            GeometryKind::Box(_) => "BoxGeometry",
            GeometryKind::Edges(_) => "EdgesGeometry",
            GeometryKind::Other { type_name, .. } => type_name,
        }
    }
}

/// Geometry entry of a scene document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometrySpec", into = "RawGeometrySpec")]
pub struct GeometrySpec {
    pub uuid: String,
    pub kind: GeometryKind,
    /// Alias tag the entry was read with (`BoxBufferGeometry`), written back on save
    alias: Option<String>,
}

impl GeometrySpec {
    pub fn new(uuid: impl Into<String>, kind: GeometryKind) -> Self {
        Self { uuid: uuid.into(), kind, alias: None }
    }

    /// Type tag as written in documents
    pub fn type_name(&self) -> &str {
        match (&self.kind, &self.alias) {
            (GeometryKind::Box(_), Some(alias)) => alias,
            (kind, _) => kind.type_name(),
        }
    }
}

/// Wire shape of a geometry entry: `{uuid, type, data}`
#[derive(Clone, Serialize, Deserialize)]
struct RawGeometrySpec {
    uuid: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    data: Value,
}

impl TryFrom<RawGeometrySpec> for GeometrySpec {
    type Error = String;

    fn try_from(raw: RawGeometrySpec) -> Result<Self, Self::Error> {
        let data = if raw.data.is_null() {
            Value::Object(Default::default())
        } else {
            raw.data
        };
        let alias = (raw.kind == "BoxBufferGeometry").then(|| raw.kind.clone());
        let kind = match raw.kind.as_str() {
            "BoxGeometry" | "BoxBufferGeometry" => GeometryKind::Box(
                serde_json::from_value(data)
                    .map_err(|e| format!("geometry '{}': bad box data: {}", raw.uuid, e))?,
            ),
            "EdgesGeometry" => GeometryKind::Edges(
                serde_json::from_value(data)
                    .map_err(|e| format!("geometry '{}': bad edges data: {}", raw.uuid, e))?,
            ),
            _ => GeometryKind::Other { type_name: raw.kind, data },
        };
        Ok(GeometrySpec { uuid: raw.uuid, kind, alias })
    }
}

impl From<GeometrySpec> for RawGeometrySpec {
    fn from(spec: GeometrySpec) -> Self {
        let kind = spec.type_name().to_string();
        let data = match spec.kind {
            // Serializing plain data structs into a Value cannot fail
            GeometryKind::Box(b) => serde_json::to_value(b).unwrap_or(Value::Null),
            GeometryKind::Edges(e) => serde_json::to_value(e).unwrap_or(Value::Null),
            GeometryKind::Other { data, .. } => data,
        };
        RawGeometrySpec { uuid: spec.uuid, kind, data }
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Object type tag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectKind {
    Mesh,
    LineSegments,
    Other(String),
}

impl ObjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectKind::Mesh => "Mesh",
            ObjectKind::LineSegments => "LineSegments",
            ObjectKind::Other(tag) => tag,
        }
    }
}

impl From<String> for ObjectKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Mesh" => ObjectKind::Mesh,
            "LineSegments" => ObjectKind::LineSegments,
            _ => ObjectKind::Other(tag),
        }
    }
}

impl From<ObjectKind> for String {
    fn from(kind: ObjectKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Object entry of a scene document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Geometry uuid
    #[serde(default)]
    pub geometry: String,
    /// Material uuid
    #[serde(default)]
    pub material: String,
    /// Column-major 4x4 transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
}

impl ObjectSpec {
    pub fn new(
        kind: ObjectKind,
        name: impl Into<String>,
        geometry: impl Into<String>,
        material: impl Into<String>,
    ) -> Self {
        Self {
            uuid: None,
            name: name.into(),
            kind,
            geometry: geometry.into(),
            material: material.into(),
            matrix: None,
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_matrix(mut self, matrix: [f32; 16]) -> Self {
        self.matrix = Some(matrix);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "materials": [
            {"uuid": "m1", "type": "MeshPhongMaterial", "color": 16711680,
             "transparent": true, "opacity": 0.8, "side": 2}
        ],
        "geometries": [
            {"uuid": "g1", "type": "BoxGeometry",
             "data": {"width": 2, "height": 3, "depth": 4,
                      "widthSegments": 1, "heightSegments": 1, "depthSegments": 1}}
        ],
        "objects": [
            {"name": "Box 1", "type": "Mesh", "geometry": "g1", "material": "m1",
             "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 1,1.5,2,1]}
        ]
    }"#;

    #[test]
    fn test_parse_minimal_document() {
        let doc = SceneDocument::from_json(MINIMAL).unwrap();
        assert_eq!(doc.materials.len(), 1);
        assert_eq!(doc.geometries.len(), 1);
        assert_eq!(doc.objects.len(), 1);

        let m = &doc.materials[0];
        assert_eq!(m.kind, MaterialKind::MeshPhong);
        assert_eq!(m.color.to_hex(), 0xff0000);
        assert_eq!(m.side, Some(Side::Double));
        assert_eq!(m.opacity, Some(0.8));

        match &doc.geometries[0].kind {
            GeometryKind::Box(b) => {
                assert_eq!((b.width, b.height, b.depth), (2.0, 3.0, 4.0));
            }
            other => panic!("expected box, got {:?}", other),
        }

        let o = &doc.objects[0];
        assert_eq!(o.kind, ObjectKind::Mesh);
        assert_eq!(o.name, "Box 1");
        assert_eq!(o.matrix.unwrap()[12..15], [1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_missing_collection_is_error() {
        let result = SceneDocument::from_json(r#"{"materials": [], "objects": []}"#);
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_non_object_payload_is_error() {
        assert!(SceneDocument::from_json("42").is_err());
        assert!(SceneDocument::from_json("not json at all").is_err());
    }

    #[test]
    fn test_unknown_tags_are_preserved() {
        let doc = SceneDocument::from_json(
            r#"{
                "materials": [{"uuid": "m", "type": "ShaderMaterial"}],
                "geometries": [{"uuid": "g", "type": "TorusGeometry", "data": {"radius": 2}}],
                "objects": [{"name": "p", "type": "Points", "geometry": "g", "material": "m"}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.materials[0].kind, MaterialKind::Other("ShaderMaterial".into()));
        assert_eq!(doc.geometries[0].kind.type_name(), "TorusGeometry");
        assert_eq!(doc.objects[0].kind, ObjectKind::Other("Points".into()));
    }

    #[test]
    fn test_box_data_defaults() {
        let doc = SceneDocument::from_json(
            r#"{"materials": [], "geometries": [
                {"uuid": "a", "type": "BoxBufferGeometry", "data": {"width": 5}},
                {"uuid": "b", "type": "BoxGeometry"}
            ], "objects": []}"#,
        )
        .unwrap();
        assert_eq!(
            doc.geometries[0].kind,
            GeometryKind::Box(BoxData { width: 5.0, ..BoxData::default() })
        );
        assert_eq!(doc.geometries[1].kind, GeometryKind::Box(BoxData::default()));
    }

    #[test]
    fn test_box_buffer_tag_survives_save() {
        let doc = SceneDocument::from_json(
            r#"{"materials": [], "geometries": [
                {"uuid": "a", "type": "BoxBufferGeometry", "data": {"width": 2}},
                {"uuid": "b", "type": "BoxGeometry"}
            ], "objects": []}"#,
        )
        .unwrap();
        assert_eq!(doc.geometries[0].type_name(), "BoxBufferGeometry");
        assert_eq!(doc.geometries[1].type_name(), "BoxGeometry");

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["geometries"][0]["type"], "BoxBufferGeometry");
        assert_eq!(value["geometries"][1]["type"], "BoxGeometry");
        assert_eq!(SceneDocument::from_value(value).unwrap(), doc);
    }

    #[test]
    fn test_wrong_data_shape_is_error() {
        let result = SceneDocument::from_json(
            r#"{"materials": [], "geometries": [
                {"uuid": "e", "type": "EdgesGeometry", "data": {"vertices": "nope"}}
            ], "objects": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_material_defaults_and_color_string() {
        let doc = SceneDocument::from_json(
            r##"{"materials": [
                {"uuid": "a", "type": "MeshBasicMaterial"},
                {"uuid": "b", "type": "LineBasicMaterial", "color": "#666666", "linewidth": 2}
            ], "geometries": [], "objects": []}"##,
        )
        .unwrap();
        assert_eq!(doc.materials[0].color, Color::WHITE);
        assert_eq!(doc.materials[0].transparent, None);
        assert_eq!(doc.materials[1].color.to_hex(), 0x666666);
        assert_eq!(doc.materials[1].linewidth, Some(2.0));
    }

    #[test]
    fn test_lookup_last_duplicate_wins() {
        let mut doc = SceneDocument::default();
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshBasic, Color::BLACK));
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshPhong, Color::WHITE));
        assert_eq!(doc.material("m").unwrap().kind, MaterialKind::MeshPhong);
        assert!(doc.material("missing").is_none());
    }

    #[test]
    fn test_metadata_of_any_shape_is_kept() {
        let doc = SceneDocument::from_json(
            r#"{"metadata": {"version": "4.5", "type": "Object", "extra": [1, 2]},
                "materials": [], "geometries": [], "objects": []}"#,
        )
        .unwrap();
        let metadata = doc.metadata.as_ref().unwrap();
        assert_eq!(metadata.version(), Some(4.5));
        assert_eq!(metadata.kind(), Some("Object"));
        assert_eq!(metadata.generator(), None);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["metadata"]["version"], "4.5");
        assert_eq!(value["metadata"]["extra"][1], 2);

        let odd = SceneDocument::from_json(
            r#"{"metadata": "exported", "materials": [], "geometries": [], "objects": []}"#,
        )
        .unwrap();
        assert_eq!(odd.metadata.unwrap().version(), None);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let doc = SceneDocument::from_json(MINIMAL).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["materials"][0]["type"], "MeshPhongMaterial");
        assert_eq!(value["geometries"][0]["type"], "BoxGeometry");
        assert_eq!(value["geometries"][0]["data"]["widthSegments"], 1);
        assert_eq!(value["objects"][0]["type"], "Mesh");
        assert!(value.get("metadata").is_none());
    }
}
