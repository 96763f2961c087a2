//! Document validation
//!
//! Static checks over a [`SceneDocument`] before it is built. None of these
//! issues stop a build: the builder falls back or skips, and the caller is
//! expected to log what the validator finds.

use std::collections::HashSet;
use std::fmt;

use crate::document::{BoxData, GeometryKind, MaterialKind, ObjectKind, SceneDocument};

/// Issue found in a scene document
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Document has no objects
    EmptyDocument,
    /// Two materials share a uuid
    DuplicateMaterial(String),
    /// Two geometries share a uuid
    DuplicateGeometry(String),
    /// Object references a geometry that does not exist
    DanglingGeometry { object: String, uuid: String },
    /// Object references a material that does not exist
    DanglingMaterial { object: String, uuid: String },
    /// Material type tag is not recognised
    UnknownMaterialType { uuid: String, type_name: String },
    /// Geometry type tag is not recognised
    UnknownGeometryType { uuid: String, type_name: String },
    /// Object type tag is not recognised
    UnknownObjectType { object: String, type_name: String },
    /// Edge pair references a vertex past the end of the vertex list
    EdgeOutOfRange { uuid: String, edge: [u32; 2], vertex_count: usize },
    /// Box has a zero or negative dimension
    NonPositiveDimension { uuid: String, size: [f32; 3] },
    /// Box has a zero segment count
    ZeroSegments(String),
    /// Box segment count is above the tessellation cap
    ExcessiveSegments { uuid: String, segments: [u32; 3] },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyDocument => write!(f, "Document has no objects"),
            ValidationIssue::DuplicateMaterial(uuid) => {
                write!(f, "Duplicate material uuid: '{}'", uuid)
            }
            ValidationIssue::DuplicateGeometry(uuid) => {
                write!(f, "Duplicate geometry uuid: '{}'", uuid)
            }
            ValidationIssue::DanglingGeometry { object, uuid } => {
                write!(f, "Object '{}' references missing geometry '{}'", object, uuid)
            }
            ValidationIssue::DanglingMaterial { object, uuid } => {
                write!(f, "Object '{}' references missing material '{}'", object, uuid)
            }
            ValidationIssue::UnknownMaterialType { uuid, type_name } => {
                write!(f, "Material '{}' has unknown type '{}'", uuid, type_name)
            }
            ValidationIssue::UnknownGeometryType { uuid, type_name } => {
                write!(f, "Geometry '{}' has unknown type '{}'", uuid, type_name)
            }
            ValidationIssue::UnknownObjectType { object, type_name } => {
                write!(f, "Object '{}' has unknown type '{}'", object, type_name)
            }
            ValidationIssue::EdgeOutOfRange { uuid, edge, vertex_count } => write!(
                f,
                "Geometry '{}' edge [{}, {}] is out of range ({} vertices)",
                uuid, edge[0], edge[1], vertex_count
            ),
            ValidationIssue::NonPositiveDimension { uuid, size } => write!(
                f,
                "Geometry '{}' has non-positive size [{}, {}, {}]",
                uuid, size[0], size[1], size[2]
            ),
            ValidationIssue::ZeroSegments(uuid) => {
                write!(f, "Geometry '{}' has a zero segment count", uuid)
            }
            ValidationIssue::ExcessiveSegments { uuid, segments } => write!(
                f,
                "Geometry '{}' segment counts [{}, {}, {}] exceed {} and will be capped",
                uuid,
                segments[0],
                segments[1],
                segments[2],
                BoxData::MAX_SEGMENTS
            ),
        }
    }
}

impl std::error::Error for ValidationIssue {}

/// Document validator
///
/// # Example
/// ```ignore
/// for issue in DocumentValidator::validate(&doc) {
///     log::warn!("{}", issue);
/// }
/// ```
pub struct DocumentValidator;

impl DocumentValidator {
    /// Validate a document, returning every issue found
    pub fn validate(doc: &SceneDocument) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if doc.objects.is_empty() {
            issues.push(ValidationIssue::EmptyDocument);
        }

        let mut material_ids = HashSet::new();
        for material in &doc.materials {
            if !material_ids.insert(material.uuid.as_str()) {
                issues.push(ValidationIssue::DuplicateMaterial(material.uuid.clone()));
            }
            if let MaterialKind::Other(tag) = &material.kind {
                issues.push(ValidationIssue::UnknownMaterialType {
                    uuid: material.uuid.clone(),
                    type_name: tag.clone(),
                });
            }
        }

        let mut geometry_ids = HashSet::new();
        for geometry in &doc.geometries {
            if !geometry_ids.insert(geometry.uuid.as_str()) {
                issues.push(ValidationIssue::DuplicateGeometry(geometry.uuid.clone()));
            }
            match &geometry.kind {
                GeometryKind::Box(data) => {
                    let size = [data.width, data.height, data.depth];
                    if size.iter().any(|s| *s <= 0.0) {
                        issues.push(ValidationIssue::NonPositiveDimension {
                            uuid: geometry.uuid.clone(),
                            size,
                        });
                    }
                    if data.width_segments == 0 || data.height_segments == 0 || data.depth_segments == 0 {
                        issues.push(ValidationIssue::ZeroSegments(geometry.uuid.clone()));
                    }
                    if data.exceeds_segment_limit() {
                        issues.push(ValidationIssue::ExcessiveSegments {
                            uuid: geometry.uuid.clone(),
                            segments: [data.width_segments, data.height_segments, data.depth_segments],
                        });
                    }
                }
                GeometryKind::Edges(data) => {
                    let vertex_count = data.vertices.len();
                    for edge in &data.edges {
                        if edge.iter().any(|i| *i as usize >= vertex_count) {
                            issues.push(ValidationIssue::EdgeOutOfRange {
                                uuid: geometry.uuid.clone(),
                                edge: *edge,
                                vertex_count,
                            });
                        }
                    }
                }
                GeometryKind::Other { type_name, .. } => {
                    issues.push(ValidationIssue::UnknownGeometryType {
                        uuid: geometry.uuid.clone(),
                        type_name: type_name.clone(),
                    });
                }
            }
        }

        for object in &doc.objects {
            if let ObjectKind::Other(tag) = &object.kind {
                issues.push(ValidationIssue::UnknownObjectType {
                    object: object.name.clone(),
                    type_name: tag.clone(),
                });
            }
            if !geometry_ids.contains(object.geometry.as_str()) {
                issues.push(ValidationIssue::DanglingGeometry {
                    object: object.name.clone(),
                    uuid: object.geometry.clone(),
                });
            }
            if !material_ids.contains(object.material.as_str()) {
                issues.push(ValidationIssue::DanglingMaterial {
                    object: object.name.clone(),
                    uuid: object.material.clone(),
                });
            }
        }

        issues
    }

    /// Validate and return `Err` with every issue if any were found
    pub fn validate_or_error(doc: &SceneDocument) -> Result<(), Vec<ValidationIssue>> {
        let issues = Self::validate(doc);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::document::{EdgesData, GeometrySpec, MaterialSpec, ObjectSpec};

    fn make_valid_doc() -> SceneDocument {
        let mut doc = SceneDocument::default();
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshPhong, Color::WHITE));
        doc.geometries.push(GeometrySpec::new("g", GeometryKind::Box(BoxData::default())));
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "Box 1", "g", "m"));
        doc
    }

    #[test]
    fn test_valid_document_has_no_issues() {
        let issues = DocumentValidator::validate(&make_valid_doc());
        assert!(issues.is_empty(), "Expected no issues, got: {:?}", issues);
        assert!(DocumentValidator::validate_or_error(&make_valid_doc()).is_ok());
    }

    #[test]
    fn test_empty_document() {
        let issues = DocumentValidator::validate(&SceneDocument::default());
        assert_eq!(issues, vec![ValidationIssue::EmptyDocument]);
    }

    #[test]
    fn test_duplicates_detected() {
        let mut doc = make_valid_doc();
        doc.materials.push(MaterialSpec::new("m", MaterialKind::MeshBasic, Color::BLACK));
        doc.geometries.push(GeometrySpec::new("g", GeometryKind::Box(BoxData::default())));
        let issues = DocumentValidator::validate(&doc);
        assert!(issues.contains(&ValidationIssue::DuplicateMaterial("m".into())));
        assert!(issues.contains(&ValidationIssue::DuplicateGeometry("g".into())));
    }

    #[test]
    fn test_dangling_references_detected() {
        let mut doc = make_valid_doc();
        doc.objects.push(ObjectSpec::new(ObjectKind::Mesh, "orphan", "g2", "m2"));
        let issues = DocumentValidator::validate(&doc);
        assert!(issues.contains(&ValidationIssue::DanglingGeometry {
            object: "orphan".into(),
            uuid: "g2".into()
        }));
        assert!(issues.contains(&ValidationIssue::DanglingMaterial {
            object: "orphan".into(),
            uuid: "m2".into()
        }));
    }

    #[test]
    fn test_unknown_types_detected() {
        let mut doc = make_valid_doc();
        doc.materials.push(MaterialSpec::new("s", MaterialKind::Other("ShaderMaterial".into()), Color::WHITE));
        doc.geometries.push(GeometrySpec::new(
            "t",
            GeometryKind::Other { type_name: "TorusGeometry".into(), data: serde_json::Value::Null },
        ));
        doc.objects.push(ObjectSpec::new(ObjectKind::Other("Points".into()), "p", "g", "m"));

        let issues = DocumentValidator::validate(&doc);
        assert_eq!(issues.len(), 3, "got: {:?}", issues);
    }

    #[test]
    fn test_geometry_data_checks() {
        let mut doc = make_valid_doc();
        let mut flat = BoxData::new(1.0, 0.0, 1.0);
        flat.depth_segments = 0;
        doc.geometries.push(GeometrySpec::new("flat", GeometryKind::Box(flat)));
        doc.geometries.push(GeometrySpec::new(
            "lines",
            GeometryKind::Edges(EdgesData {
                vertices: vec![[0.0; 3], [1.0; 3]],
                edges: vec![[0, 1], [1, 2]],
            }),
        ));

        let issues = DocumentValidator::validate(&doc);
        assert!(issues.contains(&ValidationIssue::NonPositiveDimension {
            uuid: "flat".into(),
            size: [1.0, 0.0, 1.0]
        }));
        assert!(issues.contains(&ValidationIssue::ZeroSegments("flat".into())));
        assert!(issues.contains(&ValidationIssue::EdgeOutOfRange {
            uuid: "lines".into(),
            edge: [1, 2],
            vertex_count: 2
        }));
    }

    #[test]
    fn test_excessive_segments_detected() {
        let mut doc = make_valid_doc();
        let mut dense = BoxData::default();
        dense.width_segments = 200_000;
        doc.geometries.push(GeometrySpec::new("dense", GeometryKind::Box(dense)));

        let issues = DocumentValidator::validate(&doc);
        assert_eq!(
            issues,
            vec![ValidationIssue::ExcessiveSegments {
                uuid: "dense".into(),
                segments: [200_000, 1, 1]
            }]
        );
    }

    #[test]
    fn test_issue_display() {
        let msg = ValidationIssue::DanglingMaterial { object: "Box 3".into(), uuid: "m9".into() }.to_string();
        assert!(msg.contains("Box 3"));
        assert!(msg.contains("m9"));
    }
}
