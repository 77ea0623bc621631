//! Boundary Data Source
//! Joined ZIP polygons prepared for painting: unit-space triangulation plus
//! an R-tree index for pointer hit-testing.

use crate::data::ZipFeature;
use crate::map::projection::lonlat_to_unit;
use geo::{BoundingRect, Contains, MultiPolygon, Point};
use geojson::JsonObject;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use serde_json::Value;

/// Triangulated fill and outline rings of one polygon, in unit-mercator space.
pub struct PolygonMesh {
    /// All ring vertices concatenated, exterior first, closing duplicates dropped.
    pub vertices: Vec<[f64; 2]>,
    /// Earcut triangle indices into `vertices`.
    pub indices: Vec<u32>,
    /// Closed rings for the outline layer.
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// One feature of the installed data source.
pub struct ZipShape {
    pub zip: String,
    /// Present only on features the score join matched.
    pub centile: Option<f64>,
    pub properties: JsonObject,
    /// Original lon/lat geometry, kept for the containment test.
    pub geometry: MultiPolygon<f64>,
    pub meshes: Vec<PolygonMesh>,
    /// Unit-space bounding box (min, max) for view culling.
    pub bounds: ([f64; 2], [f64; 2]),
}

struct ShapeEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for ShapeEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// The joined polygon collection, ready for the map view.
pub struct BoundarySource {
    shapes: Vec<ZipShape>,
    tree: RTree<ShapeEnvelope>,
}

impl BoundarySource {
    /// Prepare all features for painting. Triangulation is per-feature
    /// independent, so it runs in parallel.
    pub fn build(features: Vec<ZipFeature>) -> Self {
        let shapes: Vec<ZipShape> = features.into_par_iter().map(build_shape).collect();

        let envelopes = shapes
            .iter()
            .enumerate()
            .filter_map(|(index, shape)| {
                let rect = shape.geometry.bounding_rect()?;
                Some(ShapeEnvelope {
                    index,
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            shapes,
            tree: RTree::bulk_load(envelopes),
        }
    }

    pub fn shapes(&self) -> &[ZipShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// The shape under a geographic coordinate, if any. Candidates come from
    /// the R-tree envelope query and are confirmed with a containment test.
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<&ZipShape> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|candidate| self.shapes.get(candidate.index))
            .find(|shape| shape.geometry.contains(&point))
    }
}

fn build_shape(feature: ZipFeature) -> ZipShape {
    let centile = feature
        .properties
        .get("centileScore")
        .and_then(Value::as_f64);

    let meshes: Vec<PolygonMesh> = feature
        .geometry
        .0
        .iter()
        .filter_map(|polygon| triangulate(polygon, &feature.zip))
        .collect();

    let bounds = unit_bounds(&meshes);

    ZipShape {
        zip: feature.zip,
        centile,
        properties: feature.properties,
        geometry: feature.geometry,
        meshes,
        bounds,
    }
}

/// Project a polygon's rings into unit-mercator space and triangulate with
/// earcut (exterior plus holes).
fn triangulate(polygon: &geo::Polygon<f64>, zip: &str) -> Option<PolygonMesh> {
    let mut rings: Vec<Vec<[f64; 2]>> = Vec::with_capacity(1 + polygon.interiors().len());
    rings.push(project_ring(polygon.exterior()));
    for interior in polygon.interiors() {
        rings.push(project_ring(interior));
    }

    let mut flat: Vec<f64> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    let mut vertices: Vec<[f64; 2]> = Vec::new();

    for (i, ring) in rings.iter().enumerate() {
        // Earcut expects open rings.
        let open = open_ring(ring);
        if open.len() < 3 {
            if i == 0 {
                return None; // degenerate exterior
            }
            continue;
        }
        if i > 0 {
            hole_starts.push(vertices.len());
        }
        for &v in open {
            flat.extend_from_slice(&v);
            vertices.push(v);
        }
    }

    let indices = match earcutr::earcut(&flat, &hole_starts, 2) {
        Ok(indices) => indices.into_iter().map(|i| i as u32).collect(),
        Err(e) => {
            tracing::warn!(zip, error = ?e, "triangulation failed, painting outline only");
            Vec::new()
        }
    };

    Some(PolygonMesh {
        vertices,
        indices,
        rings,
    })
}

fn project_ring(ring: &geo::LineString<f64>) -> Vec<[f64; 2]> {
    ring.0.iter().map(|c| lonlat_to_unit(c.x, c.y)).collect()
}

/// Drop the closing duplicate if the ring is explicitly closed.
fn open_ring(ring: &[[f64; 2]]) -> &[[f64; 2]] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        other => other,
    }
}

fn unit_bounds(meshes: &[PolygonMesh]) -> ([f64; 2], [f64; 2]) {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for mesh in meshes {
        for v in &mesh.vertices {
            min[0] = min[0].min(v[0]);
            min[1] = min[1].min(v[1]);
            max[0] = max[0].max(v[0]);
            max[1] = max[1].max(v[1]);
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::boundaries::parse_features;
    use serde_json::json;

    fn square_feature(zip: &str, score: Option<f64>) -> ZipFeature {
        let collection = format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [{{
                    "type": "Feature",
                    "properties": {{ "zip": "{zip}" }},
                    "geometry": {{
                        "type": "Polygon",
                        "coordinates": [[[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0]]]
                    }}
                }}]
            }}"#
        );
        let mut features = parse_features(collection.as_bytes(), 0.0).unwrap();
        let mut feature = features.remove(0);
        if let Some(score) = score {
            feature
                .properties
                .insert("centileScore".to_string(), json!(score));
        }
        feature
    }

    #[test]
    fn hit_test_finds_containing_shape() {
        let source = BoundarySource::build(vec![square_feature("12345", Some(62.3))]);

        let hit = source.hit_test(0.0, 0.0).expect("point inside the square");
        assert_eq!(hit.zip, "12345");
        assert_eq!(hit.centile, Some(62.3));

        assert!(source.hit_test(5.0, 5.0).is_none());
    }

    #[test]
    fn unscored_shape_has_no_centile() {
        let source = BoundarySource::build(vec![square_feature("99999", None)]);
        assert_eq!(source.shapes()[0].centile, None);
    }

    #[test]
    fn square_triangulates_into_two_triangles() {
        let source = BoundarySource::build(vec![square_feature("12345", None)]);
        let mesh = &source.shapes()[0].meshes[0];
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let source = BoundarySource::build(vec![square_feature("12345", None)]);
        let (min, max) = source.shapes()[0].bounds;
        assert!(min[0] < max[0]);
        assert!(min[1] < max[1]);
    }
}
