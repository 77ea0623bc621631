//! Boundary Loader & Score Join
//! Parses the ZIP-code boundary GeoJSON and merges score records into
//! feature properties.

use crate::data::score_table::{ScoreRecord, ScoreTable};
use geo::{MultiPolygon, Simplify};
use geojson::{GeoJson, JsonObject};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoundaryLoadError {
    #[error("Failed to open boundary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse GeoJSON: {0}")]
    Geojson(#[from] geojson::Error),
    #[error("Boundary file must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// One ZIP-code polygon with its (possibly score-extended) property set.
#[derive(Debug, Clone)]
pub struct ZipFeature {
    /// Display form of the `zip` property.
    pub zip: String,
    /// Numeric join key, when the `zip` property parses as one.
    pub zip_key: Option<u32>,
    pub properties: JsonObject,
    /// Geometry in lon/lat degrees.
    pub geometry: MultiPolygon<f64>,
}

/// Load and parse the boundary collection at `path`.
pub fn load_boundaries(
    path: &Path,
    simplify_tolerance: f64,
) -> Result<Vec<ZipFeature>, BoundaryLoadError> {
    let file = File::open(path)?;
    let features = parse_features(BufReader::new(file), simplify_tolerance)?;
    tracing::info!(path = ?path, features = features.len(), "boundary polygons loaded");
    Ok(features)
}

/// Parse a GeoJSON FeatureCollection into ZIP features.
///
/// Non-polygon and unconvertible geometries are skipped. Polygons are
/// simplified with the given Douglas-Peucker tolerance, matching the
/// preprocessing the upstream TIGER/ZCTA pipeline applies.
pub fn parse_features<R: Read>(
    reader: R,
    simplify_tolerance: f64,
) -> Result<Vec<ZipFeature>, BoundaryLoadError> {
    let geojson = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(BoundaryLoadError::NotFeatureCollection),
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let properties = feature.properties.unwrap_or_default();
        let (zip, zip_key) = zip_property(&properties);

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geometry: geo::Geometry<f64> = match geometry.value.try_into() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(zip = %zip, error = %e, "skipping feature with invalid geometry");
                continue;
            }
        };
        let mut geometry = match geometry {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => continue, // points/lines cannot be choropleth regions
        };

        if simplify_tolerance > 0.0 {
            geometry = geometry.simplify(&simplify_tolerance);
        }

        features.push(ZipFeature {
            zip,
            zip_key,
            properties,
            geometry,
        });
    }

    Ok(features)
}

/// Read the `zip` property, accepting a JSON string or number. The TIGER
/// pipeline emits numeric zips; hand-edited files often quote them.
fn zip_property(properties: &JsonObject) -> (String, Option<u32>) {
    match properties.get("zip") {
        Some(Value::String(s)) => (s.clone(), s.trim().parse().ok()),
        Some(Value::Number(n)) => (n.to_string(), n.as_u64().and_then(|v| u32::try_from(v).ok())),
        _ => (String::new(), None),
    }
}

/// Merge each matching score record into its feature's property set.
///
/// Matching features gain the record fields (overwriting on collision);
/// features with no table entry are left untouched. Returns the number of
/// matched features.
pub fn join_scores(features: &mut [ZipFeature], table: &ScoreTable) -> usize {
    let mut matched = 0usize;

    for feature in features.iter_mut() {
        let Some(record) = feature.zip_key.and_then(|key| table.get(&key)) else {
            continue;
        };
        merge_record(&mut feature.properties, record);
        matched += 1;
    }

    tracing::info!(matched, total = features.len(), "joined score records");
    matched
}

fn merge_record(properties: &mut JsonObject, record: &ScoreRecord) {
    properties.insert("centileScore".to_string(), json!(record.centile_score));
    properties.insert("city".to_string(), json!(record.city));
    properties.insert("state".to_string(), json!(record.state));
    properties.insert("population".to_string(), json!(record.population));
    properties.insert("bachelorsPct".to_string(), json!(record.bachelors_pct));
    properties.insert("medianIncome".to_string(), json!(record.median_income));
}
