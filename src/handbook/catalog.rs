//! Material catalog - reference cutting speeds loaded from a tabular source

use super::{CatalogLoadError, CuttingSpeedMode, HandbookError};
use crate::table::{self, RawTable, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

pub const COLUMN_MATERIAL: &str = "Material";
pub const COLUMN_CLASS: &str = "Class";
pub const COLUMN_SPEED_MEAN: &str = "Cutting speed mean (m/min)";
pub const COLUMN_SPEED_MIN: &str = "Cutting speed min (m/min)";

/// Lookup key for a material name: surrounding whitespace removed, case folded.
///
/// Used both when the catalog is indexed and when a name is looked up, so a
/// name that only differs in case or padding always resolves.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Normalized name, unique within the catalog
    pub name: String,
    /// Name as spelled in the source, trimmed
    pub label: String,
    pub class_tag: String,
    pub cutting_speed_mean: f64, // m/min
    pub cutting_speed_min: f64,  // m/min
}

impl MaterialRecord {
    pub fn cutting_speed(&self, mode: CuttingSpeedMode) -> f64 {
        match mode {
            CuttingSpeedMode::Mean => self.cutting_speed_mean,
            CuttingSpeedMode::Min => self.cutting_speed_min,
        }
    }
}

/// Immutable material table. Build it once and share it by reference.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: HashMap<String, MaterialRecord>,
    classes: BTreeMap<String, BTreeSet<String>>,
}

struct Columns {
    material: usize,
    class: usize,
    mean: usize,
    min: usize,
}

impl Columns {
    fn resolve(table: &RawTable) -> Result<Self, CatalogLoadError> {
        let find = |name: &'static str| {
            table
                .column(name)
                .ok_or(CatalogLoadError::MissingColumn(name))
        };

        Ok(Self {
            material: find(COLUMN_MATERIAL)?,
            class: find(COLUMN_CLASS)?,
            mean: find(COLUMN_SPEED_MEAN)?,
            min: find(COLUMN_SPEED_MIN)?,
        })
    }
}

fn parse_speed(row: &Row, index: usize, column: &'static str) -> Result<f64, CatalogLoadError> {
    let raw = row.cell(index);
    let invalid = |message: &str| CatalogLoadError::InvalidValue {
        row: row.number,
        column,
        value: raw.to_string(),
        message: message.to_string(),
    };

    let speed: f64 = raw.parse().map_err(|_| invalid("not a number"))?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(invalid("cutting speed must be positive"));
    }
    Ok(speed)
}

fn parse_record(row: &Row, cols: &Columns) -> Result<MaterialRecord, CatalogLoadError> {
    let label = row.cell(cols.material).trim();
    if label.is_empty() {
        return Err(CatalogLoadError::InvalidValue {
            row: row.number,
            column: COLUMN_MATERIAL,
            value: String::new(),
            message: "material name is empty".to_string(),
        });
    }

    let mean = parse_speed(row, cols.mean, COLUMN_SPEED_MEAN)?;
    let min = parse_speed(row, cols.min, COLUMN_SPEED_MIN)?;
    if min > mean {
        return Err(CatalogLoadError::InvalidValue {
            row: row.number,
            column: COLUMN_SPEED_MIN,
            value: row.cell(cols.min).to_string(),
            message: format!("minimum speed exceeds mean speed {mean}"),
        });
    }

    Ok(MaterialRecord {
        name: normalize(label),
        label: label.to_string(),
        class_tag: row.cell(cols.class).trim().to_string(),
        cutting_speed_mean: mean,
        cutting_speed_min: min,
    })
}

impl MaterialCatalog {
    /// Build the catalog from a parsed table
    pub fn from_table(table: &RawTable) -> Result<Self, CatalogLoadError> {
        let cols = Columns::resolve(table)?;
        let mut catalog = Self::default();

        for row in &table.rows {
            let record = parse_record(row, &cols)?;

            // every row lists its name under its class; lookups still resolve to the first row
            catalog
                .classes
                .entry(record.class_tag.clone())
                .or_default()
                .insert(record.name.clone());

            if catalog.materials.contains_key(&record.name) {
                warn!(
                    material = %record.name,
                    class = %record.class_tag,
                    row = row.number,
                    "duplicate material, keeping first occurrence"
                );
                continue;
            }
            catalog.materials.insert(record.name.clone(), record);
        }

        if catalog.is_empty() {
            warn!("material catalog is empty");
        }
        debug!(
            materials = catalog.len(),
            classes = catalog.classes.len(),
            "material catalog loaded"
        );
        Ok(catalog)
    }

    /// Load from CSV text
    pub fn load<R: Read>(source: R) -> Result<Self, CatalogLoadError> {
        Self::from_table(&table::read_csv(source)?)
    }

    /// Load from a `.csv`, `.xlsx` or `.xls` file
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading material catalog");
        Self::from_table(&table::read_path(path)?)
    }

    /// Distinct class tags, ascending
    pub fn classes(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    /// Material names of a class, ascending. Unknown classes yield nothing.
    pub fn materials_in_class(&self, class_tag: &str) -> Vec<&str> {
        self.classes
            .get(class_tag.trim())
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&MaterialRecord> {
        self.materials.get(&normalize(name))
    }

    /// Reference cutting speed of a material, m/min
    pub fn lookup(&self, name: &str, mode: CuttingSpeedMode) -> Result<f64, HandbookError> {
        self.get(name)
            .map(|record| record.cutting_speed(mode))
            .ok_or_else(|| HandbookError::MaterialNotFound(name.trim().to_string()))
    }

    /// The record for `name` if `class_tag` lists it
    pub fn get_in_class(&self, class_tag: &str, name: &str) -> Option<&MaterialRecord> {
        let key = normalize(name);
        let listed = self
            .classes
            .get(class_tag.trim())
            .is_some_and(|names| names.contains(&key));
        if listed {
            self.materials.get(&key)
        } else {
            None
        }
    }

    /// Same as [`lookup`](Self::lookup) but the material must be listed under `class_tag`
    pub fn lookup_in_class(
        &self,
        class_tag: &str,
        name: &str,
        mode: CuttingSpeedMode,
    ) -> Result<f64, HandbookError> {
        self.get_in_class(class_tag, name)
            .map(|record| record.cutting_speed(mode))
            .ok_or_else(|| {
                HandbookError::MaterialNotFound(format!(
                    "{} (class {})",
                    name.trim(),
                    class_tag.trim()
                ))
            })
    }

    /// All records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &MaterialRecord> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
