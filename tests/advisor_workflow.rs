use cutspeed::export::{self, MillingRecord, TurningRecord};
use cutspeed::{
    Advisor, CatalogLoadError, CuttingSpeedMode, HandbookError, MaterialCatalog, MillingInput,
    TurningInput,
};
use pretty_assertions::assert_eq;
use std::path::Path;

fn shipped_catalog() -> MaterialCatalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/cutting_data.csv");
    MaterialCatalog::load_path(path).expect("shipped catalog loads")
}

#[test]
fn shipped_catalog_is_consistent() {
    let catalog = shipped_catalog();
    assert!(!catalog.is_empty());

    let classes = catalog.classes();
    let mut sorted = classes.clone();
    sorted.sort();
    assert_eq!(classes, sorted);

    for class in classes {
        let names = catalog.materials_in_class(class);
        assert!(!names.is_empty(), "class {class} has no materials");
        for name in names {
            let record = catalog.get(name).unwrap();
            assert!(record.cutting_speed_min <= record.cutting_speed_mean);
            assert_eq!(record.class_tag, class);
        }
    }

    for record in catalog.iter() {
        assert!(catalog.materials_in_class(&record.class_tag).contains(&record.name.as_str()));
        assert_eq!(record.label, record.label.trim());
    }
}

#[test]
fn workbook_catalog_loads_like_csv() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cutting_data.xlsx");
    let catalog = MaterialCatalog::load_path(path).unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.classes(), vec!["Aluminium", "Steel"]);
    assert_eq!(catalog.lookup("steel c45", CuttingSpeedMode::Min).unwrap(), 120.0);
    assert_eq!(catalog.lookup("Aluminium 6061", CuttingSpeedMode::Mean).unwrap(), 450.5);
    assert_eq!(catalog.get("aluminium 6061").unwrap().label, "Aluminium 6061");
}

#[test]
fn select_class_then_material_then_mill() {
    let catalog = shipped_catalog();
    let advisor = Advisor::new(&catalog).with_class("Aluminium");

    let material = catalog.materials_in_class("Aluminium")[0];
    let plan = advisor
        .milling(
            material,
            CuttingSpeedMode::Mean,
            &MillingInput {
                diameter: 2.0,
                feed_per_tooth: 0.01,
                tooth_count: 2,
                depth_of_cut: 0.5,
                length: 40.0,
            },
        )
        .unwrap();

    // micro tool: 0.0035 * 2 / 2
    assert!((plan.result.chip_thickness_min - 0.0035).abs() < 1e-12);
    assert!(plan.result.rotation_speed > 0.0);
}

#[test]
fn export_round_trip_through_file() {
    let catalog = shipped_catalog();
    let advisor = Advisor::new(&catalog);
    let dir = tempfile::tempdir().unwrap();

    let milling = advisor
        .milling(
            "steel c45",
            CuttingSpeedMode::Min,
            &MillingInput {
                diameter: 12.0,
                feed_per_tooth: 0.06,
                tooth_count: 3,
                depth_of_cut: 3.0,
                length: 250.0,
            },
        )
        .unwrap();
    let milling_path = dir.path().join("milling.csv");
    export::write_path(&milling_path, &[MillingRecord::from(&milling)]).unwrap();
    let read: Vec<MillingRecord> = export::read_path(&milling_path).unwrap();
    assert_eq!(read, vec![MillingRecord::from(&milling)]);
    assert!((read[0].feed_speed - milling.result.feed_speed).abs() <= 0.05);
    assert!((read[0].estimated_time - milling.result.estimated_time).abs() <= 0.005);

    let turning = advisor
        .turning(
            "Stainless 316L",
            CuttingSpeedMode::Mean,
            &TurningInput {
                diameter: 40.0,
                feed_per_rev: 0.1,
                length: 60.0,
                target_roughness_ra: 3.2,
                nose_radius: 0.8,
                land_length: Some(0.08),
            },
        )
        .unwrap();
    assert!(!turning.result.excess_feed_warning);
    assert!(!turning.result.chip_breaker_warning);

    let turning_path = dir.path().join("turning.csv");
    export::write_path(&turning_path, &[TurningRecord::from(&turning)]).unwrap();
    let read: Vec<TurningRecord> = export::read_path(&turning_path).unwrap();
    assert_eq!(read[0].material, "stainless 316l");
    assert_eq!(turning.label, "Stainless 316L");
    assert!((read[0].max_recommended_feed - turning.result.max_recommended_feed).abs() <= 0.0005);
}

#[test]
fn missing_catalog_file_is_a_load_error() {
    let err = MaterialCatalog::load_path("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, CatalogLoadError::Source(_)));

    let err: HandbookError = err.into();
    assert!(matches!(err, HandbookError::CatalogLoad(_)));
}

#[test]
fn unknown_material_yields_no_result() {
    let catalog = shipped_catalog();
    let outcome = Advisor::new(&catalog).milling(
        "unobtainium",
        CuttingSpeedMode::Mean,
        &MillingInput {
            diameter: 10.0,
            feed_per_tooth: 0.05,
            tooth_count: 4,
            depth_of_cut: 2.0,
            length: 100.0,
        },
    );
    assert!(matches!(outcome, Err(HandbookError::MaterialNotFound(_))));
}
