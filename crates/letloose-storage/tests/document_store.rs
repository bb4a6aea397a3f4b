use letloose_core::{
    Controller, ControllerConfig, ControllerDocument, MemoryHost, RangeField, SimParams,
};
use letloose_storage::{DocumentStore, StorageError};
use std::fs;
use tempfile::tempdir;

const KIND: &str = "CustomHairItem";

fn tracked_controller(host: &MemoryHost) -> Controller<MemoryHost> {
    let mut controller =
        Controller::new(host.clone(), ControllerConfig::default()).expect("valid config");
    controller.update(0.0);
    controller.update(0.1);
    controller
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().expect("tempdir");
    let store = DocumentStore::open(dir.path().join("absent.json"));
    assert!(store.load().expect("load").is_none());
    assert!(!store.clear().expect("clear"));
}

#[test]
fn saved_document_restores_identical_evaluation() {
    let dir = tempdir().expect("tempdir");
    let store = DocumentStore::open(dir.path().join("nested").join("state.json"));

    let host = MemoryHost::new();
    let id = host.insert(
        "hair",
        "Hair",
        KIND,
        SimParams {
            use_painted_rigidity: true,
            main_rigidity: 0.07,
            tip_rigidity: 0.006,
            style_cling: 0.8,
            ..SimParams::default()
        },
    );
    let mut controller = tracked_controller(&host);
    {
        let registry = controller.registry_mut();
        registry
            .edit_selected(RangeField::LowerAngleLimit, -20.0)
            .expect("edit");
        registry
            .edit_selected(RangeField::MinStyleCling, 0.3)
            .expect("edit");
    }
    let document = controller.document();
    store.save(&document).expect("save");
    assert!(!dir.path().join("nested").join("state.json.tmp").exists());

    let loaded = store.load().expect("load").expect("document present");
    assert_eq!(loaded, document);

    let original = controller.registry().get(&id).expect("tracked");
    let restored_host = MemoryHost::new();
    restored_host.insert("hair", "Hair", KIND, SimParams::default());
    let mut restored = Controller::new(restored_host.clone(), ControllerConfig::default())
        .expect("valid config");
    restored.load_document(loaded);
    restored.update(0.0);
    let copy = restored.registry().get(&id).expect("tracked");

    for step in 0..=36 {
        let angle = -90.0 + step as f32 * 5.0;
        assert_eq!(original.compute(angle), copy.compute(angle), "angle {angle}");
    }
    assert_eq!(original.baseline(), copy.baseline());
}

#[test]
fn corrupt_and_foreign_files_surface_errors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let store = DocumentStore::open(&path);

    fs::write(&path, "{ not json").expect("write");
    assert!(matches!(store.load(), Err(StorageError::Json(_))));

    fs::write(&path, r#"{"version":2,"records":[]}"#).expect("write");
    assert!(matches!(
        store.load(),
        Err(StorageError::UnsupportedVersion(2))
    ));

    fs::write(&path, r#"{"version":1,"records":[{"id":"a"}]}"#).expect("write");
    assert!(matches!(store.load(), Err(StorageError::Schema(_))));

    store.save(&ControllerDocument::default()).expect("save");
    assert_eq!(
        store.load().expect("load"),
        Some(ControllerDocument::default())
    );
    assert!(store.clear().expect("clear"));
}
