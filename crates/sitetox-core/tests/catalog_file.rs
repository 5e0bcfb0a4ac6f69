use std::io::Write;

use sitetox_core::{CaseCatalog, GraderError};

#[test]
fn catalog_loads_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"[cases]
"Site 7" = "Chromium plume beneath a plating shop."
"Site 8" = "Nitrate runoff into a reservoir."
"#
    )
    .unwrap();

    let catalog = CaseCatalog::from_toml_file(file.path()).unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.describe("Site 8").unwrap(),
        "Nitrate runoff into a reservoir."
    );
    assert!(matches!(
        catalog.describe("Site 1"),
        Err(GraderError::CaseNotFound(_))
    ));
}

#[test]
fn missing_catalog_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CaseCatalog::from_toml_file(dir.path().join("cases.toml")).unwrap_err();
    assert!(matches!(err, GraderError::Io(_)));
}

#[test]
fn malformed_catalog_file_is_catalog_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[cases\n\"Site 1\" = ").unwrap();

    let err = CaseCatalog::from_toml_file(file.path()).unwrap_err();
    assert!(matches!(err, GraderError::Catalog(_)));
}
