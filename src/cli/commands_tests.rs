use super::*;
use std::io::Write;
use tempfile::TempDir;

// =========================================================================
// Config resolution
// =========================================================================

#[test]
fn test_resolve_config_applies_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outlook.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "input: from_file.xlsx\noutput_dir: out\ntarget_year: 2040").unwrap();

    let config = resolve_config(&Overrides {
        config: Some(path),
        output_dir: Some(PathBuf::from("elsewhere")),
        port: Some(9000),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.input, PathBuf::from("from_file.xlsx"));
    assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
    assert_eq!(config.target_year, 2040);
    assert_eq!(config.server.port, 9000);
}

#[test]
fn test_resolve_config_missing_file() {
    let result = resolve_config(&Overrides {
        config: Some(PathBuf::from("/nonexistent/outlook.yaml")),
        ..Default::default()
    });
    assert!(matches!(result, Err(OutlookError::NotFound(_))));
}

// =========================================================================
// Helpers
// =========================================================================

#[test]
fn test_selected_defaults_to_all() {
    assert_eq!(selected(&[]).len(), TableId::ALL.len());
    assert_eq!(
        selected(&[TableId::Wind, TableId::Demand, TableId::Wind]),
        vec![TableId::Demand, TableId::Wind]
    );
}

#[test]
fn test_preview_cell() {
    assert_eq!(preview_cell("abc", 5), "abc  ");
    assert_eq!(preview_cell("abcdefgh", 5), "abcd…");
}

#[test]
fn test_failure_summary() {
    assert!(failure_summary(&[], 3, "clean").is_ok());
    let err = failure_summary(&[TableId::Supply, TableId::Hydrogen], 10, "clean").unwrap_err();
    assert_eq!(err.to_string(), "2 of 10 tables failed to clean: 2, 4.6");
}

#[test]
fn test_is_same_file_by_name() {
    assert!(is_same_file(
        Path::new("/tmp/does-not-exist/data.xlsx"),
        Path::new("/home/user/data.xlsx")
    ));
    assert!(!is_same_file(Path::new("/tmp/other.xlsx"), Path::new("/home/user/data.xlsx")));
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn test_clean_missing_workbook_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = OutlookConfig {
        input: dir.path().join("missing.xlsx"),
        output_dir: dir.path().join("out"),
        ..Default::default()
    };
    assert!(matches!(clean(&config, &[]), Err(OutlookError::NotFound(_))));
    assert!(matches!(watch(&config), Err(OutlookError::NotFound(_))));
}
