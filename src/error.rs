use thiserror::Error;

pub type OutlookResult<T> = Result<T, OutlookError>;

#[derive(Error, Debug)]
pub enum OutlookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Unexpected sheet layout: {0}")]
    Layout(String),

    #[error("No data to save: {0}")]
    NoData(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Failed(String),
}

impl From<rust_xlsxwriter::XlsxError> for OutlookError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        OutlookError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for OutlookError {
    fn from(e: serde_json::Error) -> Self {
        OutlookError::Chart(e.to_string())
    }
}
