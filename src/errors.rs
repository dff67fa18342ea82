use thiserror::Error;

#[derive(Error, Debug)]
pub enum S2cError {
    #[error("config error: {0}")] Config(String),
    #[error("provider error: {0}")] Provider(String),
    #[error("template error: {0}")] Template(String),
    #[error("csv error: {0}")] Csv(String),
}
