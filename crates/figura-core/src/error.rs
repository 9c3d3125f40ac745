pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid diagram spec: {message}")]
    InvalidSpec { message: String },

    #[error("Invalid data for {diagram_type} diagram: {source}")]
    InvalidData {
        diagram_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {message}")]
    Config { message: String },
}
