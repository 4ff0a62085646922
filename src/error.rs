pub type WatchResult<T> = Result<T, WatchError>;

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("window error: {0}")]
    Window(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("asset error: {0}")]
    Asset(String),
}

impl WatchError {
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(WatchError::window("x").to_string().contains("window error:"));
        assert!(WatchError::render("x").to_string().contains("render error:"));
        assert!(WatchError::asset("x").to_string().contains("asset error:"));
    }
}
