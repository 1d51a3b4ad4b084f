/// The two screens and their paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// Browse and search, at the application root
    #[default]
    Gallery,
    /// Card customization; only reachable through a selection
    Customize,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Gallery => "/",
            Route::Customize => "/customize",
        }
    }

    /// Unknown paths land on the gallery
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/customize" => Route::Customize,
            _ => Route::Gallery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Route::from_path(Route::Customize.path()), Route::Customize);
        assert_eq!(Route::from_path("/customize/"), Route::Customize);
        assert_eq!(Route::from_path("/"), Route::Gallery);
        assert_eq!(Route::from_path("/nowhere"), Route::Gallery);
    }
}
