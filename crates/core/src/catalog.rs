//! Domain context providers appended to the system prompt.

/// A catalog of controllable devices.
///
/// Each entry is a pre-formatted `location,name,entity_id` line. An empty
/// catalog means no device block is rendered.
pub trait DeviceCatalog: Send + Sync {
    fn devices(&self) -> Vec<String>;
}

/// A catalog of playable media titles.
pub trait MusicLibrary: Send + Sync {
    fn titles(&self) -> Vec<String>;
}

impl DeviceCatalog for Vec<String> {
    fn devices(&self) -> Vec<String> {
        self.clone()
    }
}

impl MusicLibrary for Vec<String> {
    fn titles(&self) -> Vec<String> {
        self.clone()
    }
}
