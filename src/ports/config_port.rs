//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value of `key` in `section`, if present.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Section names, lower-cased.
    fn sections(&self) -> Vec<String>;

    fn has_section(&self, section: &str) -> bool {
        self.sections().iter().any(|s| s == section)
    }
}
