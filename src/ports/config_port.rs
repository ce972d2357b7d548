//! Configuration access port trait.

/// Read access to sectioned key/value settings. The typed getters fall back
/// to `default` when a key is absent or unparsable; callers that must reject
/// bad values read the raw string.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
