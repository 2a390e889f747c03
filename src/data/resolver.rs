//! Mapping of probe sensor ids to display names.

use std::collections::HashMap;

/// Name used for sensors that are not in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Report the sensor under its raw id.
    SensorId,
    /// Report every unknown sensor under one shared name.
    Name(String),
}

/// Resolves sensor ids to the names used as aggregation keys.
///
/// The table is fixed at construction. Several ids may map to the same name,
/// in which case their readings share one window.
#[derive(Debug, Clone)]
pub struct SensorResolver {
    names: HashMap<String, String>,
    fallback: Fallback,
}

impl SensorResolver {
    /// Resolver over an id → name table with the given fallback.
    pub fn new(names: HashMap<String, String>, fallback: Fallback) -> Self {
        Self { names, fallback }
    }

    /// Build a resolver from the configured table and optional default name.
    pub fn from_config(names: &HashMap<String, String>, default_name: Option<&str>) -> Self {
        let fallback = match default_name {
            Some(name) => Fallback::Name(name.to_string()),
            None => Fallback::SensorId,
        };
        Self::new(names.clone(), fallback)
    }

    /// Configured name for `sensor_id`, else the fallback.
    pub fn resolve<'a>(&'a self, sensor_id: &'a str) -> &'a str {
        match self.names.get(sensor_id) {
            Some(name) => name,
            None => match &self.fallback {
                Fallback::SensorId => sensor_id,
                Fallback::Name(name) => name,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HashMap<String, String> {
        HashMap::from([
            ("2846b25204000054".to_string(), "wohnzimmer".to_string()),
            ("28ff6a0b04000012".to_string(), "keller".to_string()),
        ])
    }

    #[test]
    fn known_ids_resolve_to_their_names() {
        let resolver = SensorResolver::new(table(), Fallback::SensorId);
        assert_eq!(resolver.resolve("2846b25204000054"), "wohnzimmer");
        assert_eq!(resolver.resolve("28ff6a0b04000012"), "keller");
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn unknown_id_falls_back_to_raw_id() {
        let resolver = SensorResolver::from_config(&table(), None);
        assert_eq!(resolver.resolve("28aabbccdd000001"), "28aabbccdd000001");
    }

    #[test]
    fn unknown_ids_share_the_default_name() {
        let resolver = SensorResolver::from_config(&table(), Some("unknown"));
        assert_eq!(resolver.resolve("28aabbccdd000001"), "unknown");
        assert_eq!(resolver.resolve("28aabbccdd000002"), "unknown");
    }

    #[test]
    fn empty_table_uses_fallback_for_everything() {
        let resolver = SensorResolver::new(HashMap::new(), Fallback::Name("x".to_string()));
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve("2846b25204000054"), "x");
    }
}
