use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use horo_core::{HorosphereGenerator, HorosphereGraph, HorosphereRequest, Presentation, Ray};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Defining data for one group and basepoint ray, plus an optional
/// request.
///
/// ```toml
/// ray = ["a", "c"]
///
/// [order]
/// a = 0
/// b = 1
/// c = 2
///
/// [commutation]
/// a = ["b"]
/// b = ["a", "c"]
/// c = ["b"]
///
/// [request]
/// length = 3
/// busemann_value = 0
/// rule = "rips"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorosphereConfig {
    pub ray: [String; 2],
    pub order: BTreeMap<String, i64>,
    #[serde(default)]
    pub commutation: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HorosphereRequest>,
}

impl HorosphereConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a `.toml` or `.json` document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match extension.as_str() {
            "toml" => Self::from_toml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::info!(
            "loaded defining data from {}: {} generators, ray {}{}",
            path.display(),
            config.order.len(),
            config.ray[0],
            config.ray[1]
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn presentation(&self) -> Result<Presentation> {
        Ok(Presentation::new(&self.commutation, &self.order)?)
    }

    pub fn ray(&self, presentation: &Presentation) -> Result<Ray> {
        Ok(Ray::from_labels(presentation, self.ray_labels())?)
    }

    fn ray_labels(&self) -> [&str; 2] {
        [self.ray[0].as_str(), self.ray[1].as_str()]
    }

    /// Run the structural precondition check on the defining data.
    pub fn validate(&self) -> Result<()> {
        let presentation = self.presentation()?;
        let ray = self.ray(&presentation)?;
        presentation.check_preconditions(ray.letters())?;
        Ok(())
    }

    pub fn generator(&self) -> Result<HorosphereGenerator> {
        Ok(HorosphereGenerator::new(
            &self.commutation,
            &self.order,
            self.ray_labels(),
        )?)
    }

    pub fn request(&self) -> Result<&HorosphereRequest> {
        self.request.as_ref().ok_or(ConfigError::MissingRequest)
    }

    pub fn with_request(mut self, request: HorosphereRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Build the generator and answer the document's own request.
    pub fn generate(&self) -> Result<HorosphereGraph> {
        let request = self.request()?;
        Ok(self.generator()?.generate(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horo_core::{EdgeRule, Window};

    const PATH_GRAPH: &str = r#"
ray = ["a", "c"]

[order]
a = 0
b = 1
c = 2

[commutation]
a = ["b"]
b = ["a", "c"]
c = ["b"]
"#;

    #[test]
    fn test_parse_toml() {
        let config = HorosphereConfig::from_toml_str(PATH_GRAPH).unwrap();
        assert_eq!(config.ray, ["a".to_string(), "c".to_string()]);
        assert_eq!(config.order.len(), 3);
        assert!(config.request.is_none());
        assert!(matches!(config.request(), Err(ConfigError::MissingRequest)));
        let p = config.presentation().unwrap();
        assert!(p.commutes(p.generator("a").unwrap(), p.generator("b").unwrap()));
    }

    #[test]
    fn test_request_section() {
        let text = format!(
            "{PATH_GRAPH}\n[request]\nlength = 2\nbusemann_value = 1\nrule = \"divergence\"\nwindow = \"suffix\"\n"
        );
        let config = HorosphereConfig::from_toml_str(&text).unwrap();
        let request = config.request().unwrap();
        assert_eq!(request.rule, EdgeRule::Divergence);
        assert_eq!(request.window, Window::Suffix);
        assert_eq!(request.length, 2);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let text = format!("{PATH_GRAPH}\n[extra]\nx = 1\n");
        assert!(matches!(
            HorosphereConfig::from_toml_str(&text),
            Err(ConfigError::Toml(_))
        ));
        let text = format!("{PATH_GRAPH}\n[request]\nlength = 2\nbusemann_value = 0\nradius = 4\n");
        assert!(HorosphereConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_json_matches_toml() {
        let from_toml = HorosphereConfig::from_toml_str(PATH_GRAPH).unwrap();
        let json = from_toml.to_json_string().unwrap();
        assert_eq!(HorosphereConfig::from_json_str(&json).unwrap(), from_toml);
        let toml_text = from_toml.to_toml_string().unwrap();
        assert_eq!(HorosphereConfig::from_toml_str(&toml_text).unwrap(), from_toml);
    }

    #[test]
    fn test_engine_errors_surface() {
        let text = PATH_GRAPH.replace(r#"c = ["b"]"#, r#"c = ["q"]"#);
        let config = HorosphereConfig::from_toml_str(&text).unwrap();
        assert!(matches!(config.generator(), Err(ConfigError::Engine(_))));

        // the path a - b - c is separated by {b}
        let config = HorosphereConfig::from_toml_str(PATH_GRAPH).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("separating"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("horo-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("path.toml");
        fs::write(&toml_path, PATH_GRAPH).unwrap();
        let config = HorosphereConfig::load(&toml_path).unwrap();

        let json_path = dir.join("path.json");
        fs::write(&json_path, config.to_json_string().unwrap()).unwrap();
        assert_eq!(HorosphereConfig::load(&json_path).unwrap(), config);

        let yaml_path = dir.join("path.yaml");
        fs::write(&yaml_path, "ray: []").unwrap();
        assert!(matches!(
            HorosphereConfig::load(&yaml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            HorosphereConfig::load(&dir.join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
