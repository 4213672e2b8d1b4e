use crate::documents::settings::Setting;
use crate::documents::{
    FileError, described_entries, invalid, object_section, optional_str, required_str,
};
use crate::registry::Registry;
use crate::runtime::CAPABILITIES_KEY;
use crate::snapshot::CapabilitySnapshot;
use serde_json::{Map, Value, json};

/// Version assumed when a capabilities file does not state one.
pub const DEFAULT_VERSION: i64 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adaptation {
    pub name: String,
    pub description: String,
}

/// Everything a program declares it can do: the base for enable files.
#[derive(Clone, Debug, PartialEq)]
pub struct CapabilitiesFile {
    pub name: String,
    pub description: String,
    pub version: i64,
    pub scenes: Vec<Scene>,
    pub settings: Vec<Setting>,
    pub capabilities: CapabilitySnapshot,
    pub adaptations: Vec<Adaptation>,
}

impl CapabilitiesFile {
    pub fn load(registry: &Registry, root: &Value) -> Result<Self, FileError> {
        let name = required_str(root, "name")?.to_string();
        let description = optional_str(root, "description", "description")?
            .unwrap_or_default()
            .to_string();
        let version = match root.get("version") {
            None => DEFAULT_VERSION,
            Some(raw) => raw.as_i64().ok_or_else(|| invalid("version", "an integer"))?,
        };

        let scenes = described_entries(root, "scenes")?
            .into_iter()
            .map(|(name, description)| Scene { name, description })
            .collect();

        let mut settings = Vec::new();
        if let Some(section) = object_section(root, "settings")? {
            for (setting, entry) in section {
                settings.push(Setting::declare(setting, entry)?);
            }
        }

        let capabilities = CapabilitySnapshot::load_base(registry, root)?;

        let adaptations = described_entries(root, "adaptations")?
            .into_iter()
            .map(|(name, description)| Adaptation { name, description })
            .collect();

        let file = CapabilitiesFile {
            name,
            description,
            version,
            scenes,
            settings,
            capabilities,
            adaptations,
        };
        tracing::debug!(
            name = %file.name,
            scenes = file.scenes.len(),
            settings = file.settings.len(),
            capabilities = file.capabilities.len(),
            adaptations = file.adaptations.len(),
            "capabilities file loaded"
        );
        Ok(file)
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.name == name)
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|setting| setting.name == name)
    }

    pub fn adaptation(&self, name: &str) -> Option<&Adaptation> {
        self.adaptations.iter().find(|adaptation| adaptation.name == name)
    }

    /// Render back into a document that loads to the same value.
    pub fn to_document(&self) -> Value {
        let mut root = Map::new();
        root.insert("name".to_string(), json!(self.name));
        if !self.description.is_empty() {
            root.insert("description".to_string(), json!(self.description));
        }
        root.insert("version".to_string(), json!(self.version));
        root.insert(
            "scenes".to_string(),
            described_section(
                self.scenes
                    .iter()
                    .map(|scene| (scene.name.as_str(), scene.description.as_str())),
            ),
        );
        root.insert(
            "settings".to_string(),
            Value::Object(
                self.settings
                    .iter()
                    .map(|setting| (setting.name.clone(), setting.to_declaration()))
                    .collect(),
            ),
        );
        root.insert(
            CAPABILITIES_KEY.to_string(),
            self.capabilities.to_document()[CAPABILITIES_KEY].clone(),
        );
        root.insert(
            "adaptations".to_string(),
            described_section(
                self.adaptations
                    .iter()
                    .map(|adaptation| (adaptation.name.as_str(), adaptation.description.as_str())),
            ),
        );
        Value::Object(root)
    }
}

/// Inverse of `described_entries`; empty descriptions are left out.
fn described_section<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> Value {
    let mut section = Map::new();
    for (name, description) in entries {
        let entry = if description.is_empty() {
            json!({})
        } else {
            json!({ "description": description })
        };
        section.insert(name.to_string(), entry);
    }
    Value::Object(section)
}
