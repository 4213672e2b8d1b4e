use crate::documents::capabilities_file::CapabilitiesFile;
use crate::documents::settings::Setting;
use crate::documents::{FileError, invalid, object_section, optional_str, required_str};
use crate::registry::Registry;
use crate::runtime::CAPABILITIES_KEY;
use crate::snapshot::CapabilitySnapshot;
use serde_json::{Map, Value, json};

/// Why a run was enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnableIntent {
    #[default]
    Undefined,
    Showcase,
    Benchmark,
    Testing,
}

impl EnableIntent {
    pub fn parse(raw: &str) -> Result<Self, FileError> {
        match raw {
            "showcase" => Ok(EnableIntent::Showcase),
            "benchmark" => Ok(EnableIntent::Benchmark),
            "testing" => Ok(EnableIntent::Testing),
            other => Err(FileError::UnknownIntent {
                intent: other.to_string(),
            }),
        }
    }

    /// Document spelling; `None` for [`EnableIntent::Undefined`].
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            EnableIntent::Undefined => None,
            EnableIntent::Showcase => Some("showcase"),
            EnableIntent::Benchmark => Some("benchmark"),
            EnableIntent::Testing => Some("testing"),
        }
    }
}

/// One run's selection out of a [`CapabilitiesFile`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnableFile {
    pub target: String,
    pub scenes: Vec<String>,
    pub intent: EnableIntent,
    pub results: String,
    pub settings: Vec<Setting>,
    pub capabilities: CapabilitySnapshot,
    pub adaptations: Vec<(String, bool)>,
}

impl EnableFile {
    /// Load an enable file against `base`.
    ///
    /// With `add_capabilities_file_defaults`, base settings that carry a
    /// default and are not set here are copied in (only when this file has
    /// a `settings` section), and unset capabilities are inherited.
    pub fn load(
        registry: &Registry,
        base: &CapabilitiesFile,
        root: &Value,
        add_capabilities_file_defaults: bool,
    ) -> Result<Self, FileError> {
        let target = required_str(root, "target")?;
        if target != base.name {
            return Err(FileError::TargetMismatch {
                target: target.to_string(),
                name: base.name.clone(),
            });
        }

        let scenes = load_scenes(base, root)?;

        let intent = match optional_str(root, "intent", "intent")? {
            Some(raw) => EnableIntent::parse(raw)?,
            None => EnableIntent::Undefined,
        };
        let results = optional_str(root, "results", "results")?
            .unwrap_or_default()
            .to_string();

        let mut settings: Vec<Setting> = Vec::new();
        if let Some(section) = object_section(root, "settings")? {
            for (name, raw) in section {
                let declared = base.setting(name).ok_or_else(|| FileError::UnknownSetting {
                    setting: name.clone(),
                })?;
                settings.push(declared.assign(raw)?);
            }
            if add_capabilities_file_defaults {
                for declared in &base.settings {
                    let overridden = settings.iter().any(|s| s.name == declared.name);
                    if overridden || declared.value.is_none() {
                        continue;
                    }
                    tracing::trace!(setting = %declared.name, "setting inherited");
                    settings.push(declared.clone());
                }
            }
        }

        let capabilities = CapabilitySnapshot::load_effective(
            registry,
            &base.capabilities,
            root,
            add_capabilities_file_defaults,
        )?;

        let mut adaptations = Vec::new();
        if let Some(section) = object_section(root, "adaptations")? {
            for (name, raw) in section {
                if base.adaptation(name).is_none() {
                    return Err(FileError::UnknownAdaptation {
                        adaptation: name.clone(),
                    });
                }
                let enabled = raw
                    .as_bool()
                    .ok_or_else(|| invalid(format!("adaptations.{name}"), "a boolean"))?;
                adaptations.push((name.clone(), enabled));
            }
        }

        let file = EnableFile {
            target: target.to_string(),
            scenes,
            intent,
            results,
            settings,
            capabilities,
            adaptations,
        };
        tracing::debug!(
            name = %file.target,
            scenes = file.scenes.len(),
            settings = file.settings.len(),
            capabilities = file.capabilities.len(),
            "enable file loaded"
        );
        Ok(file)
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|setting| setting.name == name)
    }

    /// `None` when the enable file does not mention the adaptation.
    pub fn adaptation_enabled(&self, name: &str) -> Option<bool> {
        self.adaptations
            .iter()
            .find(|(adaptation, _)| adaptation == name)
            .map(|(_, enabled)| *enabled)
    }

    pub fn to_document(&self) -> Value {
        let mut root = Map::new();
        root.insert("target".to_string(), json!(self.target));
        root.insert("scenes".to_string(), json!(self.scenes));
        if let Some(intent) = self.intent.as_str() {
            root.insert("intent".to_string(), json!(intent));
        }
        if !self.results.is_empty() {
            root.insert("results".to_string(), json!(self.results));
        }
        let mut settings = Map::new();
        for setting in &self.settings {
            if let Some(value) = setting.value_json() {
                settings.insert(setting.name.clone(), value);
            }
        }
        root.insert("settings".to_string(), Value::Object(settings));
        root.insert(
            CAPABILITIES_KEY.to_string(),
            self.capabilities.to_document()[CAPABILITIES_KEY].clone(),
        );
        root.insert(
            "adaptations".to_string(),
            Value::Object(
                self.adaptations
                    .iter()
                    .map(|(name, enabled)| (name.clone(), json!(enabled)))
                    .collect(),
            ),
        );
        Value::Object(root)
    }
}

fn load_scenes(base: &CapabilitiesFile, root: &Value) -> Result<Vec<String>, FileError> {
    let Some(raw) = root.get("scenes") else {
        return Ok(Vec::new());
    };
    let entries = raw
        .as_array()
        .ok_or_else(|| invalid("scenes", "an array of strings"))?;
    let mut scenes: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let scene = entry
            .as_str()
            .ok_or_else(|| invalid("scenes", "an array of strings"))?;
        if base.scene(scene).is_none() {
            return Err(FileError::UnknownScene {
                scene: scene.to_string(),
            });
        }
        if scenes.iter().any(|known| known == scene) {
            return Err(FileError::DuplicateScene {
                scene: scene.to_string(),
            });
        }
        scenes.push(scene.to_string());
    }
    Ok(scenes)
}
