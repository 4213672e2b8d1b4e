// @generated by capgen from the capability registry. Do not edit.

use capgen::runtime::{self as rt, Capability, LoadError, Value};

use super::{Capabilities, LoadCapabilities};

impl LoadCapabilities for Capabilities {
    fn load_from_capabilities_file(&mut self, root: &Value) -> Result<(), LoadError> {
        *self = Capabilities::default();

        if let Some(node) = rt::capabilities_section(root)? {
            if let Some(entry) = node.get("retries") {
                self.retries = Some(Capability {
                    value: rt::decode_field(entry, "retries", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "retries", rt::MODIFIABLE_FIELD)?,
                });
            }

            if let Some(entry) = node.get("loop") {
                self.r#loop = Some(Capability {
                    value: rt::decode_field(entry, "loop", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "loop", rt::MODIFIABLE_FIELD)?,
                });
            }

            if let Some(entry) = node.get("fixed_framerate") {
                self.fixed_framerate = Some(Capability {
                    value: rt::decode_field(entry, "fixed_framerate", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "fixed_framerate", rt::MODIFIABLE_FIELD)?,
                });
            }

            if let Some(entry) = node.get("non_interactive") {
                self.non_interactive = Some(Capability {
                    value: rt::decode_field(entry, "non_interactive", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "non_interactive", rt::MODIFIABLE_FIELD)?,
                });
            }

            if let Some(entry) = node.get("gpu_delay_reuse") {
                self.gpu_delay_reuse = Some(Capability {
                    value: rt::decode_field(entry, "gpu_delay_reuse", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "gpu_delay_reuse", rt::MODIFIABLE_FIELD)?,
                });
            }

            if let Some(entry) = node.get("loop_time") {
                self.loop_time = Some(Capability {
                    value: rt::decode_field(entry, "loop_time", rt::DEFAULT_FIELD)?,
                    modifiable: rt::decode_field(entry, "loop_time", rt::MODIFIABLE_FIELD)?,
                });
            }
        }

        Ok(())
    }

    fn load_from_enable_file(
        &mut self,
        capabilities: &Capabilities,
        root: &Value,
        add_capabilities_file_defaults: bool,
    ) -> Result<(), LoadError> {
        *self = Capabilities::default();

        if let Some(node) = rt::capabilities_section(root)? {
            if let Some(entry) = node.get("retries") {
                let granted = rt::require_modifiable(capabilities.retries.as_ref(), "retries")?;
                let value: i32 = rt::decode_field(entry, "retries", rt::DEFAULT_FIELD)?;
                rt::check_min("retries", &value, 0)?;
                rt::check_max("retries", &value, 5)?;
                self.retries = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.retries = capabilities.retries;
            }

            if let Some(entry) = node.get("loop") {
                let granted = rt::require_modifiable(capabilities.r#loop.as_ref(), "loop")?;
                let value: bool = rt::decode_field(entry, "loop", rt::DEFAULT_FIELD)?;
                self.r#loop = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.r#loop = capabilities.r#loop;
            }

            if let Some(entry) = node.get("fixed_framerate") {
                let granted = rt::require_modifiable(capabilities.fixed_framerate.as_ref(), "fixed_framerate")?;
                let value: f32 = rt::decode_field(entry, "fixed_framerate", rt::DEFAULT_FIELD)?;
                rt::check_min("fixed_framerate", &value, 1.0)?;
                rt::check_max("fixed_framerate", &value, 240.0)?;
                self.fixed_framerate = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.fixed_framerate = capabilities.fixed_framerate;
            }

            if let Some(entry) = node.get("non_interactive") {
                let granted = rt::require_modifiable(capabilities.non_interactive.as_ref(), "non_interactive")?;
                let value: bool = rt::decode_field(entry, "non_interactive", rt::DEFAULT_FIELD)?;
                self.non_interactive = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.non_interactive = capabilities.non_interactive;
            }

            if let Some(entry) = node.get("gpu_delay_reuse") {
                let granted = rt::require_modifiable(capabilities.gpu_delay_reuse.as_ref(), "gpu_delay_reuse")?;
                let value: u32 = rt::decode_field(entry, "gpu_delay_reuse", rt::DEFAULT_FIELD)?;
                self.gpu_delay_reuse = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.gpu_delay_reuse = capabilities.gpu_delay_reuse;
            }

            if let Some(entry) = node.get("loop_time") {
                let granted = rt::require_modifiable(capabilities.loop_time.as_ref(), "loop_time")?;
                let value: f64 = rt::decode_field(entry, "loop_time", rt::DEFAULT_FIELD)?;
                rt::check_min("loop_time", &value, 0.5)?;
                self.loop_time = Some(Capability {
                    value,
                    modifiable: granted.modifiable,
                });
            } else if add_capabilities_file_defaults {
                self.loop_time = capabilities.loop_time;
            }
        }

        Ok(())
    }
}
