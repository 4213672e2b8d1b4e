// @generated by capgen from the capability registry. Do not edit.

use capgen::runtime::{Capability, LoadError, Value};

mod load;

/// Every capability declared in the registry, in registry order.
pub const CAPABILITY_NAMES: [&str; 6] = [
    "retries",
    "loop",
    "fixed_framerate",
    "non_interactive",
    "gpu_delay_reuse",
    "loop_time",
];

/// One optional entry per declared capability; `None` means not configured.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Capabilities {
    pub retries: Option<Capability<i32>>,
    pub r#loop: Option<Capability<bool>>,
    pub fixed_framerate: Option<Capability<f32>>,
    pub non_interactive: Option<Capability<bool>>,
    pub gpu_delay_reuse: Option<Capability<u32>>,
    pub loop_time: Option<Capability<f64>>,
}

/// Two-phase loading of a [`Capabilities`] aggregate.
pub trait LoadCapabilities {
    /// Resets every field, then loads defaults and modifiability from a
    /// capabilities file.
    fn load_from_capabilities_file(&mut self, root: &Value) -> Result<(), LoadError>;

    /// Resets every field, then applies the overrides of an enable file on
    /// top of `capabilities`, the aggregate loaded from the capabilities file.
    /// With `add_capabilities_file_defaults`, capabilities the enable file
    /// does not mention are inherited from `capabilities` unchanged.
    fn load_from_enable_file(
        &mut self,
        capabilities: &Capabilities,
        root: &Value,
        add_capabilities_file_defaults: bool,
    ) -> Result<(), LoadError>;
}
