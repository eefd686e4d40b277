//! Console variables.

use glam::Vec3;
use thiserror::Error;

use super::{Module, MODULES};
use crate::utils::*;

/// Numeric console variable.
///
/// Holds a single number or a space-separated list of numbers. The value only exists while the
/// variable is registered.
pub struct CVar {
    /// Current value, `None` while not registered.
    value: MainThreadRefCell<Option<String>>,
    name: &'static str,
    default_value: &'static str,
    /// Description of this variable for documentation.
    description: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CVarError {
    #[error("unknown console variable `{0}`")]
    Unknown(String),
    #[error("console variable `{0}` is not registered")]
    NotRegistered(&'static str),
    #[error("invalid value for `{name}`: `{value}`")]
    InvalidValue { name: &'static str, value: String },
}

impl CVar {
    /// Creates a new variable.
    pub const fn new(
        name: &'static str,
        default_value: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            value: MainThreadRefCell::new(None),
            name,
            default_value,
            description,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> &'static str {
        self.default_value
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns `true` if the variable is currently registered.
    pub fn is_registered(&self, marker: MainThreadMarker) -> bool {
        self.value.borrow(marker).is_some()
    }

    /// Sets the value of the variable.
    ///
    /// The value must be made of numbers separated by whitespace.
    pub fn set(&self, marker: MainThreadMarker, value: &str) -> Result<(), CVarError> {
        let value = value.trim();
        let mut current = self.value.borrow_mut(marker);
        let Some(current) = current.as_mut() else {
            return Err(CVarError::NotRegistered(self.name));
        };

        match parse_floats(value) {
            Some(numbers) if !numbers.is_empty() => {}
            _ => {
                return Err(CVarError::InvalidValue {
                    name: self.name,
                    value: value.to_owned(),
                })
            }
        }

        if *current != value {
            debug!(name = self.name, value, "setting console variable");
            *current = value.to_owned();
        }

        Ok(())
    }

    /// Returns the value of the variable as a list of numbers.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not registered.
    fn numbers(&self, marker: MainThreadMarker) -> Vec<f32> {
        let value = self.value.borrow(marker);
        let value = value
            .as_deref()
            .unwrap_or_else(|| panic!("console variable `{}` is not registered", self.name));

        // Values are validated when set.
        parse_floats(value).unwrap_or_default()
    }

    /// Returns the `f32` value of the variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not registered.
    pub fn as_f32(&self, marker: MainThreadMarker) -> f32 {
        self.numbers(marker).first().copied().unwrap_or(0.)
    }

    /// Returns the `bool` value of the variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not registered.
    pub fn as_bool(&self, marker: MainThreadMarker) -> bool {
        self.as_f32(marker) != 0.
    }

    /// Returns the `i32` value of the variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not registered.
    pub fn as_i32(&self, marker: MainThreadMarker) -> i32 {
        self.as_f32(marker) as i32
    }

    /// Returns the value of the variable as a vector, missing components are zero.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not registered.
    pub fn as_vec3(&self, marker: MainThreadMarker) -> Vec3 {
        let numbers = self.numbers(marker);
        let component = |i: usize| numbers.get(i).copied().unwrap_or(0.);
        Vec3::new(component(0), component(1), component(2))
    }
}

/// Registers the variable, setting it to its default value.
///
/// # Panics
///
/// Panics if the variable is already registered.
fn register(marker: MainThreadMarker, cvar: &CVar) {
    let mut value = cvar.value.borrow_mut(marker);
    assert!(value.is_none(), "`{}` is already registered", cvar.name);

    *value = Some(cvar.default_value.to_owned());
}

fn deregister(marker: MainThreadMarker, cvar: &CVar) {
    *cvar.value.borrow_mut(marker) = None;
}

/// Registers the variables of all enabled modules.
pub fn register_all_cvars(marker: MainThreadMarker) {
    if !CVars.is_enabled(marker) {
        return;
    }

    for module in MODULES {
        if !module.is_enabled(marker) {
            continue;
        }

        for cvar in module.cvars() {
            register(marker, cvar);
        }
    }
}

/// De-registers all variables, which resets them to the default values on the next registration.
pub fn deregister_all_cvars(marker: MainThreadMarker) {
    for module in MODULES {
        for cvar in module.cvars() {
            deregister(marker, cvar);
        }
    }
}

/// Finds a variable by name.
///
/// Console variable names are case-insensitive.
pub fn find(name: &str) -> Option<&'static CVar> {
    MODULES
        .iter()
        .flat_map(|module| module.cvars())
        .copied()
        .find(|cvar| cvar.name.eq_ignore_ascii_case(name))
}

/// Sets a variable by name.
pub fn set(marker: MainThreadMarker, name: &str, value: &str) -> Result<(), CVarError> {
    let cvar = find(name).ok_or_else(|| CVarError::Unknown(name.to_owned()))?;
    cvar.set(marker, value)
}

pub struct CVars;
impl Module for CVars {
    fn name(&self) -> &'static str {
        "Console variables"
    }

    fn description(&self) -> &'static str {
        "Makes cod2x-rs able to register console variables."
    }

    fn is_enabled(&self, _marker: MainThreadMarker) -> bool {
        true
    }
}
