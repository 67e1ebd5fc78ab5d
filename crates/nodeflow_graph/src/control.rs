// SPDX-License-Identifier: MIT OR Apache-2.0
//! User-editable controls attached to nodes and port slots.

use crate::id::uid;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a control
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(pub String);

impl ControlId {
    /// Create a new random control ID
    pub fn new() -> Self {
        Self(uid())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ControlId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal control capability
pub trait Control: Send + Sync {
    /// Control id
    fn id(&self) -> &ControlId;

    /// Sort index among sibling controls
    fn index(&self) -> i64;

    /// Current value. Controls without a value report `null`.
    fn value(&self) -> Value;
}

/// A control with identity only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseControl {
    /// Unique control ID
    pub id: ControlId,
    /// Sort index, `0` by default
    pub index: i64,
}

impl BaseControl {
    /// Create a control with a fresh id
    pub fn new() -> Self {
        Self {
            id: ControlId::new(),
            index: 0,
        }
    }

    /// Create a control with a known id and index
    pub fn with_id(id: ControlId, index: i64) -> Self {
        Self { id, index }
    }
}

impl Default for BaseControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for BaseControl {
    fn id(&self) -> &ControlId {
        &self.id
    }

    fn index(&self) -> i64 {
        self.index
    }

    fn value(&self) -> Value {
        Value::Null
    }
}

/// Editor widget kind of an [`InputControl`]
///
/// Tags other than `text` and `number` are kept verbatim so plain data
/// written by newer tools survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputControlType {
    /// Free text entry
    Text,
    /// Numeric entry
    Number,
    /// Any other widget tag
    Other(String),
}

impl InputControlType {
    /// Wire tag of this type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for InputControlType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => Self::Text,
            "number" => Self::Number,
            _ => Self::Other(tag),
        }
    }
}

impl From<InputControlType> for String {
    fn from(kind: InputControlType) -> Self {
        match kind {
            InputControlType::Other(tag) => tag,
            other => other.as_str().to_owned(),
        }
    }
}

/// Callback invoked after an [`InputControl`] value changes
pub type ChangeCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Construction options for an [`InputControl`]
#[derive(Clone, Default)]
pub struct InputControlOptions {
    /// Whether the widget is read-only (`None` = unset)
    pub readonly: Option<bool>,
    /// Initial value
    pub initial: Value,
    /// Change hook into the UI layer
    pub on_change: Option<ChangeCallback>,
}

impl InputControlOptions {
    /// Options with an initial value
    pub fn new(initial: impl Into<Value>) -> Self {
        Self {
            initial: initial.into(),
            ..Self::default()
        }
    }

    /// Set the read-only flag
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = Some(readonly);
        self
    }

    /// Set the change hook
    pub fn on_change(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for InputControlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputControlOptions")
            .field("readonly", &self.readonly)
            .field("initial", &self.initial)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// Value-carrying control (text box, number field, ...)
pub struct InputControl {
    control: BaseControl,
    kind: InputControlType,
    options: InputControlOptions,
    readonly: Option<bool>,
    value: RwLock<Value>,
}

impl InputControl {
    /// Create a control whose value starts at `options.initial`
    pub fn new(kind: InputControlType, options: InputControlOptions) -> Self {
        Self {
            control: BaseControl::new(),
            kind,
            readonly: options.readonly,
            value: RwLock::new(options.initial.clone()),
            options,
        }
    }

    /// Rebuild a control from stored parts without running the change hook
    pub fn from_parts(
        control: BaseControl,
        kind: InputControlType,
        options: InputControlOptions,
        readonly: Option<bool>,
        value: Value,
    ) -> Self {
        Self {
            control,
            kind,
            options,
            readonly,
            value: RwLock::new(value),
        }
    }

    /// Identity part of this control
    pub fn base(&self) -> &BaseControl {
        &self.control
    }

    /// Widget kind
    pub fn kind(&self) -> &InputControlType {
        &self.kind
    }

    /// Construction options
    pub fn options(&self) -> &InputControlOptions {
        &self.options
    }

    /// Read-only flag (`None` = unset)
    pub fn readonly(&self) -> Option<bool> {
        self.readonly
    }

    /// Replace the value, then notify the change hook if one is set
    pub fn set_value(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.value.write() = value.clone();
        if let Some(on_change) = &self.options.on_change {
            on_change(&value);
        }
    }
}

impl Control for InputControl {
    fn id(&self) -> &ControlId {
        &self.control.id
    }

    fn index(&self) -> i64 {
        self.control.index
    }

    fn value(&self) -> Value {
        self.value.read().clone()
    }
}

impl fmt::Debug for InputControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputControl")
            .field("control", &self.control)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("readonly", &self.readonly)
            .field("value", &*self.value.read())
            .finish()
    }
}
