//! Config flow: collect, validate and persist a projector's settings
//!
//! The flow is a small state machine driven by the host UI. Each step takes
//! the submitted form (or `None` on first display) and answers with a
//! [`FlowResult`] telling the host what to do next.

use std::collections::BTreeMap;
use std::sync::Arc;

use pjlink_client::Connector;
use pjlink_coordinator::ERR_PROJECTOR_UNAVAILABLE;
use tracing::{debug, error};

use crate::config::{ConfigEntry, ProjectorConfig};
use crate::constants::{
    CONF_ENCODING, CONF_HOST, CONF_NAME, CONF_PASSWORD, CONF_PORT, DEFAULT_ENCODING, DEFAULT_PORT,
};

/// Form error for failures that are not connectivity problems
pub const ERR_UNKNOWN: &str = "unknown";
/// Form error for a port outside 1..=65535
pub const ERR_INVALID_PORT: &str = "invalid_port";
/// Abort reason when the host already has an entry
pub const ABORT_ALREADY_CONFIGURED: &str = "already_configured";
/// Abort reason when confirm is reached without a validated user step
pub const ABORT_NOTHING_TO_CONFIRM: &str = "nothing_to_confirm";

/// Form key for errors not tied to one field
pub const BASE_ERROR_KEY: &str = "base";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    User,
    Confirm,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::User => "user",
            FlowStep::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Port,
}

/// One field of a form the host should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
}

impl FormField {
    fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: true,
            default: None,
        }
    }

    fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Schema of the user step form
pub fn user_schema() -> Vec<FormField> {
    vec![
        FormField::new(CONF_NAME, FieldKind::Text),
        FormField::new(CONF_HOST, FieldKind::Text),
        FormField::new(CONF_PORT, FieldKind::Port).with_default(DEFAULT_PORT.to_string()),
        FormField::new(CONF_PASSWORD, FieldKind::Text)
            .with_default("")
            .optional(),
        FormField::new(CONF_ENCODING, FieldKind::Text)
            .with_default(DEFAULT_ENCODING)
            .optional(),
    ]
}

/// What the host should do after a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    ShowForm {
        step: FlowStep,
        schema: Vec<FormField>,
        errors: BTreeMap<String, String>,
    },
    CreateEntry {
        title: String,
        unique_id: String,
        data: ProjectorConfig,
    },
    Abort {
        reason: String,
    },
}

impl FlowResult {
    /// Form errors, `None` for anything but a form
    pub fn errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            FlowResult::ShowForm { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Turn a created entry into the persisted form, using the host's id
    pub fn into_entry(self, entry_id: impl Into<String>) -> Option<ConfigEntry> {
        match self {
            FlowResult::CreateEntry { data, .. } => Some(ConfigEntry::new(entry_id, data)),
            _ => None,
        }
    }
}

/// Config flow for one projector
pub struct ConfigFlow {
    connector: Arc<dyn Connector>,
    pending: Option<ProjectorConfig>,
}

impl ConfigFlow {
    pub const VERSION: u32 = ConfigEntry::VERSION;

    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            pending: None,
        }
    }

    /// Settings validated by the last successful user step
    pub fn pending(&self) -> Option<&ProjectorConfig> {
        self.pending.as_ref()
    }

    /// Handle the user step
    ///
    /// `existing` are the entries already configured; a host that is
    /// already among them aborts the flow.
    pub fn step_user(
        &mut self,
        input: Option<ProjectorConfig>,
        existing: &[ConfigEntry],
    ) -> FlowResult {
        let Some(config) = input else {
            return show_user_form(BTreeMap::new());
        };

        let mut errors = BTreeMap::new();
        if config.port == 0 {
            errors.insert(CONF_PORT.to_string(), ERR_INVALID_PORT.to_string());
            return show_user_form(errors);
        }

        if let Err(code) = self.validate(&config) {
            errors.insert(BASE_ERROR_KEY.to_string(), code.to_string());
            return show_user_form(errors);
        }

        if existing.iter().any(|e| e.unique_id == config.host) {
            debug!("Projector {} already configured", config.host);
            return FlowResult::Abort {
                reason: ABORT_ALREADY_CONFIGURED.to_string(),
            };
        }

        self.pending = Some(config.clone());
        create_entry(config)
    }

    /// Handle the confirm step
    ///
    /// Without confirmation the confirm form is shown; once confirmed the
    /// entry is created from the values the user step validated.
    pub fn step_confirm(&mut self, confirmed: bool) -> FlowResult {
        let Some(config) = self.pending.clone() else {
            return FlowResult::Abort {
                reason: ABORT_NOTHING_TO_CONFIRM.to_string(),
            };
        };

        if !confirmed {
            return FlowResult::ShowForm {
                step: FlowStep::Confirm,
                schema: Vec::new(),
                errors: BTreeMap::new(),
            };
        }

        create_entry(config)
    }

    /// Open one session and authenticate, mapping failures to form errors
    fn validate(&self, config: &ProjectorConfig) -> std::result::Result<(), &'static str> {
        let outcome = self
            .connector
            .connect(&config.host, config.port, &config.encoding)
            .and_then(|mut projector| {
                let credential = config.credential();
                let result = projector.authenticate(credential.as_deref());
                projector.close();
                result
            });

        match outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_connectivity() => {
                debug!("Projector {} unreachable: {}", config.host, e);
                Err(ERR_PROJECTOR_UNAVAILABLE)
            }
            Err(e) => {
                error!("Unexpected error validating projector {}: {}", config.host, e);
                Err(ERR_UNKNOWN)
            }
        }
    }
}

impl std::fmt::Debug for ConfigFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFlow")
            .field("pending", &self.pending.as_ref().map(|c| &c.host))
            .finish()
    }
}

fn show_user_form(errors: BTreeMap<String, String>) -> FlowResult {
    FlowResult::ShowForm {
        step: FlowStep::User,
        schema: user_schema(),
        errors,
    }
}

fn create_entry(config: ProjectorConfig) -> FlowResult {
    FlowResult::CreateEntry {
        title: config.name.clone(),
        unique_id: config.host.clone(),
        data: config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_schema_defaults() {
        let schema = user_schema();
        let keys: Vec<_> = schema.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["name", "host", "port", "password", "encoding"]);

        let port = &schema[2];
        assert_eq!(port.kind, FieldKind::Port);
        assert_eq!(port.default.as_deref(), Some("4352"));
        assert!(port.required);
        assert!(!schema[3].required);
        assert_eq!(schema[4].default.as_deref(), Some("utf-8"));
    }

    #[test]
    fn test_step_names() {
        assert_eq!(FlowStep::User.as_str(), "user");
        assert_eq!(FlowStep::Confirm.as_str(), "confirm");
    }

    #[test]
    fn test_into_entry_only_for_created() {
        let created = create_entry(ProjectorConfig::new("Hall", "10.0.0.9"));
        let entry = created.into_entry("abc").unwrap();
        assert_eq!(entry.entry_id, "abc");
        assert_eq!(entry.unique_id, "10.0.0.9");

        let form = show_user_form(BTreeMap::new());
        assert!(form.errors().unwrap().is_empty());
        assert!(form.into_entry("abc").is_none());
    }
}
