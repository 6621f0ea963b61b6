use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for publishing an event to LogSnag.
///
/// `project` is always replaced by the client's own project before sending.
/// `auto_add_user_id` is a local instruction and never appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    pub(crate) channel: String,
    pub(crate) event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,
    #[serde(skip)]
    pub(crate) auto_add_user_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tags: Option<BTreeMap<String, String>>,
}

/// Options for identifying a user with LogSnag.
///
/// `project` is always replaced by the client's own project before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) project: Option<String>,
}

impl PublishOptions {
    /// Create publish options for `event` in `channel`.
    pub fn new(channel: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            event: event.into(),
            description: None,
            icon: None,
            notify: None,
            project: None,
            user_id: None,
            auto_add_user_id: false,
            tags: None,
        }
    }

    /// Set the event description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the event icon, usually a single emoji.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Request a push notification for this event.
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Set the project. The client overwrites this with its own project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the user id the event is attributed to.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attribute the event to a generated, persisted anonymous user id.
    ///
    /// Ignored when a user id is set explicitly.
    pub fn with_auto_add_user_id(mut self, auto_add_user_id: bool) -> Self {
        self.auto_add_user_id = auto_add_user_id;
        self
    }

    /// Replace all tags.
    pub fn with_tags<K, V>(mut self, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = Some(
            tags.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add a single tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Event name.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Event description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Event icon.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Whether a push notification is requested.
    pub fn notify(&self) -> Option<bool> {
        self.notify
    }

    /// Project slug.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// User id.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether an anonymous user id should be added.
    pub fn auto_add_user_id(&self) -> bool {
        self.auto_add_user_id
    }

    /// Tags.
    pub fn tags(&self) -> Option<&BTreeMap<String, String>> {
        self.tags.as_ref()
    }

    /// True when the client has to fill in a generated user id.
    ///
    /// An explicit user id always wins over auto assignment.
    pub fn wants_generated_user_id(&self) -> bool {
        self.auto_add_user_id && self.user_id.is_none()
    }
}

impl IdentifyOptions {
    /// Create empty identify options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user id being identified.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Replace all properties.
    pub fn with_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.properties = Some(
            properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add a single property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the project. The client overwrites this with its own project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// User id.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Properties.
    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.properties.as_ref()
    }

    /// Project slug.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_omits_absent_fields() {
        let options = PublishOptions::new("test-channel", "X");
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({"channel": "test-channel", "event": "X"}));
    }

    #[test]
    fn test_publish_wire_names() {
        let options = PublishOptions::new("payments", "New Subscription")
            .with_description("Plan: pro")
            .with_icon("💰")
            .with_notify(true)
            .with_user_id("user-1")
            .with_auto_add_user_id(true)
            .with_tag("plan", "pro");
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({
                "channel": "payments",
                "event": "New Subscription",
                "description": "Plan: pro",
                "icon": "💰",
                "notify": true,
                "user_id": "user-1",
                "tags": {"plan": "pro"},
            })
        );
        assert!(value.get("autoAddUserId").is_none());
        assert!(value.get("auto_add_user_id").is_none());
    }

    #[test]
    fn test_empty_values_are_kept() {
        let options = PublishOptions::new("", "").with_tags(Vec::<(String, String)>::new());
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({"channel": "", "event": "", "tags": {}}));
    }

    #[test]
    fn test_wants_generated_user_id() {
        let options = PublishOptions::new("c", "e");
        assert!(!options.wants_generated_user_id());

        let options = options.with_auto_add_user_id(true);
        assert!(options.wants_generated_user_id());

        let options = options.with_user_id("explicit");
        assert!(!options.wants_generated_user_id());
    }

    #[test]
    fn test_identify_wire_names() {
        let options = IdentifyOptions::new()
            .with_user_id("1")
            .with_property("name", "X")
            .with_property("email", "email@example.com");
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({"user_id": "1", "properties": {"name": "X", "email": "email@example.com"}})
        );
    }

    #[test]
    fn test_decode_ignores_project_and_flag() {
        let options: PublishOptions = serde_json::from_value(json!({
            "channel": "c",
            "event": "e",
            "project": "p",
            "autoAddUserId": true,
        }))
        .unwrap();
        assert_eq!(options.project(), Some("p"));
        assert!(!options.auto_add_user_id());
    }
}
