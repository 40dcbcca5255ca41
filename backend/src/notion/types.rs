//! Wire types for the subset of the Notion API the service touches.

use std::collections::HashMap;

use serde::Deserialize;

/// Response of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database row or standalone page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Concatenated text of whichever property has the `title` type.
    pub fn title_text(&self) -> Option<String> {
        self.properties
            .values()
            .find(|p| p.kind.as_deref() == Some("title"))
            .map(PropertyValue::joined_title)
    }
}

/// One property value. Only the shapes the workflow reads are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<Vec<RichText>>,
    #[serde(default)]
    pub multi_select: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub relation: Option<Vec<RelationRef>>,
}

impl PropertyValue {
    pub fn title_segments(&self) -> &[RichText] {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn joined_title(&self) -> String {
        self.title_segments()
            .iter()
            .map(RichText::content)
            .collect::<String>()
    }

    pub fn option_names(&self) -> Vec<String> {
        self.multi_select
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|o| o.name.clone())
            .collect()
    }

    pub fn relation_ids(&self) -> Vec<String> {
        self.relation
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub plain_text: Option<String>,
}

impl RichText {
    /// Raw text content, falling back to the rendered plain text.
    pub fn content(&self) -> &str {
        self.text
            .as_ref()
            .map(|t| t.content.as_str())
            .or(self.plain_text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// Response of `POST /oauth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub owner: Option<TokenOwner>,
}

impl TokenResponse {
    /// Tenant id embedded in the response: the authorizing user, else the workspace.
    pub fn tenant_id(&self) -> Option<String> {
        self.owner
            .as_ref()
            .and_then(|o| o.user.as_ref())
            .map(|u| u.id.clone())
            .or_else(|| self.workspace_id.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenOwner {
    #[serde(default)]
    pub user: Option<TokenOwnerUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenOwnerUser {
    pub id: String,
}
