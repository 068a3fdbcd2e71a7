//! Runtime configuration and the heuristic data tables.
//!
//! Everything here is plain data. The extension passes a partial object from
//! JS which is merged over [`RedraftConfig::default`]; any table can be
//! replaced without touching the algorithms that read it.

use serde::{Deserialize, Serialize};

use crate::types::FrameworkVariant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedraftConfig {
    /// Context cap, in estimated tokens.
    pub token_budget: usize,
    /// Harvested messages shorter than this (after cleaning) are discarded.
    pub min_message_chars: usize,
    /// Fallback scan: block text must be strictly longer than this...
    pub fallback_min_chars: usize,
    /// ...and strictly shorter than this.
    pub fallback_max_chars: usize,
    pub writer: WriterConfig,
    pub tables: SelectorTables,
}

impl Default for RedraftConfig {
    fn default() -> Self {
        Self {
            token_budget: 2000,
            min_message_chars: 2,
            fallback_min_chars: 10,
            fallback_max_chars: 1000,
            writer: WriterConfig::default(),
            tables: SelectorTables::default(),
        }
    }
}

/// Timing knobs for the write recipes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WriterConfig {
    /// Pause after a paste so the host framework can reconcile.
    pub settle_delay_ms: u32,
    /// Number of event bursts the subtree reset strategy tries.
    pub reset_attempts: u32,
    /// Pause between reset bursts.
    pub burst_delay_ms: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            reset_attempts: 3,
            burst_delay_ms: 20,
        }
    }
}

/// Named list of CSS selectors, optionally restricted to some hosts.
///
/// A group with no hosts is generic and applies everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorGroup {
    pub name: String,
    pub hosts: Vec<String>,
    pub selectors: Vec<String>,
}

impl Default for SelectorGroup {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            hosts: Vec::new(),
            selectors: Vec::new(),
        }
    }
}

impl SelectorGroup {
    pub fn new(name: &str, hosts: &[&str], selectors: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            hosts: to_strings(hosts),
            selectors: to_strings(selectors),
        }
    }

    pub fn is_generic(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Exact or subdomain match: `slack.com` matches `app.slack.com`.
    pub fn matches_host(&self, hostname: &str) -> bool {
        let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
        self.hosts.iter().any(|host| {
            let host = host.to_ascii_lowercase();
            hostname == host
                || hostname
                    .strip_suffix(host.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

/// Orders groups for a page: host-specific matches first, then generic ones.
/// Groups bound to other hosts are left out.
pub fn ordered_groups<'a>(groups: &'a [SelectorGroup], hostname: &str) -> Vec<&'a SelectorGroup> {
    let host_specific = groups
        .iter()
        .filter(|g| !g.is_generic() && g.matches_host(hostname));
    let generic = groups.iter().filter(|g| g.is_generic());
    host_specific.chain(generic).collect()
}

/// Detection markers for one rich-text editor framework.
///
/// Any single marker is enough for a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSignature {
    pub variant: FrameworkVariant,
    /// Class tokens on the editable node itself.
    #[serde(default)]
    pub marker_classes: Vec<String>,
    /// Attribute names present on the editable node.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Expando properties the framework leaves on the node.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Selectors matched against ancestors and descendants of the node.
    #[serde(default)]
    pub containers: Vec<String>,
}

impl FrameworkSignature {
    fn new(
        variant: FrameworkVariant,
        marker_classes: &[&str],
        attributes: &[&str],
        properties: &[&str],
        containers: &[&str],
    ) -> Self {
        Self {
            variant,
            marker_classes: to_strings(marker_classes),
            attributes: to_strings(attributes),
            properties: to_strings(properties),
            containers: to_strings(containers),
        }
    }

    pub fn defaults() -> Vec<FrameworkSignature> {
        vec![
            Self::new(
                FrameworkVariant::Quill,
                &["ql-editor"],
                &[],
                &["__quill"],
                &[".ql-container"],
            ),
            Self::new(
                FrameworkVariant::DraftJs,
                &["public-DraftEditor-content"],
                &[],
                &[],
                &[".DraftEditor-root", "[data-contents=\"true\"]"],
            ),
            Self::new(
                FrameworkVariant::Lexical,
                &[],
                &["data-lexical-editor"],
                &["__lexicalEditor"],
                &[],
            ),
            Self::new(
                FrameworkVariant::ProseMirror,
                &["ProseMirror"],
                &[],
                &["pmViewDesc"],
                &[],
            ),
            Self::new(
                FrameworkVariant::Slate,
                &[],
                &["data-slate-editor"],
                &[],
                &["[data-slate-node=\"value\"]"],
            ),
        ]
    }
}

/// All selector and signature tables the heuristics read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorTables {
    pub surface_groups: Vec<SelectorGroup>,
    pub message_groups: Vec<SelectorGroup>,
    pub message_text_selectors: Vec<String>,
    pub timestamp_selectors: Vec<String>,
    pub self_indicators: Vec<String>,
    pub edit_affordances: Vec<String>,
    pub author_selectors: Vec<String>,
    pub current_user_selectors: Vec<String>,
    pub media_class_signatures: Vec<String>,
    pub frameworks: Vec<FrameworkSignature>,
}

impl Default for SelectorTables {
    fn default() -> Self {
        Self {
            surface_groups: default_surface_groups(),
            message_groups: default_message_groups(),
            message_text_selectors: to_strings(&[
                ".message-text",
                ".msg-text",
                ".content",
                ".text",
                ".body",
                ".message-content",
                ".chat-content",
            ]),
            timestamp_selectors: to_strings(&[
                ".timestamp",
                ".time",
                ".date",
                ".message-time",
                "time",
                "[datetime]",
            ]),
            self_indicators: to_strings(&[
                ".sent",
                ".outgoing",
                ".my-message",
                ".user-message",
                ".own-message",
                "[data-sender=\"me\"]",
                "[data-from=\"me\"]",
                ".message-out",
                ".message-sent",
            ]),
            edit_affordances: to_strings(&[
                "[aria-label=\"Edit\"]",
                "[aria-label=\"Edit message\"]",
                "[data-action=\"edit\"]",
                ".edit-message",
            ]),
            author_selectors: to_strings(&[
                "[data-author]",
                ".author",
                ".sender",
                ".username",
                ".msg-s-message-group__name",
            ]),
            current_user_selectors: to_strings(&[
                "meta[name=\"user-login\"]",
                "[data-current-user]",
                ".current-user",
            ]),
            media_class_signatures: to_strings(&[
                "image", "photo", "media", "avatar", "emoji", "sticker", "gif", "video",
            ]),
            frameworks: FrameworkSignature::defaults(),
        }
    }
}

fn default_surface_groups() -> Vec<SelectorGroup> {
    vec![
        SelectorGroup::new(
            "gmail",
            &["mail.google.com"],
            &[
                "div[aria-label=\"Message Body\"][contenteditable]",
                "div.editable[contenteditable=\"true\"]",
            ],
        ),
        SelectorGroup::new(
            "x",
            &["x.com", "twitter.com"],
            &[
                "[data-testid=\"dmComposerTextInput\"]",
                "[data-testid=\"tweetTextarea_0\"]",
            ],
        ),
        SelectorGroup::new(
            "whatsapp",
            &["web.whatsapp.com"],
            &["footer div[contenteditable=\"true\"]"],
        ),
        SelectorGroup::new(
            "slack",
            &["slack.com"],
            &[".ql-editor[contenteditable=\"true\"]"],
        ),
        SelectorGroup::new(
            "discord",
            &["discord.com"],
            &["div[role=\"textbox\"][data-slate-editor]"],
        ),
        SelectorGroup::new(
            "linkedin",
            &["linkedin.com"],
            &[".msg-form__contenteditable", ".ql-editor"],
        ),
        SelectorGroup::new(
            "facebook",
            &["facebook.com", "messenger.com"],
            &["div[role=\"textbox\"][contenteditable=\"true\"]"],
        ),
        SelectorGroup::new(
            "generic",
            &[],
            &[
                "textarea",
                "input[type=\"text\"]",
                "input[type=\"email\"]",
                "input[type=\"search\"]",
                "[contenteditable=\"true\"]",
                "[contenteditable=\"\"]",
                "[contenteditable=\"plaintext-only\"]",
                ".compose-text",
                ".message-input",
                ".chat-input",
                ".reply-input",
                "[role=\"textbox\"]",
            ],
        ),
    ]
}

fn default_message_groups() -> Vec<SelectorGroup> {
    vec![
        SelectorGroup::new("gmail", &["mail.google.com"], &["div[data-message-id]"]),
        SelectorGroup::new(
            "x",
            &["x.com", "twitter.com"],
            &[
                "[data-testid=\"messageEntry\"]",
                "article[data-testid=\"tweet\"]",
            ],
        ),
        SelectorGroup::new(
            "whatsapp",
            &["web.whatsapp.com"],
            &["div.message-in", "div.message-out"],
        ),
        SelectorGroup::new(
            "slack",
            &["slack.com"],
            &["[data-qa=\"message_container\"]"],
        ),
        SelectorGroup::new(
            "discord",
            &["discord.com"],
            &["li[id^=\"chat-messages-\"]"],
        ),
        SelectorGroup::new("linkedin", &["linkedin.com"], &[".msg-s-event-listitem"]),
        SelectorGroup::new(
            "facebook",
            &["facebook.com", "messenger.com"],
            &["div[role=\"row\"]"],
        ),
        SelectorGroup::new(
            "generic",
            &[],
            &[
                ".message",
                ".msg",
                ".chat-message",
                ".conversation-item",
                ".thread-item",
                ".comment",
                ".reply",
                "[data-testid*=\"message\"]",
                "[data-testid*=\"msg\"]",
                ".conversation-message",
                ".chat-bubble",
                ".message-content",
                "div[role=\"listitem\"]",
                "div[role=\"article\"]",
                ".conversation",
                ".chat",
                ".thread",
                ".discussion",
                ".post",
                ".tweet",
                ".status",
                "article",
                "section[class*=\"message\"]",
                "div[class*=\"message\"]",
                "div[class*=\"chat\"]",
                "div[class*=\"conversation\"]",
            ],
        ),
    ]
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
