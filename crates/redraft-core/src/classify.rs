//! Surface classification.
//!
//! A [`Classifier`] is an ordered table of capability probes. The first probe
//! that accepts a node decides its [`SurfaceKind`]; a node no probe accepts is
//! not editable. Framework probes are built from [`FrameworkSignature`] data,
//! so unknown editors fall through to the generic contenteditable path.

use crate::config::{FrameworkSignature, RedraftConfig};
use crate::host::HostElement;
use crate::types::SurfaceKind;

/// Input types that hold free text.
const TEXT_INPUT_TYPES: &[&str] = &["", "text", "email", "search", "url", "tel"];

/// What a strategy checks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    /// `<textarea>` or a text-like `<input>`, enabled and writable.
    PlainControl,
    /// An editable node carrying one of the signature's markers.
    Framework(FrameworkSignature),
    /// Any contenteditable or `role="textbox"` node.
    Editable,
}

impl Probe {
    pub fn accepts<E: HostElement>(&self, node: &E) -> bool {
        match self {
            Probe::PlainControl => is_plain_control(node),
            Probe::Framework(signature) => {
                is_editable_region(node) && signature_matches(signature, node)
            }
            Probe::Editable => is_editable_region(node),
        }
    }
}

/// A `(predicate, kind)` row of the probe table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceStrategy {
    pub probe: Probe,
    pub kind: SurfaceKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    strategies: Vec<SurfaceStrategy>,
}

impl Classifier {
    /// Plain controls, then one probe per signature, then generic editables.
    pub fn new(frameworks: &[FrameworkSignature]) -> Self {
        let mut strategies = vec![SurfaceStrategy {
            probe: Probe::PlainControl,
            kind: SurfaceKind::PlainControl,
        }];
        strategies.extend(frameworks.iter().map(|signature| SurfaceStrategy {
            kind: SurfaceKind::FrameworkEditor(signature.variant.clone()),
            probe: Probe::Framework(signature.clone()),
        }));
        strategies.push(SurfaceStrategy {
            probe: Probe::Editable,
            kind: SurfaceKind::ContentEditable,
        });
        Self { strategies }
    }

    pub fn from_config(config: &RedraftConfig) -> Self {
        Self::new(&config.tables.frameworks)
    }

    pub fn strategies(&self) -> &[SurfaceStrategy] {
        &self.strategies
    }

    /// Kind of the first accepting probe, `None` if the node is not editable.
    pub fn classify<E: HostElement>(&self, node: &E) -> Option<SurfaceKind> {
        self.strategies
            .iter()
            .find(|strategy| strategy.probe.accepts(node))
            .map(|strategy| strategy.kind.clone())
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&FrameworkSignature::defaults())
    }
}

fn is_plain_control<E: HostElement>(node: &E) -> bool {
    let writable = node.attribute("disabled").is_none() && node.attribute("readonly").is_none();
    match node.tag_name().as_str() {
        "textarea" => writable,
        "input" => {
            let kind = node.attribute("type").unwrap_or_default().to_ascii_lowercase();
            writable && TEXT_INPUT_TYPES.contains(&kind.trim())
        }
        _ => false,
    }
}

fn is_editable_region<E: HostElement>(node: &E) -> bool {
    node.is_content_editable()
        || node
            .attribute("role")
            .is_some_and(|role| role.eq_ignore_ascii_case("textbox"))
}

fn signature_matches<E: HostElement>(signature: &FrameworkSignature, node: &E) -> bool {
    let class_name = node.class_name();
    let has_class = signature
        .marker_classes
        .iter()
        .any(|marker| class_name.split_whitespace().any(|c| c == marker));

    has_class
        || signature
            .attributes
            .iter()
            .any(|attr| node.attribute(attr).is_some())
        || signature
            .properties
            .iter()
            .any(|prop| node.has_property(prop))
        || signature.containers.iter().any(|selector| {
            node.closest(selector).is_some() || node.query_selector(selector).is_some()
        })
}
