//! Finding the surface the user is typing into.

use crate::classify::Classifier;
use crate::config::{SelectorTables, ordered_groups};
use crate::host::{HostDocument, HostElement};
use crate::types::EditableSurface;

/// Most plausible editable surface on the page.
///
/// The focused element wins when it classifies as editable. Otherwise the
/// configured surface groups are walked (host-specific first) and the first
/// node the classifier accepts is returned. Pure read.
pub fn locate<D: HostDocument>(
    document: &D,
    classifier: &Classifier,
    tables: &SelectorTables,
) -> Option<EditableSurface<D::Element>> {
    if let Some(active) = document.active_element() {
        if let Some(kind) = classifier.classify(&active) {
            tracing::debug!(target: "redraft::locate", tag = %active.tag_name(), ?kind, "using focused element");
            return Some(EditableSurface::new(active, kind));
        }
    }

    let hostname = document.hostname();
    for group in ordered_groups(&tables.surface_groups, &hostname) {
        for selector in &group.selectors {
            for node in document.query_selector_all(selector) {
                if let Some(kind) = classifier.classify(&node) {
                    tracing::debug!(
                        target: "redraft::locate",
                        group = %group.name,
                        selector = %selector,
                        ?kind,
                        "surface matched"
                    );
                    return Some(EditableSurface::new(node, kind));
                }
            }
        }
    }

    tracing::debug!(target: "redraft::locate", %hostname, "no editable surface");
    None
}
