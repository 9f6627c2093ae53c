//! Matching attributed functions against the requested groupings.

use crate::core::{ClassificationResult, GroupEntry, Grouping, MethodDeclaration};
use crate::observability::{set_phase, ScanPhase};
use tracing::debug;

/// One entry per grouping, in the order the groupings were requested.
///
/// A function lands in a grouping's list iff it has a registration name and
/// carries that grouping's marker identity. Names keep scan order and are
/// never sorted or de-duplicated; a grouping with no match still gets an
/// empty entry.
pub fn classify(
    declarations: &[MethodDeclaration],
    groupings: &[Grouping],
) -> ClassificationResult {
    let _phase = set_phase(ScanPhase::Classification);

    let entries = groupings
        .iter()
        .map(|grouping| {
            let names: Vec<String> = declarations
                .iter()
                .filter(|declaration| declaration.carries(&grouping.marker))
                .filter_map(|declaration| declaration.registration_name.clone())
                .collect();
            debug!(marker = %grouping.marker, matches = names.len(), "Classified grouping");
            GroupEntry {
                grouping: grouping.clone(),
                names,
            }
        })
        .collect();

    ClassificationResult { entries }
}
