use std::collections::BTreeMap;

use super::operations::IrOperation;
use super::types::IrOperationGroup;
use crate::transform::name_normalizer::Normalizer;

/// Group operations by their primary tag, sorted by tag.
///
/// Operations keep their relative order within a group.
pub fn group_by_tag(operations: Vec<IrOperation>, naming: &Normalizer) -> Vec<IrOperationGroup> {
    let mut groups: BTreeMap<String, Vec<IrOperation>> = BTreeMap::new();
    for op in operations {
        groups.entry(op.tag.clone()).or_default().push(op);
    }

    groups
        .into_iter()
        .map(|(tag, operations)| IrOperationGroup {
            class_name: naming.api_name(&tag),
            tag: naming.normalize(&tag),
            operations,
        })
        .collect()
}
