use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::ir::{IrOperation, IrParameter, ParamLocation};

use super::name_normalizer::{to_camel_case, to_snake_case};

/// Deduplicate `all_params` by `param_name` and rebuild every bucket from it.
///
/// The key ignores location: a later parameter replaces an earlier one with
/// the same identifier, in the earlier one's position. So a path-level `id`
/// followed by an operation-level query `id` leaves only the query one.
pub fn dedup_params(op: &mut IrOperation) {
    let mut deduped: Vec<IrParameter> = Vec::with_capacity(op.all_params.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for param in std::mem::take(&mut op.all_params) {
        match positions.get(&param.param_name) {
            Some(&index) => {
                debug!(
                    "{}: parameter `{}` replaces an earlier one with the same name",
                    op.operation_id, param.param_name
                );
                deduped[index] = param;
            }
            None => {
                positions.insert(param.param_name.clone(), deduped.len());
                deduped.push(param);
            }
        }
    }

    let in_location = |location: ParamLocation| -> Vec<IrParameter> {
        deduped
            .iter()
            .filter(|p| p.location == location)
            .cloned()
            .collect()
    };
    op.path_params = in_location(ParamLocation::Path);
    op.query_params = in_location(ParamLocation::Query);
    op.header_params = in_location(ParamLocation::Header);
    op.cookie_params = in_location(ParamLocation::Cookie);
    op.body_param = deduped.iter().find(|p| p.is_body_param()).cloned();
    op.required_params = deduped.iter().filter(|p| p.required).cloned().collect();
    op.optional_params = deduped.iter().filter(|p| !p.required).cloned().collect();
    op.all_params = deduped;
}

/// Make operation ids unique within one tag group.
///
/// The first occurrence keeps its id; later ones get the lowest numeric
/// suffix not already taken (`listPets`, `listPets1`, `listPets2`).
pub fn resolve_operation_id_collisions(operations: &mut [IrOperation]) {
    let mut taken: HashSet<String> = operations.iter().map(|op| op.operation_id.clone()).collect();
    let mut kept: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    for op in operations.iter_mut() {
        if kept.insert(op.operation_id.clone()) {
            continue;
        }
        let base = op.operation_id.clone();
        let counter = counters.entry(base.clone()).or_insert(0);
        let renamed = loop {
            *counter += 1;
            let candidate = format!("{base}{counter}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        warn!(
            "duplicate operationId `{base}` at {} {} renamed to `{renamed}`",
            op.http_method.as_str(),
            op.path
        );
        taken.insert(renamed.clone());
        kept.insert(renamed.clone());
        rename(op, renamed);
    }
}

fn rename(op: &mut IrOperation, operation_id: String) {
    op.operation_id_camel_case = to_camel_case(&operation_id);
    op.operation_id_snake_case = to_snake_case(&operation_id);
    op.operation_id_lower_case = operation_id.to_lowercase();
    op.nickname = op.operation_id_camel_case.clone();
    op.operation_id = operation_id;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::ir::{HttpMethod, IrProperty, PropertyKind, IrValidation};

    fn property(name: &str) -> IrProperty {
        IrProperty {
            base_name: name.into(),
            name: name.into(),
            name_in_camel_case: name.into(),
            name_in_pascal_case: name.into(),
            name_in_snake_case: name.into(),
            name_in_lower_case: name.into(),
            data_type: "string".into(),
            base_type: "string".into(),
            open_api_type: Some("string".into()),
            data_format: None,
            kind: PropertyKind::String,
            format: None,
            is_primitive_type: true,
            required: false,
            nullable: false,
            deprecated: false,
            read_only: false,
            write_only: false,
            title: None,
            description: None,
            example: None,
            default_value: None,
            validation: IrValidation::default(),
            has_validation: false,
            vendor_extensions: Default::default(),
        }
    }

    fn param(name: &str, location: ParamLocation, required: bool) -> IrParameter {
        IrParameter {
            base_name: name.into(),
            param_name: name.into(),
            name_in_camel_case: name.into(),
            name_in_pascal_case: name.into(),
            name_in_snake_case: name.into(),
            name_in_lower_case: name.into(),
            location,
            required,
            deprecated: false,
            description: None,
            style: None,
            explode: false,
            example: None,
            content_type: None,
            schema: property(name),
            vendor_extensions: Default::default(),
        }
    }

    fn operation(id: &str, params: Vec<IrParameter>) -> IrOperation {
        IrOperation {
            operation_id: id.into(),
            operation_id_original: Some(id.into()),
            operation_id_camel_case: to_camel_case(id),
            operation_id_snake_case: to_snake_case(id),
            operation_id_lower_case: id.to_lowercase(),
            nickname: to_camel_case(id),
            path: "/pets".into(),
            http_method: HttpMethod::Get,
            tag: "pets".into(),
            tags: vec!["pets".into()],
            summary: None,
            notes: None,
            deprecated: false,
            all_params: params,
            path_params: Vec::new(),
            query_params: Vec::new(),
            header_params: Vec::new(),
            cookie_params: Vec::new(),
            body_param: None,
            required_params: Vec::new(),
            optional_params: Vec::new(),
            responses: Vec::new(),
            return_property: None,
            auth_methods: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            is_multipart: false,
            imports: BTreeSet::new(),
            vendor_extensions: Default::default(),
        }
    }

    #[test]
    fn later_parameter_wins_regardless_of_location() {
        let mut op = operation(
            "getThing",
            vec![
                param("id", ParamLocation::Path, true),
                param("limit", ParamLocation::Query, false),
                param("id", ParamLocation::Query, false),
            ],
        );
        dedup_params(&mut op);

        assert_eq!(op.all_params.len(), 2);
        assert_eq!(op.all_params[0].param_name, "id");
        assert_eq!(op.all_params[0].location, ParamLocation::Query);
        assert!(op.path_params.is_empty());
        assert_eq!(op.query_params.len(), 2);
        assert!(op.required_params.is_empty());
        assert_eq!(op.optional_params.len(), 2);
    }

    #[test]
    fn body_param_is_rebuilt() {
        let mut op = operation("create", vec![param("body", ParamLocation::Body, true)]);
        dedup_params(&mut op);
        assert!(op.body_param.is_some());
        assert_eq!(op.required_params.len(), 1);
    }

    #[test]
    fn duplicate_ids_get_numeric_suffixes() {
        let mut ops = vec![
            operation("listPets", Vec::new()),
            operation("listPets", Vec::new()),
            operation("listPets", Vec::new()),
            operation("getPet", Vec::new()),
        ];
        resolve_operation_id_collisions(&mut ops);
        let ids: Vec<_> = ops.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, ["listPets", "listPets1", "listPets2", "getPet"]);
        assert_eq!(ops[1].nickname, "listPets1");
        assert_eq!(ops[2].operation_id_snake_case, "list_pets2");
    }

    #[test]
    fn suffix_skips_ids_already_in_use() {
        let mut ops = vec![
            operation("find", Vec::new()),
            operation("find1", Vec::new()),
            operation("find", Vec::new()),
        ];
        resolve_operation_id_collisions(&mut ops);
        let ids: Vec<_> = ops.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, ["find", "find1", "find2"]);
    }
}
