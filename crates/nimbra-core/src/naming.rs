// ── Interface naming translator ──
//
// Interface tables key rows by a raw id of the form `{node}_{port}`. The
// circuit table and the creation protocol use the "circuit name" instead,
// which swaps the halves and strips the family prefix from the port:
//
//   ETS  nodeA_eth3     -> 3_nodeA
//   ITS  nodeA_x-7      -> 7_nodeA
//   VA   nodeA_av2      -> 2_nodeA
//
// Malformed ids are reported, never guessed.

use crate::error::CoreError;
use crate::model::InterfaceFamily;

/// Translate a raw id using the naming scheme of `family`.
pub fn translate(family: InterfaceFamily, raw_id: &str) -> Result<String, CoreError> {
    match family {
        InterfaceFamily::Ets => translate_ets(raw_id),
        InterfaceFamily::Its => translate_its(raw_id),
        InterfaceFamily::Va => translate_va(raw_id),
    }
}

/// `{node}_eth{n}` -> `{n}_{node}`.
pub fn translate_ets(raw_id: &str) -> Result<String, CoreError> {
    let (node, port) = split_node(raw_id)?;
    join(raw_id, &port.replace("eth", ""), node)
}

/// `{node}_{prefix}-{n}[-...]` -> `{n}_{node}`.
pub fn translate_its(raw_id: &str) -> Result<String, CoreError> {
    let (node, port) = split_node(raw_id)?;
    let token = port.split('-').nth(1).ok_or_else(|| CoreError::InvalidInterfaceId {
        id: raw_id.to_owned(),
        reason: "expected a '-' in the port segment".into(),
    })?;
    join(raw_id, token, node)
}

/// `{node}_av{n}` -> `{n}_{node}`.
pub fn translate_va(raw_id: &str) -> Result<String, CoreError> {
    let (node, port) = split_node(raw_id)?;
    join(raw_id, &port.replace("av", ""), node)
}

fn split_node(raw_id: &str) -> Result<(&str, &str), CoreError> {
    let mut parts = raw_id.split('_');
    let node = parts.next().unwrap_or_default();
    let port = parts.next().ok_or_else(|| CoreError::InvalidInterfaceId {
        id: raw_id.to_owned(),
        reason: "expected '{node}_{port}'".into(),
    })?;
    if node.is_empty() {
        return Err(CoreError::InvalidInterfaceId {
            id: raw_id.to_owned(),
            reason: "empty node name".into(),
        });
    }
    Ok((node, port))
}

fn join(raw_id: &str, port: &str, node: &str) -> Result<String, CoreError> {
    if port.is_empty() {
        return Err(CoreError::InvalidInterfaceId {
            id: raw_id.to_owned(),
            reason: "empty port number".into(),
        });
    }
    Ok(format!("{port}_{node}"))
}
