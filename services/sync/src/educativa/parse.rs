//! Block-oriented extraction for Educativa SOAP responses.
//!
//! The platform guarantees no schema or DTD for these payloads, so
//! parsing is structural: split on the repeating container tag, then
//! first-match scalar lookup inside each block. A stricter parser can
//! replace this module without touching any caller.

/// Profile marker for student rows; staff and admin rows in the same
/// payload carry other values and are discarded.
pub const STUDENT_PROFILE: &str = "alumno";

#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGroupUnit {
    pub id: i64,
    pub name: String,
    pub mandatory: bool,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawUserProgress {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub completed_units: i64,
    pub last_access: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawUsageTime {
    pub student_id: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawUnitProgress {
    pub unit_id: i64,
    pub status: String,
    pub score: f64,
}

/// Slice out every `<container>…</container>` block, in order.
fn blocks<'a>(xml: &'a str, container: &str) -> Vec<&'a str> {
    let open = format!("<{container}>");
    let close = format!("</{container}>");
    let mut found = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        match after.find(&close) {
            Some(end) => {
                found.push(&after[..end]);
                rest = &after[end + close.len()..];
            }
            None => break,
        }
    }

    found
}

/// First-match scalar lookup inside a block.
pub fn tag_text<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(block[start..end].trim())
}

/// Numeric fields default to 0 when absent or malformed; downstream
/// aggregates depend on that exact fallback.
fn tag_i64(block: &str, tag: &str) -> i64 {
    tag_text(block, tag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn tag_f64(block: &str, tag: &str) -> f64 {
    tag_text(block, tag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

/// Booleans compare against the literal `"true"`; anything else,
/// including absence, is false.
fn tag_bool(block: &str, tag: &str) -> bool {
    tag_text(block, tag).map(|v| v == "true").unwrap_or(false)
}

fn tag_string(block: &str, tag: &str) -> String {
    tag_text(block, tag).unwrap_or("").to_string()
}

/// `consultar_grupos` response.
pub fn parse_groups(xml: &str) -> Vec<RawGroup> {
    blocks(xml, "grupos")
        .into_iter()
        .map(|block| RawGroup {
            id: tag_i64(block, "id_grupo"),
            name: tag_string(block, "nombre"),
        })
        .collect()
}

/// `obtener_unidades_grupo` response.
pub fn parse_units(xml: &str) -> Vec<RawGroupUnit> {
    blocks(xml, "unidades")
        .into_iter()
        .map(|block| RawGroupUnit {
            id: tag_i64(block, "id_unidad"),
            name: tag_string(block, "nombre"),
            mandatory: tag_bool(block, "obligatoria"),
            order: tag_i64(block, "orden"),
        })
        .collect()
}

/// `consultar_usuarios_con_avances` response. Group-scoped values live
/// in a nested `<grupos>` block inside each user block; that block is
/// isolated first and scanned with the same scalar lookup. Only
/// student rows survive.
pub fn parse_user_progress(xml: &str) -> Vec<RawUserProgress> {
    blocks(xml, "usuarios")
        .into_iter()
        .filter(|block| {
            tag_text(block, "perfil")
                .map(|p| p.eq_ignore_ascii_case(STUDENT_PROFILE))
                .unwrap_or(false)
        })
        .map(|block| {
            let group_block = blocks(block, "grupos").into_iter().next().unwrap_or("");
            RawUserProgress {
                student_id: tag_i64(block, "id_usuario"),
                name: tag_string(block, "nombre"),
                email: tag_string(block, "email"),
                completed_units: tag_i64(group_block, "unidades_completadas"),
                last_access: tag_text(group_block, "ultimo_acceso").map(str::to_string),
            }
        })
        .collect()
}

/// `consultar_tiempo_estimado_uso_aula` response.
pub fn parse_usage_times(xml: &str) -> Vec<RawUsageTime> {
    blocks(xml, "usuarios")
        .into_iter()
        .map(|block| RawUsageTime {
            student_id: tag_i64(block, "id_usuario"),
            minutes: tag_i64(block, "tiempo_total"),
        })
        .collect()
}

/// `obtener_avance_usuario_unidad` response.
pub fn parse_unit_progress(xml: &str) -> Vec<RawUnitProgress> {
    blocks(xml, "unidades")
        .into_iter()
        .map(|block| RawUnitProgress {
            unit_id: tag_i64(block, "id_unidad"),
            status: tag_string(block, "estado"),
            score: tag_f64(block, "nota"),
        })
        .collect()
}
