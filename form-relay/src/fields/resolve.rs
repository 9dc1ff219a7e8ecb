//! Alias-based resolution of the semantic submission fields.

use serde::Serialize;
use serde_json::Value;

use super::FieldMap;

pub const NAME_ALIASES: &[&str] = &[
    "nome",
    "name",
    "full_name",
    "fullname",
    "first_name",
    "nome_completo",
];

/// Consulted only when none of [`NAME_ALIASES`] matched.
pub const NAME_SECONDARY_ALIASES: &[&str] = &["mtq_zoom_nome", "formulario_nome", "mtq_nome"];

pub const PHONE_ALIASES: &[&str] = &["telefone", "phone", "tel", "whatsapp", "celular"];

pub const EMAIL_ALIASES: &[&str] = &["email", "e_mail", "mail", "your_email", "contato_email"];

pub const CRM_ALIASES: &[&str] = &["crm", "qual_o_seu_crm", "registro_crm", "crm_medico"];

pub const STATE_ALIASES: &[&str] = &["estado", "uf", "state"];

pub const MESSAGE_ALIASES: &[&str] = &["mensagem", "message", "observacoes", "comentarios", "notes"];

/// The semantic fields of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Medical registration number (CRM)
    pub crm: Option<String>,
    pub state: Option<String>,
    pub message: Option<String>,
}

impl ResolvedFields {
    /// Resolve every field from a slug-keyed payload.
    pub fn resolve(data: &FieldMap) -> Self {
        Self {
            name: pick(data, NAME_ALIASES).or_else(|| pick(data, NAME_SECONDARY_ALIASES)),
            phone: pick(data, PHONE_ALIASES),
            email: pick(data, EMAIL_ALIASES),
            crm: pick(data, CRM_ALIASES),
            state: pick(data, STATE_ALIASES),
            message: pick(data, MESSAGE_ALIASES),
        }
    }
}

/// Return the first alias, in order, that holds a usable value.
///
/// `null`, `""` and `[]` are skipped. The winning value is stringified and
/// trimmed; a whitespace-only value still wins and comes back as `""`.
pub fn pick(data: &FieldMap, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| data.get(*alias))
        .find(|value| is_present(value))
        .map(|value| value_to_string(value).trim().to_string())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Render a submitted value as text. Strings are taken verbatim.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pick_skips_empty_values() {
        let data = map(json!({ "telefone": "", "phone": "123" }));
        assert_eq!(pick(&data, PHONE_ALIASES), Some("123".to_string()));
    }

    #[test]
    fn test_pick_skips_null_and_empty_list() {
        let data = map(json!({ "estado": null, "uf": [], "state": "SP" }));
        assert_eq!(pick(&data, STATE_ALIASES), Some("SP".to_string()));
    }

    #[test]
    fn test_pick_first_alias_wins() {
        let data = map(json!({ "mail": "second@example.com", "email": "first@example.com" }));
        assert_eq!(pick(&data, EMAIL_ALIASES), Some("first@example.com".to_string()));
    }

    #[test]
    fn test_pick_none_when_absent() {
        let data = map(json!({ "unrelated": "x" }));
        assert_eq!(pick(&data, CRM_ALIASES), None);
    }

    #[test]
    fn test_pick_stringifies_scalars() {
        let data = map(json!({ "crm": 12345, "whatsapp": true }));
        assert_eq!(pick(&data, CRM_ALIASES), Some("12345".to_string()));
        assert_eq!(pick(&data, PHONE_ALIASES), Some("true".to_string()));
    }

    #[test]
    fn test_pick_trims_and_keeps_blank_match() {
        let data = map(json!({ "email": "   ", "mail": "x@y.com" }));
        assert_eq!(pick(&data, EMAIL_ALIASES), Some(String::new()));

        let data = map(json!({ "nome": "  Ana  " }));
        assert_eq!(pick(&data, NAME_ALIASES), Some("Ana".to_string()));
    }

    #[test]
    fn test_resolve_all_fields() {
        let data = map(json!({
            "nome_completo": "Ana Souza",
            "celular": "+55 11 99999-0000",
            "e_mail": "ana@example.com",
            "qual_o_seu_crm": "123456",
            "uf": "SP",
            "observacoes": "Olá",
        }));

        let fields = ResolvedFields::resolve(&data);

        assert_eq!(
            fields,
            ResolvedFields {
                name: Some("Ana Souza".to_string()),
                phone: Some("+55 11 99999-0000".to_string()),
                email: Some("ana@example.com".to_string()),
                crm: Some("123456".to_string()),
                state: Some("SP".to_string()),
                message: Some("Olá".to_string()),
            }
        );
    }

    #[test]
    fn test_resolve_name_secondary_aliases() {
        let data = map(json!({ "mtq_zoom_nome": "Bruno", "name": "" }));
        assert_eq!(ResolvedFields::resolve(&data).name, Some("Bruno".to_string()));

        let data = map(json!({ "mtq_nome": "Carla", "first_name": "Dani" }));
        assert_eq!(ResolvedFields::resolve(&data).name, Some("Dani".to_string()));
    }

    #[test]
    fn test_resolve_empty_payload() {
        assert_eq!(ResolvedFields::resolve(&FieldMap::new()), ResolvedFields::default());
    }
}
