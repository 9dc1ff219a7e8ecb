//! Slug normalization for form field labels.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::FieldMap;

/// Fold a field label into a stable lookup key.
///
/// Accents are stripped (NFKD, combining marks dropped), the text is
/// lowercased, and every run of characters that is not a letter or digit
/// becomes a single `_`. The result never starts or ends with `_`.
///
/// ```
/// use formrelay::fields::slug_key;
///
/// assert_eq!(slug_key("E-mail"), "e_mail");
/// assert_eq!(slug_key("Qual_o_seu_CRM?"), "qual_o_seu_crm");
/// assert_eq!(slug_key("Sem rótulo"), "sem_rotulo");
/// ```
pub fn slug_key(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;

    for c in label
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            // underscores, punctuation and whitespace all collapse here
            pending_separator = true;
        }
    }

    slug
}

/// Re-key a raw payload with [`slug_key`].
///
/// A label made only of punctuation has no slug; it is kept under its
/// original text instead of being merged into an empty key. When two labels
/// share a slug, the later one wins.
pub fn normalize_payload(raw: &FieldMap) -> FieldMap {
    let mut normalized = FieldMap::new();

    for (key, value) in raw {
        let slug = slug_key(key);
        let key = if slug.is_empty() { key.clone() } else { slug };
        normalized.insert(key, value.clone());
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug_key_examples() {
        assert_eq!(slug_key("E-mail"), "e_mail");
        assert_eq!(slug_key("Qual_o_seu_CRM?"), "qual_o_seu_crm");
        assert_eq!(slug_key("Sem rótulo"), "sem_rotulo");
        assert_eq!(slug_key("Nome Completo"), "nome_completo");
        assert_eq!(slug_key("form_fields[email]"), "form_fields_email");
    }

    #[test]
    fn test_slug_key_empty() {
        assert_eq!(slug_key(""), "");
        assert_eq!(slug_key("   "), "");
        assert_eq!(slug_key("?!--__"), "");
    }

    #[test]
    fn test_slug_key_variants_are_equal() {
        let variants = ["E-mail", "e-mail", "E_MAIL", "É-mail", "e mail", "  e--mail  ", "e‑mail"];
        for variant in variants {
            assert_eq!(slug_key(variant), "e_mail", "variant {variant:?}");
        }

        assert_eq!(slug_key("Observações"), slug_key("observacoes"));
        assert_eq!(slug_key("Comentários:"), "comentarios");
    }

    #[test]
    fn test_slug_key_collapses_whitespace_and_underscores() {
        assert_eq!(slug_key("full \t\n name"), "full_name");
        assert_eq!(slug_key("__mtq__zoom___nome__"), "mtq_zoom_nome");
    }

    #[test]
    fn test_slug_key_keeps_digits() {
        assert_eq!(slug_key("Campo 2"), "campo_2");
        assert_eq!(slug_key("UF (2 letras)"), "uf_2_letras");
    }

    #[test]
    fn test_slug_key_is_idempotent() {
        let samples = [
            "E-mail",
            "Qual_o_seu_CRM?",
            "Sem rótulo",
            "ÇÃO ñ ü ß",
            "ﬁeld ①",
            "İstanbul",
            "mensagem",
            "",
            "--",
            "WhatsApp / Celular",
        ];
        for sample in samples {
            let once = slug_key(sample);
            assert_eq!(slug_key(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn test_normalize_payload() {
        let raw = json!({
            "E-mail": "a@b.com",
            "Qual_o_seu_CRM?": "12345",
            "Nome": "Ana",
        });
        let normalized = normalize_payload(raw.as_object().unwrap());

        assert_eq!(normalized.get("e_mail"), Some(&json!("a@b.com")));
        assert_eq!(normalized.get("qual_o_seu_crm"), Some(&json!("12345")));
        assert_eq!(normalized.get("nome"), Some(&json!("Ana")));
        assert_eq!(normalized.len(), 3);
    }

    #[test]
    fn test_normalize_payload_keeps_unsluggable_key() {
        let raw = json!({ "?": "value" });
        let normalized = normalize_payload(raw.as_object().unwrap());

        assert_eq!(normalized.get("?"), Some(&json!("value")));
        assert!(normalized.get("").is_none());
    }

    #[test]
    fn test_normalize_payload_later_submission_wins() {
        // Submitted order is the reverse of sorted order.
        let mut raw = FieldMap::new();
        raw.insert("e_mail".to_string(), json!("first"));
        raw.insert("E-mail".to_string(), json!("second"));

        let normalized = normalize_payload(&raw);

        assert_eq!(normalized.get("e_mail"), Some(&json!("second")));
        assert_eq!(normalized.len(), 1);

        let mut raw = FieldMap::new();
        raw.insert("E-mail".to_string(), json!("first"));
        raw.insert("e_mail".to_string(), json!("second"));

        assert_eq!(normalize_payload(&raw).get("e_mail"), Some(&json!("second")));
    }
}
