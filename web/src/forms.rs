// Required-field validation for forms.
use std::sync::Arc;

use crate::dom::{elements_by_tag, Document};
use crate::error::UiError;

const CONTROL_TAGS: [&str; 3] = ["input", "select", "textarea"];
pub const ERROR_CLASS: &str = "error";

pub struct FormValidator {
    document: Arc<dyn Document>,
}

impl FormValidator {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Marks every empty required control of `form_id` with the `error` class and clears
    /// it from the filled ones. Returns true when no required control is empty.
    pub fn validate(&self, form_id: &str) -> Result<bool, UiError> {
        let document = self.document.as_ref();
        let form = document
            .get_element_by_id(form_id)
            .ok_or_else(|| UiError::ElementNotFound(form_id.to_string()))?;

        let mut valid = true;
        let mut missing = 0usize;
        for control in elements_by_tag(document, form, &CONTROL_TAGS) {
            if document.attribute(control, "required").is_none() {
                continue;
            }
            let filled = document
                .value(control)
                .is_some_and(|value| !value.trim().is_empty());
            if filled {
                document.remove_class(control, ERROR_CLASS)?;
            } else {
                document.add_class(control, ERROR_CLASS)?;
                missing += 1;
                valid = false;
            }
        }

        if !valid {
            tracing::debug!(form_id, missing, "Form has empty required fields");
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeId};

    fn required(doc: &MemoryDocument, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.append_element(parent, tag, None).unwrap();
        doc.set_attribute(node, "required", "").unwrap();
        node
    }

    #[test]
    fn test_empty_required_fields_are_flagged() {
        let doc = Arc::new(MemoryDocument::new());
        let form = doc.append_element(doc.body(), "form", Some("horas")).unwrap();
        let nombre = required(&doc, form, "input");
        let area = required(&doc, form, "select");
        let notas = required(&doc, form, "textarea");
        let opcional = doc.append_element(form, "input", None).unwrap();
        doc.set_value(nombre, "Ana").unwrap();
        doc.set_value(area, "   ").unwrap();

        let validator = FormValidator::new(doc.clone());
        assert!(!validator.validate("horas").unwrap());
        assert!(!doc.has_class(nombre, ERROR_CLASS));
        assert!(doc.has_class(area, ERROR_CLASS));
        assert!(doc.has_class(notas, ERROR_CLASS));
        assert!(!doc.has_class(opcional, ERROR_CLASS));
    }

    #[test]
    fn test_filling_fields_clears_errors() {
        let doc = Arc::new(MemoryDocument::new());
        let form = doc.append_element(doc.body(), "form", Some("cliente")).unwrap();
        let wrapper = doc.append_element(form, "div", None).unwrap();
        let nombre = required(&doc, wrapper, "input");

        let validator = FormValidator::new(doc.clone());
        assert!(!validator.validate("cliente").unwrap());
        doc.set_value(nombre, "ACME").unwrap();
        assert!(validator.validate("cliente").unwrap());
        assert!(!doc.has_class(nombre, ERROR_CLASS));
    }

    #[test]
    fn test_form_without_required_fields_is_valid() {
        let doc = Arc::new(MemoryDocument::new());
        let form = doc.append_element(doc.body(), "form", Some("buscar")).unwrap();
        doc.append_element(form, "input", None).unwrap();
        assert!(FormValidator::new(doc).validate("buscar").unwrap());
    }

    #[test]
    fn test_missing_form_is_an_error() {
        let doc = Arc::new(MemoryDocument::new());
        let err = FormValidator::new(doc).validate("nope").unwrap_err();
        assert!(matches!(err, UiError::ElementNotFound(id) if id == "nope"));
    }
}
