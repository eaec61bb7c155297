//! The compiled, read-only schema.
//!
//! A [`RuleIndex`] is built once from the three schema sources and then only
//! read. It owns every definition and precomputes the sets the validator walks
//! for every record: mandatory fields, non-repeatable fields and enforced
//! mandatory subfields, each in declaration order.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::definitions::{
    AuthorizedValueCategory, ControlledValueRule, FieldDefinition, SubfieldDefinition,
};
use crate::schema::framework::Framework;

/// Queryable schema shared by all record validations.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    fields: IndexMap<String, FieldDefinition>,
    mandatory_fields: Vec<String>,
    non_repeatable_fields: Vec<String>,
    mandatory_subfields: Vec<(String, char)>,
    categories: HashMap<String, AuthorizedValueCategory>,
    controlled: Vec<ControlledValueRule>,
}

impl RuleIndex {
    /// Compile parsed sources into an index.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownAuthorizedCategory`] if a subfield
    /// definition refers to a category absent from `categories`.
    pub fn build(
        framework: Framework,
        categories: HashMap<String, AuthorizedValueCategory>,
        controlled: Vec<ControlledValueRule>,
    ) -> SchemaResult<Self> {
        let Framework {
            fields,
            subfield_order,
        } = framework;

        for subfield in fields.values().flat_map(|f| f.subfields.values()) {
            if let Some(category) = &subfield.authorized_value {
                if !categories.contains_key(category) {
                    return Err(SchemaError::UnknownAuthorizedCategory {
                        tag: subfield.tag.clone(),
                        code: subfield.code,
                        category: category.clone(),
                    });
                }
            }
        }

        let mandatory_fields = fields
            .values()
            .filter(|f| f.mandatory)
            .map(|f| f.tag.clone())
            .collect();
        let non_repeatable_fields = fields
            .values()
            .filter(|f| !f.repeatable)
            .map(|f| f.tag.clone())
            .collect();
        let mandatory_subfields = subfield_order
            .into_iter()
            .filter(|(tag, code)| {
                fields
                    .get(tag)
                    .and_then(|f| f.subfield(*code))
                    .is_some_and(SubfieldDefinition::is_enforced_mandatory)
            })
            .collect();

        Ok(RuleIndex {
            fields,
            mandatory_fields,
            non_repeatable_fields,
            mandatory_subfields,
            categories,
            controlled,
        })
    }

    /// Field definition for a tag.
    #[must_use]
    pub fn field_by_tag(&self, tag: &str) -> Option<&FieldDefinition> {
        self.fields.get(tag)
    }

    /// Whether the framework defines this tag.
    #[must_use]
    pub fn is_mapped(&self, tag: &str) -> bool {
        self.fields.contains_key(tag)
    }

    /// Subfield definition for a tag and code; `None` if either is unknown.
    #[must_use]
    pub fn subfield_by_tag_code(&self, tag: &str, code: char) -> Option<&SubfieldDefinition> {
        self.field_by_tag(tag).and_then(|f| f.subfield(code))
    }

    /// Authorized-value category by id.
    #[must_use]
    pub fn authorized_category(&self, id: &str) -> Option<&AuthorizedValueCategory> {
        self.categories.get(id)
    }

    /// Controlled-value rules for a tag and code, in declaration order.
    pub fn controlled_rules_for<'a>(
        &'a self,
        tag: &'a str,
        code: char,
    ) -> impl Iterator<Item = &'a ControlledValueRule> + 'a {
        self.controlled
            .iter()
            .filter(move |rule| rule.applies_to(tag, code))
    }

    /// Fields that must occur in every record.
    pub fn mandatory_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.mandatory_fields
            .iter()
            .filter_map(|tag| self.fields.get(tag))
    }

    /// Fields that may occur at most once per record.
    pub fn non_repeatable_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.non_repeatable_fields
            .iter()
            .filter_map(|tag| self.fields.get(tag))
    }

    /// Mandatory subfields that are not flagged as ignored.
    pub fn mandatory_subfields(&self) -> impl Iterator<Item = &SubfieldDefinition> {
        self.mandatory_subfields
            .iter()
            .filter_map(|(tag, code)| self.subfield_by_tag_code(tag, *code))
    }

    /// All controlled-value rules.
    #[must_use]
    pub fn controlled_rules(&self) -> &[ControlledValueRule] {
        &self.controlled
    }

    /// Number of field definitions.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of authorized-value categories.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definitions::AuthorizedValue;

    fn subfield(tag: &str, code: char, mandatory: bool, ignored: bool) -> SubfieldDefinition {
        let mut sf = SubfieldDefinition::new(tag, code);
        sf.mandatory = mandatory;
        sf.ignored = ignored;
        sf
    }

    fn framework() -> Framework {
        let mut framework = Framework::default();

        let mut leader = FieldDefinition::new("000", "Leader");
        leader.mandatory = true;
        leader.repeatable = false;
        leader.add_subfield(subfield("000", '@', true, false));
        framework.add_field(leader);

        let mut author = FieldDefinition::new("100", "Author");
        author.mandatory = true;
        author.repeatable = false;
        author.add_subfield(subfield("100", 'a', true, false));
        author.add_subfield(subfield("100", 'd', true, true));
        framework.add_field(author);

        let mut holdings = FieldDefinition::new("995", "Items");
        let mut location = subfield("995", 'b', false, false);
        location.authorized_value = Some("LOC".to_string());
        holdings.add_subfield(location);
        framework.add_field(holdings);

        framework
    }

    fn categories() -> HashMap<String, AuthorizedValueCategory> {
        let mut loc = AuthorizedValueCategory::new("LOC");
        loc.add_value(AuthorizedValue {
            category: "LOC".to_string(),
            value: "MAIN".to_string(),
            label: "Main".to_string(),
            opac_label: "Main".to_string(),
        });
        HashMap::from([("LOC".to_string(), loc)])
    }

    #[test]
    fn test_queries() {
        let rules = vec![
            ControlledValueRule::new("000", '@', Some(6), None).with_value("a", "Text"),
            ControlledValueRule::new("100", 'a', None, None),
            ControlledValueRule::new("000", '@', Some(7), None).with_value("m", "Monograph"),
        ];
        let index = RuleIndex::build(framework(), categories(), rules).unwrap();

        assert!(index.is_mapped("100"));
        assert!(!index.is_mapped("245"));
        assert!(index.subfield_by_tag_code("100", 'a').is_some());
        assert!(index.subfield_by_tag_code("100", 'z').is_none());
        assert!(index.subfield_by_tag_code("245", 'a').is_none());
        assert!(index.authorized_category("LOC").is_some());
        assert!(index.authorized_category("NOPE").is_none());

        let starts: Vec<Option<usize>> = index
            .controlled_rules_for("000", '@')
            .map(|rule| rule.start)
            .collect();
        assert_eq!(starts, vec![Some(6), Some(7)]);
        assert_eq!(index.controlled_rules_for("100", 'b').count(), 0);
    }

    #[test]
    fn test_derived_sets() {
        let index = RuleIndex::build(framework(), categories(), Vec::new()).unwrap();

        let mandatory: Vec<&str> = index.mandatory_fields().map(|f| f.tag.as_str()).collect();
        assert_eq!(mandatory, vec!["000", "100"]);

        let non_repeatable: Vec<&str> = index
            .non_repeatable_fields()
            .map(|f| f.tag.as_str())
            .collect();
        assert_eq!(non_repeatable, vec!["000", "100"]);

        // 100$d is mandatory but ignored
        let subfields: Vec<(&str, char)> = index
            .mandatory_subfields()
            .map(|sf| (sf.tag.as_str(), sf.code))
            .collect();
        assert_eq!(subfields, vec![("000", '@'), ("100", 'a')]);
    }

    #[test]
    fn test_unknown_category_fails_build() {
        let err = RuleIndex::build(framework(), HashMap::new(), Vec::new()).unwrap_err();
        assert!(
            matches!(err, SchemaError::UnknownAuthorizedCategory { ref category, code: 'b', .. } if category == "LOC"),
            "got: {err:?}"
        );
    }
}
