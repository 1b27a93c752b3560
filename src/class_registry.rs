use crate::{error::PatternError, gstack_ty::GraphemeStack, pattern::CompiledPattern};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// A named boolean test over one grapheme stack.
pub type Predicate = Arc<dyn Fn(&GraphemeStack) -> bool + Send + Sync>;

/// The namespace of classes and identities patterns are compiled against.
///
/// A class is an arbitrary predicate; an identity is a class that accepts
/// exactly the stacks shaped like a fixed exemplar. Both share one namespace,
/// and a name may be defined only once.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, Predicate>,
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ClassRegistry::default()
    }

    /// Registers `predicate` under `name`.
    pub fn define_class<F>(&mut self, name: &str, predicate: F) -> Result<(), PatternError>
    where
        F: Fn(&GraphemeStack) -> bool + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(predicate))
    }

    /// Registers a class accepting the stacks with the same slots as `exemplar`.
    pub fn define_identity(
        &mut self,
        name: &str,
        exemplar: GraphemeStack,
    ) -> Result<(), PatternError> {
        self.insert(
            name,
            Arc::new(move |stack: &GraphemeStack| stack.same_shape(&exemplar)),
        )
    }

    fn insert(&mut self, name: &str, predicate: Predicate) -> Result<(), PatternError> {
        if !is_valid_name(name) {
            return Err(PatternError::Syntax {
                token: name.to_owned(),
                reason: "names consist of ASCII letters, digits, `_` and `-`",
            });
        }
        if self.classes.contains_key(name) {
            return Err(PatternError::DuplicateClass(name.to_owned()));
        }
        self.classes.insert(name.to_owned(), predicate);
        Ok(())
    }

    /// Looks up a class or identity.
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.classes.get(name)
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of defined classes and identities.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether nothing has been defined yet.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Compiles `pattern` against the classes defined so far.
    ///
    /// Classes defined after compilation are not visible to the result.
    pub fn compile(&self, pattern: &str) -> Result<CompiledPattern, PatternError> {
        CompiledPattern::compile(self, pattern)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.classes.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ClassRegistry;
    use crate::codepoints::*;
    use crate::error::PatternError;
    use crate::gstack_ty::GraphemeStack;

    #[test]
    fn test_define_and_lookup() {
        let mut registry = ClassRegistry::new();
        registry
            .define_class("consonant", GraphemeStack::is_consonant)
            .unwrap();
        registry
            .define_identity("KO_KAI", GraphemeStack::from_char(KO_KAI))
            .unwrap();
        assert_eq!(2, registry.len());

        let ko_kai = registry.get("KO_KAI").unwrap();
        assert!(ko_kai(&GraphemeStack::from_char(KO_KAI)));
        // An identity compares slots, so a toned KO_KAI is a different stack.
        assert!(!ko_kai(&GraphemeStack::parse_single("ก่").unwrap()));
        assert!(registry.get("consonant").unwrap()(
            &GraphemeStack::parse_single("ก่").unwrap()
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_names() {
        let mut registry = ClassRegistry::new();
        registry.define_class("digit", |_| true).unwrap();
        assert_eq!(
            Err(PatternError::DuplicateClass("digit".to_owned())),
            registry.define_identity("digit", GraphemeStack::from_char(DIGIT_ONE))
        );
        assert!(matches!(
            registry.define_class("a b", |_| true),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            registry.define_class("", |_| true),
            Err(PatternError::Syntax { .. })
        ));
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = ClassRegistry::new();
        registry.define_class("b", |_| true).unwrap();
        registry.define_class("a", |_| false).unwrap();
        assert_eq!(r#"{"a", "b"}"#, format!("{:?}", registry));
    }
}
