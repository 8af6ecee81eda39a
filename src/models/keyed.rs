use std::borrow::Cow;
use std::collections::HashSet;

/// Top-level list entries identified by a unique key
pub trait Keyed {
    fn key(&self) -> &str;

    /// Form of the key used for uniqueness checks
    fn normalized_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.key())
    }
}

/// First entry whose normalized key was already seen earlier in the list
pub fn find_duplicate_key<T: Keyed>(items: &[T]) -> Option<&T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .find(|item| !seen.insert(item.normalized_key().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Keyed for Named {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn finds_first_repeated_key() {
        let items = [Named("a"), Named("b"), Named("a"), Named("b")];
        assert_eq!(find_duplicate_key(&items).map(Keyed::key), Some("a"));
    }

    #[test]
    fn unique_keys_pass() {
        let items = [Named("a"), Named("A")];
        assert!(find_duplicate_key(&items).is_none());
    }
}
