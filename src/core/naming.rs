/// Converts a key or enum token to its canonical snake_case spelling.
///
/// Accepts camelCase, PascalCase, SCREAMING_CASE and kebab-case input, so
/// `monthsToRetirement`, `MonthsToRetirement` and `months-to-retirement` all
/// become `months_to_retirement`. Acronym runs stay together: `HTTPServer`
/// becomes `http_server`, so a camelCase name built from one-letter words
/// (`aAA`) does not split back into them.
pub fn to_snake(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Converts a canonical snake_case name to the public camelCase spelling.
pub fn to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A closed set of discriminator values with a canonical snake_case spelling.
pub trait Variant: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn public_name(self) -> String {
        to_camel(self.as_str())
    }

    /// Matches any casing of a member's name: `fixedLifecycle`,
    /// `FIXED_LIFECYCLE` and `fixed-lifecycle` all name `fixed_lifecycle`.
    fn from_token(token: &str) -> Option<Self> {
        let canonical = to_snake(token);
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.as_str() == canonical)
    }

    fn public_names() -> Vec<String> {
        Self::ALL.iter().map(|variant| variant.public_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    #[test]
    fn to_snake_handles_public_and_internal_spellings() {
        assert_eq!(to_snake("monthsToRetirement"), "months_to_retirement");
        assert_eq!(to_snake("months_to_retirement"), "months_to_retirement");
        assert_eq!(to_snake("fixedLifecycle"), "fixed_lifecycle");
        assert_eq!(to_snake("FIXED_LIFECYCLE"), "fixed_lifecycle");
        assert_eq!(to_snake("cash-flow-strategy"), "cash_flow_strategy");
        assert_eq!(to_snake("USA"), "usa");
        assert_eq!(to_snake("HTTPServer"), "http_server");
        assert_eq!(to_snake("  numSteps "), "num_steps");
    }

    #[test]
    fn to_camel_produces_public_spelling() {
        assert_eq!(to_camel("months_to_retirement"), "monthsToRetirement");
        assert_eq!(to_camel("fixed_lifecycle"), "fixedLifecycle");
        assert_eq!(to_camel("strategy"), "strategy");
        assert_eq!(to_camel("NumSteps"), "numSteps");
    }

    #[test]
    fn to_snake_keeps_word_boundaries() {
        assert_eq!(to_snake("f_i_x_e_d"), "f_i_x_e_d");
        assert_eq!(to_snake("Boot-Strap"), "boot_strap");
        assert_eq!(to_snake("fixedlifecycle"), "fixedlifecycle");
    }

    proptest! {
        #[test]
        fn prop_snake_and_camel_are_inverse_for_canonical_names(
            words in proptest::collection::vec("[a-z]{2,8}", 1..5)
        ) {
            let snake = words.join("_");
            let camel = to_camel(&snake);
            prop_assert_eq!(to_snake(&camel), snake.clone());
            prop_assert_eq!(to_snake(&snake), snake);
        }
    }
}
