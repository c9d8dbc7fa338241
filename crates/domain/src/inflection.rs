//! String helpers for display names and relation-name guessing.

/// Turns a symbolic key such as `EditProduct` into `Edit product`.
///
/// Keys written entirely in capitals (`SUPER_ADMIN`) are lowered first so
/// they do not explode into one word per letter.
#[must_use]
pub fn friendly_key_name(key: &str) -> String {
    let all_caps = key
        .chars()
        .filter(char::is_ascii_alphabetic)
        .all(|character| character.is_ascii_uppercase());
    let source = if all_caps {
        key.to_lowercase()
    } else {
        key.to_owned()
    };

    let words = snake_case(source.as_str()).replace('_', " ");
    upper_first(words.trim())
}

/// Converts `EditProduct` or `editProduct` into `edit_product`.
#[must_use]
pub fn snake_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;

    for character in value.chars() {
        if character.is_uppercase()
            && previous.is_some_and(|prior| prior != '_' && prior != ' ')
        {
            output.push('_');
        }
        output.extend(character.to_lowercase());
        previous = Some(character);
    }

    output
}

/// Converts `merchant_users` into `merchantUsers`.
#[must_use]
pub fn camel_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut first_word = true;

    for word in value
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
    {
        if first_word {
            output.push_str(lower_first(word).as_str());
            first_word = false;
        } else {
            output.push_str(upper_first(word).as_str());
        }
    }

    output
}

/// Pluralizes the trailing English word of an identifier.
#[must_use]
pub fn pluralize(value: &str) -> String {
    if value.is_empty() || value.ends_with('s') {
        return value.to_owned();
    }

    if ["x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| value.ends_with(suffix))
    {
        return format!("{value}es");
    }

    let mut characters = value.chars().rev();
    if let (Some('y'), Some(before)) = (characters.next(), characters.next())
        && !"aeiou".contains(before.to_ascii_lowercase())
    {
        return format!("{}ies", &value[..value.len() - 1]);
    }

    format!("{value}s")
}

/// Returns whether the value is safe to embed as a quoted SQL identifier.
#[must_use]
pub fn is_identifier(value: &str) -> bool {
    let mut characters = value.chars();
    characters
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
}

fn upper_first(value: &str) -> String {
    let mut characters = value.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

fn lower_first(value: &str) -> String {
    let mut characters = value.chars();
    match characters.next() {
        Some(first) => first.to_lowercase().chain(characters).collect(),
        None => String::new(),
    }
}
