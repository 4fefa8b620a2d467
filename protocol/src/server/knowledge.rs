//! Trailing knowledge arguments (`[from] item: Leftovers`, `[of] p1a: X`, `[still]`)

use super::battle::{Effect, PokemonIdent};

/// Message types whose payload may legitimately end in bracketed text
const NO_KNOWLEDGE_TYPES: [&str; 5] = ["request", "tier", "rule", "player", "win"];

/// Keyed tags left over after `[from]` and `[of]` are lifted out, in wire order.
/// Flag tags (`[still]`) carry an empty value.
pub type KnowledgeArgs = Vec<(String, String)>;

/// Knowledge attached to an event: the causing effect, the attributed
/// pokemon, and any other tags
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Knowledge {
    pub from_effect: Option<Effect>,
    pub of_pokemon: Option<PokemonIdent>,
    pub tags: KnowledgeArgs,
}

impl Knowledge {
    /// Build from raw tags, lifting `[from]` and `[of]` into typed fields
    pub fn from_tags(tags: KnowledgeArgs) -> Self {
        let mut knowledge = Knowledge::default();
        for (key, value) in tags {
            match key.as_str() {
                "from" if knowledge.from_effect.is_none() => {
                    knowledge.from_effect = Some(Effect::parse(&value));
                }
                "of" if knowledge.of_pokemon.is_none() => match PokemonIdent::parse(&value) {
                    Some(ident) => knowledge.of_pokemon = Some(ident),
                    None => knowledge.tags.push((key, value)),
                },
                _ => knowledge.tags.push((key, value)),
            }
        }
        knowledge
    }

    pub fn is_empty(&self) -> bool {
        self.from_effect.is_none() && self.of_pokemon.is_none() && self.tags.is_empty()
    }

    /// Whether a tag (`[silent]`, `[upkeep]`, `[eat]`...) is present
    pub fn has(&self, key: &str) -> bool {
        self.tags.iter().any(|(k, _)| k == key)
    }

    /// Value of a tag, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render back to trailing wire args
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(effect) = &self.from_effect {
            args.push(format!("[from] {}", effect));
        }
        if let Some(of) = &self.of_pokemon {
            args.push(format!("[of] {}", of));
        }
        for (key, value) in &self.tags {
            if value.is_empty() {
                args.push(format!("[{}]", key));
            } else {
                args.push(format!("[{}] {}", key, value));
            }
        }
        args
    }
}

/// Parse a single `[key] value` argument
fn parse_tag(arg: &str) -> Option<(String, String)> {
    let rest = arg.strip_prefix('[')?;
    let (key, value) = rest.split_once(']')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Split trailing knowledge args off a message's argument list.
///
/// `args` excludes the message type. Tags are peeled from the right until the
/// first argument that is not tag-shaped. Excluded message types keep all
/// their args positional.
pub fn split_knowledge<'a>(msg_type: &str, args: &'a [&'a str]) -> (&'a [&'a str], KnowledgeArgs) {
    if NO_KNOWLEDGE_TYPES.contains(&msg_type) {
        return (args, Vec::new());
    }

    let mut end = args.len();
    let mut tags = Vec::new();
    while end > 0 {
        match parse_tag(args[end - 1]) {
            Some(tag) => {
                tags.push(tag);
                end -= 1;
            }
            None => break,
        }
    }
    tags.reverse();

    (&args[..end], tags)
}
