//! Filter language over indexed inventory items.
//!
//! A query is a whitespace-separated list of terms, AND-ed together. A term is
//! either a bare word (name substring) or `field:value`:
//!
//! ```text
//! is:weapon tier:exotic
//! "ace of spades" character:hunter
//! perk:outlaw power:>=1800
//! ```
//!
//! Unrecognized fields parse to [`Term::Unknown`], which matches everything.

use crate::hash::DefinitionHash;
use crate::inventory::{InventoryIndex, InventoryItem, ItemLocation};
use crate::manifest::{ClassType, ItemType, ManifestResult, ManifestStore, SHADER_SUB_TYPE};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Malformed query term {fragment:?}: {reason}")]
    Malformed {
        fragment: String,
        reason: &'static str,
    },
}

fn malformed(fragment: &str, reason: &'static str) -> QueryError {
    QueryError::Malformed {
        fragment: fragment.to_string(),
        reason,
    }
}

/// Item state selectable with `is:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Equipped,
    Locked,
    Unlocked,
    Instanced,
    Stackable,
    Vault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterFilter {
    Class(ClassType),
    Id(String),
    Vault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparison {
    fn holds(self, left: i32, right: i32) -> bool {
        match self {
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Eq => left == right,
            Self::Ge => left >= right,
            Self::Gt => left > right,
        }
    }
}

/// One compiled query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Lowercased name substring
    Name(String),
    ItemType(ItemType),
    Shader,
    State(ItemState),
    Class(ClassType),
    /// Lowercased tier label
    Tier(String),
    Character(CharacterFilter),
    Power(Comparison, i32),
    Hash(DefinitionHash),
    PerkHash(DefinitionHash),
    /// Perk name plus the hashes it resolved to; empty until resolved
    PerkName {
        name: String,
        hashes: Vec<DefinitionHash>,
    },
    /// `is:` value with no meaning; never matches
    Nothing(String),
    /// Unrecognized field; matches everything
    Unknown { field: String, value: String },
}

impl Term {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            Self::Name(needle) => item.name.to_lowercase().contains(needle.as_str()),
            Self::ItemType(kind) => item.item_type == *kind,
            Self::Shader => item.item_sub_type == SHADER_SUB_TYPE,
            Self::State(state) => match state {
                ItemState::Equipped => item.is_equipped,
                ItemState::Locked => item.is_locked,
                ItemState::Unlocked => !item.is_locked,
                ItemState::Instanced => item.is_instanced(),
                ItemState::Stackable => !item.is_instanced(),
                ItemState::Vault => item.location.is_vault(),
            },
            Self::Class(class) => item.class_restriction == *class,
            Self::Tier(tier) => item
                .tier
                .as_deref()
                .is_some_and(|t| t.to_lowercase() == *tier),
            Self::Character(filter) => match (filter, &item.location) {
                (CharacterFilter::Vault, location) => location.is_vault(),
                (CharacterFilter::Class(wanted), ItemLocation::Character { class, .. }) => {
                    class == wanted
                }
                (CharacterFilter::Id(wanted), ItemLocation::Character { id, .. }) => id == wanted,
                (_, ItemLocation::Vault) => false,
            },
            Self::Power(op, value) => item.power.is_some_and(|p| op.holds(p, *value)),
            Self::Hash(hash) => item.hash == *hash,
            Self::PerkHash(hash) => has_perk(item, std::slice::from_ref(hash)),
            Self::PerkName { hashes, .. } => has_perk(item, hashes),
            Self::Nothing(_) => false,
            Self::Unknown { .. } => true,
        }
    }
}

fn has_perk(item: &InventoryItem, wanted: &[DefinitionHash]) -> bool {
    item.perks
        .as_ref()
        .is_some_and(|perks| perks.iter().any(|p| wanted.contains(p)))
}

/// A compiled query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// An empty query matches every item
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.terms.iter().all(|term| term.matches(item))
    }

    /// Matching items in index order
    pub fn filter<'a>(&self, index: &'a InventoryIndex) -> Vec<&'a InventoryItem> {
        index.all().iter().filter(|item| self.matches(item)).collect()
    }

    /// Whether any term filters on perks (`perk:<hash>` or `perk:<name>`)
    pub fn uses_perks(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t, Term::PerkName { .. } | Term::PerkHash(_)))
    }

    /// Resolve `perk:<name>` terms to hashes through the store's perk search
    pub fn resolve_perks(&mut self, store: &ManifestStore) -> ManifestResult<()> {
        for term in &mut self.terms {
            if let Term::PerkName { name, hashes } = term {
                *hashes = store.search_perks(name)?.into_iter().map(|p| p.hash).collect();
                if hashes.is_empty() {
                    debug!(perk = %name, "Perk name matched no definitions");
                }
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_query(s)
    }
}

/// Compile query text
pub fn parse_query(text: &str) -> Result<Query, QueryError> {
    let terms = tokenize(text)?
        .into_iter()
        .map(|token| compile_term(&token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Query { terms })
}

struct Token {
    raw: String,
    text: String,
    quoted_start: bool,
}

/// Split on whitespace outside double quotes. Quotes are removed from the
/// token text but kept in `raw` for error reporting.
fn tokenize(text: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;
    let mut in_quotes = false;

    for ch in text.chars() {
        if ch.is_whitespace() && !in_quotes {
            tokens.extend(current.take());
            continue;
        }
        let token = current.get_or_insert_with(|| Token {
            raw: String::new(),
            text: String::new(),
            quoted_start: ch == '"',
        });
        token.raw.push(ch);
        if ch == '"' {
            in_quotes = !in_quotes;
        } else {
            token.text.push(ch);
        }
    }

    if in_quotes {
        let fragment = current.map(|t| t.raw).unwrap_or_default();
        return Err(malformed(&fragment, "unterminated quote"));
    }
    tokens.extend(current);
    Ok(tokens)
}

fn compile_term(token: &Token) -> Result<Term, QueryError> {
    let split = if token.quoted_start {
        None
    } else {
        token.text.split_once(':')
    };

    let Some((field, value)) = split else {
        if token.text.trim().is_empty() {
            return Err(malformed(&token.raw, "empty search text"));
        }
        return Ok(Term::Name(token.text.to_lowercase()));
    };

    if field.is_empty() {
        return Err(malformed(&token.raw, "missing field name"));
    }
    if value.is_empty() {
        return Err(malformed(&token.raw, "missing value"));
    }

    let field = field.to_lowercase();
    let lowered = value.to_lowercase();
    let term = match field.as_str() {
        "is" => is_term(&lowered),
        "tier" => Term::Tier(lowered),
        "character" => Term::Character(match lowered.as_str() {
            "vault" => CharacterFilter::Vault,
            other => match other.parse::<ClassType>() {
                Ok(class) if class != ClassType::Any => CharacterFilter::Class(class),
                _ => CharacterFilter::Id(value.to_string()),
            },
        }),
        "power" => {
            let (op, number) = split_comparison(value);
            let number = number
                .trim()
                .parse::<i32>()
                .map_err(|_| malformed(&token.raw, "power must be a number"))?;
            Term::Power(op, number)
        }
        "hash" => Term::Hash(
            value
                .parse::<DefinitionHash>()
                .map_err(|_| malformed(&token.raw, "hash must be a 32-bit number"))?,
        ),
        "perk" => match value.parse::<DefinitionHash>() {
            Ok(hash) => Term::PerkHash(hash),
            Err(_) => Term::PerkName {
                name: value.to_string(),
                hashes: Vec::new(),
            },
        },
        _ => {
            debug!(field = %field, value, "Ignoring unknown query field");
            Term::Unknown {
                field,
                value: value.to_string(),
            }
        }
    };
    Ok(term)
}

fn is_term(value: &str) -> Term {
    let kind = match value {
        "weapon" => ItemType::Weapon,
        "armor" => ItemType::Armor,
        "ghost" => ItemType::Ghost,
        "emblem" => ItemType::Emblem,
        "ship" => ItemType::Ship,
        "sparrow" | "vehicle" => ItemType::Vehicle,
        "consumable" => ItemType::Consumable,
        "material" => ItemType::ExchangeMaterial,
        "mod" => ItemType::Mod,
        "engram" => ItemType::Engram,
        "emote" => ItemType::Emote,
        "shader" => return Term::Shader,
        "equipped" => return Term::State(ItemState::Equipped),
        "locked" => return Term::State(ItemState::Locked),
        "unlocked" => return Term::State(ItemState::Unlocked),
        "instanced" => return Term::State(ItemState::Instanced),
        "stackable" => return Term::State(ItemState::Stackable),
        "vault" => return Term::State(ItemState::Vault),
        "titan" => return Term::Class(ClassType::Titan),
        "hunter" => return Term::Class(ClassType::Hunter),
        "warlock" => return Term::Class(ClassType::Warlock),
        other => {
            debug!(value = other, "Unknown is: value matches nothing");
            return Term::Nothing(other.to_string());
        }
    };
    Term::ItemType(kind)
}

fn split_comparison(value: &str) -> (Comparison, &str) {
    for (prefix, op) in [
        (">=", Comparison::Ge),
        ("<=", Comparison::Le),
        (">", Comparison::Gt),
        ("<", Comparison::Lt),
        ("=", Comparison::Eq),
    ] {
        if let Some(rest) = value.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (Comparison::Eq, value)
}
