//! Effective typing of a pokemon on the field

use crate::types::{ActivePokemon, SidePokemon, Type};

/// Types a pokemon fights as right now.
///
/// `base` comes from the species data. Terastallization replaces the
/// typing (Stellar has no [`Type`] and keeps it), a `typechange` volatile replaces it, and an
/// added type (Forest's Curse, Trick-or-Treat) is appended.
pub fn current_types(
    pokemon: &SidePokemon,
    active: Option<&ActivePokemon>,
    base: &[Type],
) -> Vec<Type> {
    if let Some(tera) = pokemon.terastallized {
        return vec![tera];
    }

    let mut types = match active.and_then(|a| a.type_override()) {
        Some(changed) => changed.to_vec(),
        None => base.to_vec(),
    };
    if let Some(added) = active.and_then(|a| a.added_type())
        && !types.contains(&added)
    {
        types.push(added);
    }
    types
}

#[cfg(test)]
mod tests {
    use showbot_protocol::{Effect, Player, PokemonDetails};

    use super::*;
    use crate::types::{Volatile, VolatileData};

    #[test]
    fn test_current_types() {
        let mut pokemon = SidePokemon::new(
            0,
            Player::P1,
            "Gengar",
            PokemonDetails::parse("Gengar, M"),
        );
        let base = [Type::Ghost, Type::Poison];
        let mut active = ActivePokemon::new(0, 0, 1);
        assert_eq!(current_types(&pokemon, Some(&active), &base), base.to_vec());

        active.add_volatile(
            Volatile::TypeAdd,
            VolatileData::from_start(&Volatile::TypeAdd, &Effect::parse("typeadd"), &["Grass".to_string()]),
        );
        assert_eq!(
            current_types(&pokemon, Some(&active), &base),
            vec![Type::Ghost, Type::Poison, Type::Grass]
        );

        pokemon.terastallized = Some(Type::Fairy);
        assert_eq!(current_types(&pokemon, Some(&active), &base), vec![Type::Fairy]);
        pokemon.terastallized = None;
        assert_eq!(current_types(&pokemon, None, &base), base.to_vec());
    }
}
