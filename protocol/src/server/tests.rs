#[cfg(test)]
mod tests {
    use crate::server::battle::{EffectKind, GameType, Player, Stat};
    use crate::server::event::{BattleEvent, MajorEvent, MinorAction};
    use crate::server::global::GlobalMessage;
    use crate::server::room::{RoomMessage, RoomType};
    use crate::{
        ParseError, ServerMessage, parse_battle_line, parse_server_frame, parse_server_message,
        render,
    };

    fn parse(line: &str) -> BattleEvent {
        parse_battle_line(line).unwrap().unwrap()
    }

    fn assert_round_trip(line: &str) {
        let event = parse(line);
        let rendered = render(&event);
        let again = parse(&rendered);
        assert_eq!(event, again, "{} rendered as {}", line, rendered);
    }

    #[test]
    fn test_boost_with_knowledge() {
        let line = "|-boost|p1a: Dragonite|spe|2|[from] ability: Speed Boost|[of] p1a: Dragonite";
        let BattleEvent::Minor(event) = parse(line) else {
            panic!("expected minor event");
        };

        match &event.action {
            MinorAction::Boost {
                pokemon,
                stat,
                amount,
            } => {
                assert_eq!(pokemon.name, "Dragonite");
                assert_eq!(*stat, Stat::Spe);
                assert_eq!(*amount, 2);
            }
            other => panic!("unexpected action {:?}", other),
        }

        let from = event.from_effect().unwrap();
        assert_eq!(from.kind, EffectKind::Ability);
        assert_eq!(from.id, "speedboost");

        let of = event.of_pokemon().unwrap();
        assert_eq!(of.player, Player::P1);
        assert_eq!(of.name, "Dragonite");
        assert!(of.is_active());
        assert_eq!(of.slot, Some(0));

        assert_eq!(render(&BattleEvent::Minor(event)), line);
    }

    #[test]
    fn test_round_trip_majors() {
        let lines = [
            "|gametype|doubles",
            "|gen|9",
            "|tier|[Gen 9] OU",
            "|rule|Sleep Clause Mod: Limit one foe put to sleep",
            "|rated",
            "|rated|Tournament battle",
            "|player|p1|Alice|102|1500",
            "|player|p2|Bob",
            "|teamsize|p1|6",
            "|clearpoke",
            "|poke|p1|Pikachu, L50, F|item",
            "|poke|p2|Urshifu-*, M|",
            "|teampreview|4",
            "|teampreview",
            "|start",
            "|turn|12",
            "|upkeep",
            "|inactive|Alice has 120 seconds left.",
            "|inactiveoff|Battle timer is now OFF.",
            "|switch|p1a: Corviknight|Corviknight, F|399/399",
            "|drag|p2a: Dragonite|Dragonite, shiny|100/100 par",
            "|replace|p2a: Zoroark|Zoroark, M|50/100",
            "|detailschange|p1a: Greninja|Greninja-Ash, M|60/100",
            "|swap|p1b: Amoonguss|0",
            "|faint|p2a: Dragonite",
            "|move|p1a: Corviknight|Brave Bird|p2a: Dragonite",
            "|move|p1a: Corviknight|Roost||[still]",
            "|move|p2a: Dragonite|Dragon Dance|p2a: Dragonite|[from] move: Sleep Talk",
            "|cant|p1a: Snorlax|slp",
            "|cant|p1a: Snorlax|move: Taunt|Rest",
            "|callback|decision",
            "|win|Alice",
            "|tie",
        ];
        for line in lines {
            assert_round_trip(line);
        }
    }

    #[test]
    fn test_round_trip_minors() {
        let lines = [
            "|-damage|p1a: Corviknight|250/399",
            "|-damage|p2a: Dragonite|0 fnt",
            "|-damage|p2a: Dragonite|88/100|[from] item: Life Orb",
            "|-heal|p1a: Corviknight|399/399|[from] item: Leftovers",
            "|-sethp|p1a: Pikachu|50/100",
            "|-boost|p1a: Dragonite|atk|1",
            "|-unboost|p2a: Dragonite|atk|1|[from] ability: Intimidate|[of] p1a: Gyarados",
            "|-setboost|p1a: Azumarill|atk|6|[from] move: Belly Drum",
            "|-swapboost|p1a: X|p2a: Y|atk, spa",
            "|-invertboost|p1a: X",
            "|-clearboost|p1a: X",
            "|-clearallboost",
            "|-clearpositiveboost|p2a: Y|p1a: X|move: Spectral Thief",
            "|-clearnegativeboost|p1a: X|[silent]",
            "|-copyboost|p1a: X|p2a: Y",
            "|-crit|p2a: Y",
            "|-supereffective|p2a: Y",
            "|-resisted|p2a: Y",
            "|-immune|p2a: Y|[from] ability: Levitate",
            "|-miss|p1a: X|p2a: Y",
            "|-fail|p1a: X|tox",
            "|-fail|p1a: X",
            "|-block|p2a: Y|move: Protect|Tackle|p1a: X",
            "|-notarget|p1a: X",
            "|-notarget",
            "|-prepare|p1a: X|Solar Beam|p2a: Y",
            "|-mustrecharge|p1a: X",
            "|-hitcount|p2a: Y|3",
            "|-status|p1a: X|brn|[from] item: Flame Orb",
            "|-curestatus|p1a: X|slp|[msg]",
            "|-cureteam|p1a: X|[from] move: Heal Bell",
            "|-item|p2a: Y|Choice Scarf|[from] move: Trick",
            "|-enditem|p1a: X|Sitrus Berry|[eat]",
            "|-ability|p2a: Y|Pressure",
            "|-endability|p1a: X",
            "|-transform|p1a: Ditto|p2a: Garchomp|[from] ability: Imposter",
            "|-formechange|p1a: Aegislash|Aegislash-Blade||[from] ability: Stance Change",
            "|-mega|p1a: Charizard|Charizard|Charizardite X",
            "|-primal|p1a: Kyogre",
            "|-burst|p1a: Necrozma|Necrozma-Ultra|Ultranecrozium Z",
            "|-zpower|p1a: X",
            "|-zbroken|p2a: Y",
            "|-terastallize|p1a: X|Fairy",
            "|-start|p1a: X|typechange|Fire/Flying|[from] ability: Protean",
            "|-start|p1a: X|perish3",
            "|-start|p1a: X|Disable|Tackle",
            "|-end|p1a: X|Substitute",
            "|-singleturn|p1a: X|move: Protect",
            "|-singlemove|p1a: X|Destiny Bond",
            "|-activate|p1a: X|move: Protect",
            "|-activate|p1a: X|item: Leppa Berry|Tackle",
            "|-sidestart|p1: Alice|move: Stealth Rock",
            "|-sideend|p2: Bob|Reflect|[from] move: Brick Break",
            "|-swapsideconditions",
            "|-weather|RainDance|[upkeep]",
            "|-weather|none",
            "|-fieldstart|move: Electric Terrain|[from] ability: Electric Surge|[of] p1a: Pincurchin",
            "|-fieldend|move: Trick Room",
            "|-fieldactivate|move: Perish Song",
            "|-center",
            "|-combine",
            "|-waiting|p1a: X|p1b: Y",
            "|-nothing",
            "|-hint|Some effects can't be copied.",
            "|-message|Alice forfeited.",
        ];
        for line in lines {
            assert_round_trip(line);
        }
    }

    #[test]
    fn test_request_round_trip() {
        let line = r#"|request|{"active":[{"moves":[{"move":"Tackle","id":"tackle","pp":35,"maxpp":35,"target":"normal","disabled":false}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Pikachu","details":"Pikachu, L50","condition":"100/100","active":true,"stats":{"atk":1,"def":2,"spa":3,"spd":4,"spe":5},"moves":["tackle"],"baseAbility":"static","item":"lightball","pokeball":"pokeball"}]},"rqid":2}"#;
        let event = parse(line);
        let request = event.as_request().unwrap();
        assert_eq!(request.rqid, Some(2));
        assert_eq!(request.roster()[0].details.level, 50);
        assert_round_trip(line);
    }

    #[test]
    fn test_null_request_is_tie() {
        let event = parse("|request|null");
        assert_eq!(
            event,
            BattleEvent::Major(MajorEvent::BattleEnded {
                winner: None,
                tie: true
            })
        );
    }

    #[test]
    fn test_tie_and_prematureend_equivalent() {
        assert_eq!(parse("|tie"), parse("|prematureend"));
    }

    #[test]
    fn test_invalid_request_json() {
        let result = parse_battle_line("|request|{not json");
        assert!(matches!(result, Err(ParseError::InvalidRequest(_))));
    }

    #[test]
    fn test_exclusion_set_keeps_brackets() {
        let event = parse("|tier|[Gen 9] Random Battle [Blitz]");
        assert_eq!(
            event,
            BattleEvent::Major(MajorEvent::Tier("[Gen 9] Random Battle [Blitz]".to_string()))
        );

        let event = parse("|win|[bot]");
        assert_eq!(
            event,
            BattleEvent::Major(MajorEvent::BattleEnded {
                winner: Some("[bot]".to_string()),
                tie: false
            })
        );

        let event = parse("|rule|[Custom] Rule");
        assert_eq!(
            event,
            BattleEvent::Major(MajorEvent::Rule("[Custom] Rule".to_string()))
        );
    }

    #[test]
    fn test_permissive_numbers() {
        assert_eq!(parse("|turn|abc"), BattleEvent::Major(MajorEvent::Turn(0)));
        let BattleEvent::Minor(event) = parse("|-boost|p1a: X|atk|lots") else {
            panic!("expected minor event");
        };
        assert!(matches!(event.action, MinorAction::Boost { amount: 0, .. }));
    }

    #[test]
    fn test_unknown_types_yield_none() {
        assert_eq!(parse_battle_line("|someunknown|data").unwrap(), None);
        assert_eq!(parse_battle_line("|-someunknown|p1a: X").unwrap(), None);
        assert_eq!(parse_battle_line("plain text").unwrap(), None);
        assert!("|someunknown".parse::<BattleEvent>().is_err());
    }

    #[test]
    fn test_malformed_lines_error() {
        assert!(matches!(parse_battle_line(""), Err(ParseError::EmptyMessage)));
        assert!(parse_battle_line("|switch|nobody|Pikachu|100/100").is_err());
        assert!(parse_battle_line("|gametype|sideways").is_err());
        assert!(parse_battle_line("|-boost|p1a: X|luck|1").is_err());
    }

    #[test]
    fn test_time_low_notice() {
        let low = MajorEvent::Inactive("Alice has 20 seconds left.".to_string());
        assert_eq!(low.time_low_seconds(), Some(20));
        let low = MajorEvent::Inactive("Time left: 15 sec this turn | 200 sec total".to_string());
        assert_eq!(low.time_low_seconds(), Some(15));
        let plenty = MajorEvent::Inactive("Alice has 120 seconds left.".to_string());
        assert_eq!(plenty.time_low_seconds(), None);
        assert_eq!(MajorEvent::Turn(3).time_low_seconds(), None);
    }

    #[test]
    fn test_inactive_keeps_pipes() {
        let event = parse("|inactive|Time left: 15 sec this turn | 200 sec total");
        assert_eq!(
            event,
            BattleEvent::Major(MajorEvent::Inactive(
                "Time left: 15 sec this turn | 200 sec total".to_string()
            ))
        );
    }

    #[test]
    fn test_gametype() {
        assert_eq!(
            parse("|gametype|freeforall"),
            BattleEvent::Major(MajorEvent::GameType(GameType::FreeForAll))
        );
    }

    #[test]
    fn test_server_frame() {
        let frame = ">battle-gen9ou-1\n|init|battle\n|title|Alice vs. Bob\n\n|turn|1\n";
        let parsed = parse_server_frame(frame);
        assert_eq!(parsed.room_id.as_deref(), Some("battle-gen9ou-1"));
        assert_eq!(parsed.lines.len(), 3);

        let messages: Vec<_> = parsed.messages().collect::<Result<_, _>>().unwrap();
        assert_eq!(messages[0], ServerMessage::Room(RoomMessage::Init(RoomType::Battle)));
        assert_eq!(
            messages[1],
            ServerMessage::Room(RoomMessage::Title("Alice vs. Bob".to_string()))
        );
        assert_eq!(
            messages[2],
            ServerMessage::Battle(BattleEvent::Major(MajorEvent::Turn(1)))
        );
    }

    #[test]
    fn test_frame_without_room() {
        let parsed = parse_server_frame("|updateuser| Alice|1|1");
        assert_eq!(parsed.room_id, None);
        let message = parse_server_message(&parsed.lines[0]).unwrap();
        assert_eq!(
            message,
            ServerMessage::Global(GlobalMessage::UpdateUser {
                username: "Alice".to_string(),
                named: true,
                avatar: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_formats() {
        let line = "|formats|,1|S/V Singles|[Gen 9] Random Battle,f|[Gen 9] OU,e|,1|S/V Doubles|[Gen 9] Doubles OU,e";
        let ServerMessage::Global(GlobalMessage::Formats(sections)) =
            parse_server_message(line).unwrap()
        else {
            panic!("expected formats");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "S/V Singles");
        assert_eq!(sections[0].formats.len(), 2);
        assert!(sections[0].formats[0].random_team);
        assert_eq!(sections[1].formats[0].id(), "gen9doublesou");
        assert_eq!(sections[1].formats[0].game_type(), GameType::Doubles);
    }

    #[test]
    fn test_parse_deinit_and_noinit() {
        assert_eq!(
            parse_server_message("|deinit").unwrap(),
            ServerMessage::Room(RoomMessage::DeInit)
        );
        assert_eq!(
            parse_server_message("|noinit|nonexistent|The room does not exist.").unwrap(),
            ServerMessage::Room(RoomMessage::NoInit {
                reason: "nonexistent".to_string(),
                message: "The room does not exist.".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_raw() {
        assert_eq!(
            parse_server_message("|someunknown|data").unwrap(),
            ServerMessage::Raw("|someunknown|data".to_string())
        );
    }
}
