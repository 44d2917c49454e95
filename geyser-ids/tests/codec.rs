use geyser_ids::{AccountType, IdError, Parts, SteamId, Universe};

// ── Pack / unpack ─────────────────────────────────────────────────────────────

#[test]
fn unpack_inverts_pack_across_field_widths() {
    let accounts  = [0u32, 1, 22202, u32::MAX];
    let instances = [0u32, 1, 4, 0xf_ffff];
    let types     = [AccountType::INVALID, AccountType::INDIVIDUAL, AccountType::CLAN, AccountType(15)];
    let universes = [Universe::UNSPECIFIED, Universe::PUBLIC, Universe::RC, Universe(255)];

    for &account in &accounts {
        for &instance in &instances {
            for &account_type in &types {
                for &universe in &universes {
                    let id = SteamId::new(account, instance, account_type, universe).unwrap();
                    assert_eq!(id.parts(), Parts { account, instance, account_type, universe });
                }
            }
        }
    }
}

#[test]
fn user_id_decodes_to_individual_public_instance_one() {
    for n in [0u32, 1, 22202, 123_456_789, u32::MAX] {
        let p = SteamId::user(n).parts();
        assert_eq!(p.account, n);
        assert_eq!(p.instance, 1);
        assert_eq!(p.account_type, AccountType::INDIVIDUAL);
        assert_eq!(p.universe, Universe::PUBLIC);
    }
}

#[test]
fn group_id_decodes_to_clan_public_instance_zero() {
    for n in [0u32, 4, 103_582, u32::MAX] {
        let p = SteamId::group(n).parts();
        assert_eq!(p.account, n);
        assert_eq!(p.instance, 0);
        assert_eq!(p.account_type, AccountType::CLAN);
        assert_eq!(p.universe, Universe::PUBLIC);
    }
}

#[test]
fn unknown_type_and_universe_decode_raw() {
    // type 13, universe 9: neither has a label.
    let raw = (9u64 << 56) | (13u64 << 52) | (2u64 << 32) | 77;
    let id  = SteamId::from_u64(raw);
    assert_eq!(id.account_type(), AccountType(13));
    assert_eq!(id.universe(), Universe(9));
    assert_eq!(id.account_type().name(), None);
    assert_eq!(id.universe().name(), None);
    assert_eq!(id.account(), 77);
    assert_eq!(id.instance(), 2);
}

// ── Field width checks ────────────────────────────────────────────────────────

#[test]
fn oversized_instance_is_rejected() {
    let err = SteamId::new(1, 0x10_0000, AccountType::INDIVIDUAL, Universe::PUBLIC).unwrap_err();
    assert_eq!(err, IdError::InstanceOutOfRange(0x10_0000));
}

#[test]
fn oversized_account_type_is_rejected() {
    let err = SteamId::new(1, 1, AccountType(16), Universe::PUBLIC).unwrap_err();
    assert_eq!(err, IdError::AccountTypeOutOfRange(16));
}

// ── Text forms ────────────────────────────────────────────────────────────────

#[test]
fn decimal_text_form() {
    let id: SteamId = "76561197960287930".parse().unwrap();
    assert_eq!(id, SteamId::user(22202));
    assert_eq!(id.to_string(), "76561197960287930");
    assert!(matches!("7656x".parse::<SteamId>(), Err(IdError::Parse(_))));
}

#[test]
fn json_uses_decimal_string_and_accepts_numbers() {
    let id = SteamId::user(22202);
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"76561197960287930\"");

    let from_str: SteamId = serde_json::from_str("\"76561197960287930\"").unwrap();
    let from_num: SteamId = serde_json::from_str("76561197960287930").unwrap();
    assert_eq!(from_str, id);
    assert_eq!(from_num, id);
}
