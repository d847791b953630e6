use board_battle::{
    can_attack, resolve, should_update_defeat, tally, Board, Chip, ChipKind, Coord, Encounter,
    Side, Verdict,
};
use proptest::prelude::*;

fn kind() -> impl Strategy<Value = ChipKind> {
    prop::sample::select(ChipKind::ALL.to_vec())
}

fn ranked() -> impl Strategy<Value = ChipKind> {
    prop::sample::select(ChipKind::RANKED.to_vec())
}

fn at(row: usize, col: usize) -> Coord {
    Coord::new(row, col).unwrap()
}

proptest! {
    #[test]
    fn distinct_ranked_kinds_are_antisymmetric(a in ranked(), b in ranked()) {
        prop_assume!(a != b);
        let forward = can_attack(a, b).unwrap();
        let backward = can_attack(b, a).unwrap();
        prop_assert_ne!(forward, backward);
    }

    #[test]
    fn stronger_rank_wins_except_kyo_over_orichi(a in ranked(), b in ranked()) {
        prop_assume!(a != b);
        let expected = match (a, b) {
            (ChipKind::Kyo, ChipKind::Orichi) => true,
            (ChipKind::Orichi, ChipKind::Kyo) => false,
            _ => a.rank() > b.rank(),
        };
        prop_assert_eq!(can_attack(a, b), Some(expected));
    }

    #[test]
    fn athena_always_fuses(other in kind()) {
        prop_assert_eq!(can_attack(ChipKind::Athena, other), None);
        prop_assert_eq!(can_attack(other, ChipKind::Athena), None);
        prop_assert_eq!(resolve(ChipKind::Athena, other), Encounter::Fusion);
        prop_assert_eq!(resolve(other, ChipKind::Athena), Encounter::Fusion);
    }

    #[test]
    fn markers_never_drop_in_rank(start in prop::option::of(kind()), seq in prop::collection::vec(kind(), 0..20)) {
        let mut marker = start;
        for defeated in seq {
            if should_update_defeat(marker, defeated) {
                if let (Some(old), Some(new)) = (marker.and_then(ChipKind::rank), defeated.rank()) {
                    prop_assert!(new > old);
                }
                prop_assert!(defeated != ChipKind::Athena || marker.is_none());
                marker = Some(defeated);
            }
        }
    }
}

#[test]
fn same_kind_attacker_wins() {
    for kind in ChipKind::RANKED {
        assert_eq!(can_attack(kind, kind), Some(true));
    }
}

#[test]
fn designed_inversion() {
    assert_eq!(can_attack(ChipKind::Kyo, ChipKind::Orichi), Some(true));
    assert_eq!(can_attack(ChipKind::Orichi, ChipKind::Kyo), Some(false));
}

#[test]
fn marker_update_table() {
    assert!(should_update_defeat(None, ChipKind::Kyo));
    assert!(should_update_defeat(None, ChipKind::Athena));
    assert!(!should_update_defeat(Some(ChipKind::Mai), ChipKind::Kyo));
    assert!(should_update_defeat(Some(ChipKind::Kyo), ChipKind::Mai));
    assert!(should_update_defeat(Some(ChipKind::Athena), ChipKind::Kyo));
    assert!(!should_update_defeat(Some(ChipKind::Kyo), ChipKind::Athena));
    assert!(!should_update_defeat(Some(ChipKind::Kula), ChipKind::Kula));
}

#[test]
fn tally_is_decided_by_the_highest_unequal_kind() {
    let mut board = Board::empty();
    // Equal orichi and yagami; A has one more kula; B has many more kyo.
    board.place(at(0, 0), Chip::new(ChipKind::Orichi, Side::A));
    board.place(at(4, 5), Chip::new(ChipKind::Orichi, Side::B));
    board.place(at(0, 1), Chip::new(ChipKind::Yagami, Side::A));
    board.place(at(4, 4), Chip::new(ChipKind::Yagami, Side::B));
    board.place(at(0, 2), Chip::new(ChipKind::Kula, Side::A));
    for col in 0..4 {
        board.place(at(3, col), Chip::new(ChipKind::Kyo, Side::B));
    }
    assert_eq!(tally(&board), Verdict::Winner(Side::A));
}

#[test]
fn tally_ignores_athena_and_can_draw() {
    let mut board = Board::empty();
    board.place(at(0, 0), Chip::new(ChipKind::Mai, Side::A));
    board.place(at(4, 5), Chip::new(ChipKind::Mai, Side::B));
    board.place(at(2, 2), Chip::new(ChipKind::Athena, Side::A));
    assert_eq!(tally(&board), Verdict::Draw);
}
