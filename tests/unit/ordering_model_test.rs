//! Unit tests for the Ordering Model: insertion, removal cascade, group moves,
//! flattening and multi-tab moves.

use tabkeeper::managers::ordering_manager::OrderingModel;
use tabkeeper::types::item::{Destination, Group, GroupColor, Item};
use tabkeeper::types::tab::TabId;

fn t(id: i64) -> TabId {
    TabId(id)
}

fn group(id: &str, tabs: &[i64]) -> Item {
    Item::Group(Group {
        id: id.to_string(),
        name: id.to_uppercase(),
        color: GroupColor::Blue,
        tabs: tabs.iter().map(|i| TabId(*i)).collect(),
        auto_save: false,
        linked_session_id: None,
        collapsed: false,
    })
}

/// root = [T1, T2, G1{T3, T4}]
fn sample() -> OrderingModel {
    OrderingModel::from_items(vec![Item::tab(t(1)), Item::tab(t(2)), group("g1", &[3, 4])])
}

fn ids(v: &[i64]) -> Vec<TabId> {
    v.iter().map(|i| TabId(*i)).collect()
}

#[test]
fn test_flatten_interleaves_root_and_group_tabs() {
    let model = OrderingModel::from_items(vec![
        Item::tab(t(1)),
        group("g1", &[3, 4]),
        Item::tab(t(2)),
    ]);
    assert_eq!(model.flatten(), ids(&[1, 3, 4, 2]));
}

#[test]
fn test_remove_tab_cascades_empty_group() {
    let mut model = sample();

    model.remove_tab(t(3));
    assert_eq!(
        model.items(),
        &[Item::tab(t(1)), Item::tab(t(2)), group("g1", &[4])]
    );

    let removal = model.remove_tab(t(4)).unwrap();
    assert!(removal.group_removed);
    assert_eq!(model.items(), &[Item::tab(t(1)), Item::tab(t(2))]);
    assert!(model.group("g1").is_none());
}

#[test]
fn test_remove_unknown_tab_is_noop() {
    let mut model = sample();
    assert!(model.remove_tab(t(99)).is_none());
    assert_eq!(model, sample());
}

#[test]
fn test_find_group_containing() {
    let model = sample();
    assert_eq!(model.find_group_containing(t(4)).map(|g| g.id.as_str()), Some("g1"));
    assert!(model.find_group_containing(t(1)).is_none());
}

#[test]
fn test_insert_into_missing_group_is_noop() {
    let mut model = sample();
    let dest = Destination::IntoGroup { group_id: "gone".to_string(), index: 0 };
    assert!(!model.insert_tabs(&[t(9)], &dest));
    assert_eq!(model, sample());
}

#[test]
fn test_insert_existing_tab_moves_it() {
    let mut model = sample();
    assert!(model.insert_tabs(&[t(1)], &Destination::Root { index: 3 }));
    assert_eq!(model.flatten(), ids(&[2, 3, 4, 1]));
    assert!(model.is_consistent());
}

#[test]
fn test_insert_into_group_at_index() {
    let mut model = sample();
    let dest = Destination::IntoGroup { group_id: "g1".to_string(), index: 1 };
    assert!(model.insert_tabs(&[t(1)], &dest));
    assert_eq!(model.items(), &[Item::tab(t(2)), group("g1", &[3, 1, 4])]);
}

#[test]
fn test_index_is_clamped() {
    let mut model = sample();
    assert!(model.insert_tabs(&[t(7)], &Destination::Root { index: 100 }));
    assert_eq!(model.flatten().last(), Some(&t(7)));
}

#[test]
fn test_move_group_forward_and_back() {
    let mut model = sample();
    assert!(model.move_group("g1", 0));
    assert_eq!(model.flatten(), ids(&[3, 4, 1, 2]));

    // index counts positions before the move
    assert!(model.move_group("g1", 2));
    assert_eq!(model.flatten(), ids(&[1, 3, 4, 2]));

    assert!(!model.move_group("missing", 0));
}

#[test]
fn test_move_many_preserves_structural_order() {
    // structural order A=1, B=2, C=3; selected in click order C, A, B
    let mut model = OrderingModel::from_items(vec![
        Item::tab(t(1)),
        Item::tab(t(2)),
        Item::tab(t(3)),
        Item::tab(t(4)),
        Item::tab(t(5)),
    ]);
    assert!(model.move_many(&[t(3), t(1), t(2)], &Destination::Root { index: 5 }));
    assert_eq!(model.flatten(), ids(&[4, 5, 1, 2, 3]));
}

#[test]
fn test_move_many_into_group_keeps_order_and_drops_unknown() {
    let mut model = sample();
    let dest = Destination::IntoGroup { group_id: "g1".to_string(), index: 0 };
    assert!(model.move_many(&[t(2), t(99), t(1)], &dest));
    assert_eq!(model.items(), &[group("g1", &[1, 2, 3, 4])]);
}

#[test]
fn test_move_whole_group_into_itself_keeps_group() {
    let mut model = sample();
    let dest = Destination::IntoGroup { group_id: "g1".to_string(), index: 2 };
    assert!(model.move_many(&[t(4), t(3)], &dest));
    assert_eq!(model.group("g1").unwrap().tabs, ids(&[3, 4]));
    assert!(model.is_consistent());
}

#[test]
fn test_move_many_out_of_group_cascades() {
    let mut model = sample();
    assert!(model.move_many(&[t(3), t(4)], &Destination::Root { index: 0 }));
    assert_eq!(model.flatten(), ids(&[3, 4, 1, 2]));
    assert_eq!(model.groups().count(), 0);
}

#[test]
fn test_move_many_accounts_for_vanishing_items_before_destination() {
    let mut model = OrderingModel::from_items(vec![
        Item::tab(t(1)),
        group("g1", &[2]),
        Item::tab(t(3)),
        Item::tab(t(4)),
    ]);
    // drop before T4 (root index 3): T1 and G1 vanish ahead of it
    assert!(model.move_many(&[t(2), t(1)], &Destination::Root { index: 3 }));
    assert_eq!(model.flatten(), ids(&[3, 1, 2, 4]));
}

#[test]
fn test_move_many_with_nothing_known_is_noop() {
    let mut model = sample();
    assert!(!model.move_many(&[t(42)], &Destination::Root { index: 0 }));
    assert_eq!(model, sample());
}

#[test]
fn test_from_items_sanitizes_duplicates_and_empty_groups() {
    let model = OrderingModel::from_items(vec![
        Item::tab(t(1)),
        group("g1", &[1, 2, 2]),
        group("g2", &[]),
        group("g1", &[3]),
        Item::tab(t(3)),
    ]);
    assert!(model.is_consistent());
    assert_eq!(model.flatten(), ids(&[1, 2, 3]));
    assert_eq!(model.groups().count(), 2);
}

#[test]
fn test_retain_live_removes_stale_tabs() {
    let mut model = sample();
    let live = [t(2), t(4)].into_iter().collect();
    let stale = model.retain_live(&live);
    assert_eq!(stale, ids(&[1, 3]));
    assert_eq!(model.items(), &[Item::tab(t(2)), group("g1", &[4])]);
}

#[test]
fn test_items_serialize_as_tagged_entries() {
    let model = sample();
    let json = serde_json::to_value(model.items()).unwrap();
    assert_eq!(json[0], serde_json::json!({"type": "tab", "id": 1}));
    assert_eq!(json[2]["type"], "group");
    assert_eq!(json[2]["tabs"], serde_json::json!([3, 4]));
    assert_eq!(json[2]["autoSave"], false);
}
