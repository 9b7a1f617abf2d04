//! Integration tests for the line-item list: serial numbering across mixed
//! sequences of appends, removals and merges.

use bom_core::export;
use bom_core::{ItemId, ItemList, ValidationError};
use bom_test_utils::{draft, new_item, sample_suggestions};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn serials(list: &ItemList) -> Vec<u32> {
    list.iter().map(|i| i.serial_no).collect()
}

fn components(list: &ItemList) -> Vec<&str> {
    list.iter().map(|i| i.component.as_str()).collect()
}

fn assert_dense(list: &ItemList) {
    let expected: Vec<u32> = (1..=list.len() as u32).collect();
    assert_eq!(serials(list), expected, "serials must be 1..=N in order");
}

/// Small deterministic generator so the sequence test is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn single_append_gets_serial_one() {
    let mut list = ItemList::new();
    let item = list.append(&draft("Resistor", "10k", "2", "1")).unwrap();
    assert_eq!(item.serial_no, 1);
    assert_eq!(item.total_quantity, 2);
    assert_eq!(item.pcb_quantity, 1);
    assert!(!item.selected);
}

#[test]
fn deleting_middle_item_renumbers() {
    let mut list = ItemList::new();
    list.append(&draft("A", "", "1", "1")).unwrap();
    let b = list.append(&draft("B", "", "1", "1")).unwrap().id;
    list.append(&draft("C", "", "1", "1")).unwrap();

    let removed = list.remove(b).unwrap();
    assert_eq!(removed.component, "B");
    assert_eq!(components(&list), vec!["A", "C"]);
    assert_eq!(serials(&list), vec![1, 2]);
}

#[test]
fn empty_component_is_rejected_without_change() {
    let mut list = ItemList::new();
    list.append(&draft("A", "", "1", "1")).unwrap();
    let before = list.clone();

    let err = list.append(&draft("   ", "10k", "2", "1")).unwrap_err();
    assert_eq!(err, ValidationError::ComponentRequired);
    assert_eq!(list, before);
}

#[test]
fn deleting_unknown_id_is_a_no_op() {
    let mut list = ItemList::new();
    list.append(&draft("A", "", "1", "1")).unwrap();
    let before = list.clone();
    assert!(list.remove(ItemId::new()).is_none());
    assert_eq!(list, before);
}

#[test]
fn merge_appends_after_existing_items() {
    let mut list = ItemList::new();
    list.append(&draft("MCU", "STM32", "1", "1")).unwrap();
    list.append(&draft("Crystal", "8MHz", "1", "1")).unwrap();
    let before: Vec<_> = list.iter().cloned().collect();

    let added = list.merge(sample_suggestions());
    assert_eq!(added, 3);
    assert_eq!(list.len(), 5);
    assert_eq!(&list.as_slice()[..2], before.as_slice());
    assert_eq!(serials(&list), vec![1, 2, 3, 4, 5]);
    assert_eq!(&components(&list)[2..], &["Resistor", "Capacitor", "LED"]);
}

#[test]
fn merge_of_nothing_changes_nothing() {
    let mut list = ItemList::new();
    list.append(&draft("A", "", "1", "1")).unwrap();
    let before = list.clone();
    assert_eq!(list.merge(Vec::<bom_core::NewItem>::new()), 0);
    assert_eq!(list, before);
}

#[test]
fn mixed_sequence_keeps_serials_dense() {
    let mut list = ItemList::new();
    let mut rng = Lcg(42);

    for step in 0..300 {
        match rng.next() % 4 {
            0 | 1 => {
                let component = format!("Part {step}");
                list.append(&draft(&component, "", "1", "1")).unwrap();
            }
            2 if !list.is_empty() => {
                let idx = (rng.next() as usize) % list.len();
                let id = list.as_slice()[idx].id;
                assert!(list.remove(id).is_some());
            }
            _ => {
                let batch = (0..rng.next() % 3)
                    .map(|n| new_item(&format!("Suggested {step}.{n}"), "", 1, 1))
                    .collect::<Vec<_>>();
                list.merge(batch);
            }
        }
        assert_dense(&list);
    }

    let mut ids: Vec<ItemId> = list.iter().map(|i| i.id).collect();
    let total = ids.len();
    ids.sort_by_key(|id| id.as_uuid());
    ids.dedup();
    assert_eq!(ids.len(), total, "item ids must be unique");
}

#[test]
fn export_reflects_list_after_edits() {
    let mut list = ItemList::new();
    list.append(&draft("Resistor", "10k", "2", "1")).unwrap();
    let cap = list.append(&draft("Capacitor", "1uF", "1", "1")).unwrap().id;
    list.append(&draft("Diode", "1N4148", "3", "3")).unwrap();
    list.remove(cap);

    assert_eq!(
        export::to_csv(&list),
        "S.NO,Component,Value,Total Quantity,PCB Quantity\n\
         1,\"Resistor\",\"10k\",2,1\n\
         2,\"Diode\",\"1N4148\",3,3\n"
    );
}

#[test]
fn deserialized_list_is_renumbered() {
    let mut list = ItemList::new();
    list.append(&draft("A", "", "1", "1")).unwrap();
    list.append(&draft("B", "", "1", "1")).unwrap();

    let mut json: serde_json::Value = serde_json::to_value(&list).unwrap();
    json[0]["serial_no"] = serde_json::json!(7);
    json[1]["serial_no"] = serde_json::json!(9);
    let back: ItemList = serde_json::from_value(json).unwrap();
    assert_eq!(serials(&back), vec![1, 2]);
}
