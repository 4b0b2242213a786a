//! End-to-end decoding of whole page images.


use heapinspect::heap::{DecodeError, DecodedRecord, HeapPage, LpState, Schema, Value};
use heapinspect::inspect::{SlotOutcome, inspect_page};
use heapinspect::storage::PageId;
use proptest::prelude::*;

use page_builder::{PageBuilder, TupleBuilder, demo_data, demo_tuple};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
    log_init::init();
}

fn row(id: i64, name: &str) -> DecodedRecord {
    DecodedRecord {
        id: Some(id),
        name: Some(name.to_string()),
    }
}

fn demo_row(outcome: &SlotOutcome) -> &Result<DecodedRecord, DecodeError> {
    match outcome {
        SlotOutcome::Tuple { row: Some(row), .. } => row,
        other => panic!("expected a decoded tuple, got {other:?}"),
    }
}

#[test]
fn test_single_demo_row() {
    let tuple = demo_tuple(42, "hi");
    assert_eq!(tuple.len(), 35);
    let page = PageBuilder::new()
        .upper(8100)
        .bytes_at(8100, &tuple)
        .line_pointer(8100, 35, 1)
        .build();

    let heap = HeapPage::parse(&page).unwrap();
    assert_eq!(heap.header().lower, 28);
    assert_eq!(heap.header().upper, 8100);
    assert_eq!(heap.header().special, 8192);

    let lp = heap.line_pointer(1).unwrap();
    assert_eq!((lp.offset, lp.length, lp.state), (8100, 35, LpState::Normal));

    let record = heap.decode_record(lp, &Schema::demo()).unwrap().unwrap();
    assert_eq!(record.values, vec![Value::Int64(42), Value::Text("hi".into())]);

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(demo_row(&inspection.slots[0].outcome), &Ok(row(42, "hi")));
}

#[test]
fn test_unused_slot_is_skipped() {
    let page = PageBuilder::new()
        .line_pointer(0, 0, 0)
        .tuple(&demo_tuple(7, "seven"))
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(inspection.slots[0].line_pointer.state, LpState::Unused);
    assert_eq!(inspection.slots[0].outcome, SlotOutcome::Skipped);
    assert_eq!(demo_row(&inspection.slots[1].outcome), &Ok(row(7, "seven")));
    assert_eq!(inspection.failed_slots(), 0);
}

#[test]
fn test_redirect_and_dead_slots_are_skipped() {
    let page = PageBuilder::new()
        .line_pointer(3, 0, 2)
        .line_pointer(8000, 40, 3)
        .tuple(&demo_tuple(3, "c"))
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(inspection.slots[0].line_pointer.state, LpState::Redirect);
    assert_eq!(inspection.slots[1].line_pointer.state, LpState::Dead);
    assert_eq!(inspection.slots[0].outcome, SlotOutcome::Skipped);
    assert_eq!(inspection.slots[1].outcome, SlotOutcome::Skipped);
    assert_eq!(demo_row(&inspection.slots[2].outcome), &Ok(row(3, "c")));
}

#[test]
fn test_out_of_bounds_slot_does_not_stop_others() {
    let page = PageBuilder::new()
        .tuple(&demo_tuple(1, "a"))
        .line_pointer(8180, 40, 1)
        .tuple(&demo_tuple(2, "bb"))
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(inspection.slots.len(), 3);
    assert_eq!(demo_row(&inspection.slots[0].outcome), &Ok(row(1, "a")));
    assert!(matches!(
        inspection.slots[1].outcome,
        SlotOutcome::Failed(DecodeError::SpanOutOfBounds {
            index: 2,
            offset: 8180,
            length: 40,
            ..
        })
    ));
    assert_eq!(demo_row(&inspection.slots[2].outcome), &Ok(row(2, "bb")));
    assert_eq!(inspection.failed_slots(), 1);
}

#[test]
fn test_compressed_varlena_is_unsupported() {
    let mut data = 9i64.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'x', b'y']);
    let page = PageBuilder::new()
        .tuple(&TupleBuilder::new(2).data(&data).build())
        .tuple(&demo_tuple(10, "ok"))
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(
        demo_row(&inspection.slots[0].outcome),
        &Err(DecodeError::UnsupportedEncoding { header: 2 })
    );
    assert_eq!(demo_row(&inspection.slots[1].outcome), &Ok(row(10, "ok")));
}

#[test]
fn test_null_attributes() {
    let null_name = TupleBuilder::new(2)
        .nulls(&[0b10])
        .data(&5i64.to_le_bytes())
        .build();
    let null_id = TupleBuilder::new(2)
        .nulls(&[0b01])
        .data(&[0x09, b'a', b'b', b'c'])
        .build();
    let page = PageBuilder::new().tuple(&null_name).tuple(&null_id).build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(
        demo_row(&inspection.slots[0].outcome),
        &Ok(DecodedRecord {
            id: Some(5),
            name: None
        })
    );
    assert_eq!(
        demo_row(&inspection.slots[1].outcome),
        &Ok(DecodedRecord {
            id: None,
            name: Some("abc".into())
        })
    );
}

#[test]
fn test_long_varlena() {
    let name = "x".repeat(300);
    let mut data = 77i64.to_le_bytes().to_vec();
    data.extend_from_slice(&(((name.len() + 4) as u32) << 2).to_le_bytes());
    data.extend_from_slice(name.as_bytes());
    let page = PageBuilder::new()
        .tuple(&TupleBuilder::new(2).data(&data).build())
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(demo_row(&inspection.slots[0].outcome), &Ok(row(77, &name)));
}

#[test]
fn test_truncated_tuple_is_slot_scoped() {
    let page = PageBuilder::new()
        .tuple(&demo_tuple(1, "a")[..20])
        .tuple(&demo_tuple(2, "b"))
        .build();

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert!(matches!(
        inspection.slots[0].outcome,
        SlotOutcome::Failed(DecodeError::TruncatedInput {
            what: "tuple header",
            ..
        })
    ));
    assert_eq!(demo_row(&inspection.slots[1].outcome), &Ok(row(2, "b")));
}

#[test]
fn test_header_errors_are_page_fatal() {
    let mut special_past_page = PageBuilder::new().tuple(&demo_tuple(1, "a")).build();
    special_past_page[16..18].copy_from_slice(&9000u16.to_le_bytes());

    assert!(matches!(
        inspect_page(PageId::new(0), &special_past_page, true),
        Err(DecodeError::MalformedHeader(_))
    ));
    assert!(matches!(
        inspect_page(PageId::new(0), &[0u8; 8192], true),
        Err(DecodeError::MalformedHeader(_))
    ));
}

#[test]
fn test_upper_below_lower_still_walks_slots() {
    let mut page = PageBuilder::new()
        .tuple(&demo_tuple(1, "a"))
        .line_pointer(8180, 40, 1)
        .build();
    page[14..16].copy_from_slice(&20u16.to_le_bytes());

    let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
    assert_eq!(inspection.header.upper, 20);
    assert_eq!(demo_row(&inspection.slots[0].outcome), &Ok(row(1, "a")));
    assert!(matches!(
        inspection.slots[1].outcome,
        SlotOutcome::Failed(DecodeError::SpanOutOfBounds { index: 2, .. })
    ));
}

#[test]
fn test_demo_data_layout() {
    let data = demo_data(42, "hi");
    assert_eq!(data.len(), 11);
    assert_eq!(data[8], 0x07);
}

proptest! {
    #[test]
    fn prop_line_pointer_fields_survive(
        offset in 24u16..8192,
        length in 0u16..0x7FFF,
        state in 0u8..4,
    ) {
        let page = PageBuilder::new().upper(28).line_pointer(offset, length, state).build();
        let heap = HeapPage::parse(&page).unwrap();
        let lp = heap.line_pointer(1).unwrap();
        prop_assert_eq!(lp.offset, offset);
        prop_assert_eq!(lp.length, length);
        prop_assert_eq!(lp.state as u8, state);
    }

    #[test]
    fn prop_header_fields_survive(hi: u32, lo: u32, slots in 0usize..64) {
        let mut builder = PageBuilder::new().lsn(hi, lo);
        for _ in 0..slots {
            builder = builder.line_pointer(0, 0, 0);
        }
        let page = builder.build();
        let heap = HeapPage::parse(&page).unwrap();
        prop_assert_eq!(heap.header().lsn_hi, hi);
        prop_assert_eq!(heap.header().lsn_lo, lo);
        prop_assert_eq!(heap.header().lower as usize, 24 + 4 * slots);
        prop_assert_eq!(heap.line_pointers().len(), slots);
    }

    #[test]
    fn prop_demo_rows_decode(id: i64, name in "[a-z]{0,100}") {
        let page = PageBuilder::new().tuple(&demo_tuple(id, &name)).build();
        let inspection = inspect_page(PageId::new(0), &page, true).unwrap();
        prop_assert_eq!(demo_row(&inspection.slots[0].outcome), &Ok(row(id, &name)));
    }
}
